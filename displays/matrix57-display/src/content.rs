//! Received content: a scrolling string, a single character, a character
//! pair or a raw five-column bitmap, all sharing one fixed buffer.
//!
//! Head and cursor are plain offsets into the buffer; a zero byte
//! terminates text.

use matrix57_protocol::{MAX_MESSAGE_LEN, NUM_COLUMNS};

/// Capacity of the shared content buffer
pub const BUFFER_CAPACITY: usize = 64;

// A full-length message plus its terminator must fit
const _: () = assert!(MAX_MESSAGE_LEN < BUFFER_CAPACITY);

/// Interpretation of the buffer bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ContentKind {
    /// Zero-terminated text starting at the head
    Ascii,
    /// Bytes 0 and 1 are two characters drawn small side by side
    TwoChars,
    /// Bytes 0..5 are column row masks
    Raw,
}

/// Fixed-capacity content buffer with a kind tag
#[derive(Debug, Clone)]
pub struct ContentBuffer {
    bytes: [u8; BUFFER_CAPACITY],
    kind: ContentKind,
    head: usize,
    cursor: usize,
}

impl Default for ContentBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentBuffer {
    /// Blank raw bitmap
    pub const fn new() -> Self {
        Self {
            bytes: [0; BUFFER_CAPACITY],
            kind: ContentKind::Raw,
            head: 0,
            cursor: 0,
        }
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    pub fn set_kind(&mut self, kind: ContentKind) {
        self.kind = kind;
    }

    pub fn head(&self) -> usize {
        self.head
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Blank the bitmap and rewind to the start
    pub fn clear(&mut self) {
        self.bytes[..NUM_COLUMNS].fill(0);
        self.kind = ContentKind::Raw;
        self.head = 0;
        self.cursor = 0;
    }

    /// Replace the content with a one-character string
    pub fn set_char(&mut self, code: u8) {
        self.bytes[self.head] = code;
        self.bytes[self.head + 1] = 0;
        self.kind = ContentKind::Ascii;
        self.cursor = self.head;
    }

    /// Store one message character at `index` characters past the head
    ///
    /// Writes beyond the message capacity are dropped.
    pub fn put_message_byte(&mut self, index: usize, byte: u8) {
        if index < MAX_MESSAGE_LEN {
            self.bytes[self.head + index] = byte;
        }
    }

    /// Terminate a message of `len` characters and make it current
    pub fn finish_message(&mut self, len: usize) {
        self.bytes[self.head + len.min(MAX_MESSAGE_LEN)] = 0;
        self.kind = ContentKind::Ascii;
        self.cursor = self.head;
    }

    /// Store a character pair for the small two-character layout
    pub fn set_pair(&mut self, first: u8, second: u8) {
        self.bytes[0] = first;
        self.bytes[1] = second;
        self.bytes[2] = 0;
        self.kind = ContentKind::TwoChars;
    }

    /// Character pair stored by [`ContentBuffer::set_pair`]
    pub fn pair(&self) -> (u8, u8) {
        (self.bytes[0], self.bytes[1])
    }

    /// Write one raw column byte
    pub fn set_column(&mut self, index: usize, rows: u8) {
        if index < NUM_COLUMNS {
            self.bytes[index] = rows;
        }
    }

    /// Raw column bytes 0..5
    pub fn columns(&self) -> [u8; NUM_COLUMNS] {
        let mut columns = [0; NUM_COLUMNS];
        columns.copy_from_slice(&self.bytes[..NUM_COLUMNS]);
        columns
    }

    /// Mutable view of the raw column bytes
    pub fn columns_mut(&mut self) -> &mut [u8] {
        &mut self.bytes[..NUM_COLUMNS]
    }

    /// Character under the cursor, a space at a terminator
    pub fn current(&self) -> u8 {
        match self.bytes[self.cursor] {
            0 => b' ',
            code => code,
        }
    }

    /// Character the cursor moves to next, wrapping to the head
    pub fn peek_next(&self) -> u8 {
        match self.bytes[self.next_index()] {
            0 => b' ',
            code => code,
        }
    }

    /// Step the cursor to the next character, wrapping at the terminator
    pub fn advance_cursor(&mut self) {
        self.cursor = self.next_index();
    }

    /// Move the cursor back to the head
    pub fn rewind(&mut self) {
        self.cursor = self.head;
    }

    fn next_index(&self) -> usize {
        let next = self.cursor + 1;
        if next >= BUFFER_CAPACITY || self.bytes[self.cursor] == 0 || self.bytes[next] == 0 {
            self.head
        } else {
            next
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(text: &[u8]) -> ContentBuffer {
        let mut content = ContentBuffer::new();
        for (index, &byte) in text.iter().enumerate() {
            content.put_message_byte(index, byte);
        }
        content.finish_message(text.len());
        content
    }

    #[test]
    fn test_new_is_blank_raw() {
        let content = ContentBuffer::new();
        assert_eq!(content.kind(), ContentKind::Raw);
        assert_eq!(content.columns(), [0; NUM_COLUMNS]);
        assert_eq!(content.head(), 0);
        assert_eq!(content.cursor(), 0);
    }

    #[test]
    fn test_cursor_wraps_at_terminator() {
        let mut content = message(b"ABC");
        assert_eq!(content.current(), b'A');
        assert_eq!(content.peek_next(), b'B');

        content.advance_cursor();
        content.advance_cursor();
        assert_eq!(content.current(), b'C');
        assert_eq!(content.peek_next(), b'A');

        content.advance_cursor();
        assert_eq!(content.cursor(), content.head());
    }

    #[test]
    fn test_empty_message_shows_space() {
        let mut content = message(b"");
        assert_eq!(content.kind(), ContentKind::Ascii);
        assert_eq!(content.current(), b' ');
        assert_eq!(content.peek_next(), b' ');
        content.advance_cursor();
        assert_eq!(content.cursor(), 0);
    }

    #[test]
    fn test_overlong_message_is_truncated() {
        let text = [b'x'; MAX_MESSAGE_LEN + 8];
        let mut content = ContentBuffer::new();
        for (index, &byte) in text.iter().enumerate() {
            content.put_message_byte(index, byte);
        }
        content.finish_message(text.len());

        for _ in 0..MAX_MESSAGE_LEN {
            content.advance_cursor();
        }
        assert_eq!(content.cursor(), content.head());
    }

    #[test]
    fn test_set_char_replaces_message() {
        let mut content = message(b"HELLO");
        content.advance_cursor();
        content.set_char(b'Z');

        assert_eq!(content.cursor(), content.head());
        assert_eq!(content.current(), b'Z');
        assert_eq!(content.peek_next(), b'Z');
    }

    #[test]
    fn test_clear_blanks_columns() {
        let mut content = ContentBuffer::new();
        content.set_column(2, 0x7F);
        content.set_pair(b'1', b'2');
        content.clear();

        assert_eq!(content.kind(), ContentKind::Raw);
        assert_eq!(content.columns(), [0; NUM_COLUMNS]);
    }

    #[test]
    fn test_set_column_ignores_out_of_range() {
        let mut content = ContentBuffer::new();
        content.set_column(NUM_COLUMNS, 0x55);
        assert_eq!(content.columns(), [0; NUM_COLUMNS]);
    }
}
