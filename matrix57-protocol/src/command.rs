//! Master-side command encoding
//!
//! Produces the exact byte sequence a master clocks out for each command.
//! Content bytes equal to [`ESCAPE`] cannot be represented on the wire and
//! are rejected instead of silently turning into opcodes on the receiver.

use heapless::Vec;

use crate::opcode::{Opcode, ESCAPE};
use crate::NUM_COLUMNS;

/// Longest message the receiver stores, in characters
pub const MAX_MESSAGE_LEN: usize = 32;

/// Largest encoded command (ESCAPE + OPCODE + message + terminator)
pub const MAX_COMMAND_SIZE: usize = 2 + MAX_MESSAGE_LEN + 1;

/// Errors that can occur while encoding a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    /// A content byte equals the escape code
    ReservedByte,
    /// A message contains a zero byte before its end
    EmbeddedTerminator,
    /// Message longer than [`MAX_MESSAGE_LEN`]
    MessageTooLong,
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// Font face selector for [`Command::Font`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FontSelect {
    /// 5×7 glyphs
    #[default]
    Wide,
    /// 3×5 glyphs
    Narrow,
}

impl FontSelect {
    /// Decode the parameter byte of the `font` opcode
    pub fn from_byte(byte: u8) -> Self {
        if byte == 0 {
            FontSelect::Wide
        } else {
            FontSelect::Narrow
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            FontSelect::Wide => 0,
            FontSelect::Narrow => 1,
        }
    }
}

/// Commands a master can send
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command<'a> {
    /// Restore defaults and blank the display
    Reset,
    /// Orientation: pin end is top
    Flip,
    /// Orientation: pin end is bottom
    NoFlip,
    /// Select the glyph face
    Font(FontSelect),
    /// Dwell ticks before a scrolled character moves on
    Dwell(u8),
    /// Ticks per scroll phase
    Rate(u8),
    /// Blank ticks between shown items
    Transition(u8),
    /// Shift direction for [`Command::DataScroll`] (0-3)
    ShiftDir(u8),
    /// A single literal character
    Character(u8),
    /// Scrolling message, without terminator
    Message(&'a [u8]),
    /// Raw bitmap, column 0 first (sent last column first)
    Data([u8; NUM_COLUMNS]),
    /// One byte merged into the bitmap
    DataScroll(u8),
    /// Two small characters side by side
    TwoChars { first: u8, second: u8, flipped: bool },
}

impl<'a> Command<'a> {
    /// Opcode that introduces this command, `None` for a bare character
    pub fn opcode(&self) -> Option<Opcode> {
        match self {
            Command::Reset => Some(Opcode::Reset),
            Command::Flip => Some(Opcode::Flip),
            Command::NoFlip => Some(Opcode::NoFlip),
            Command::Font(_) => Some(Opcode::Font),
            Command::Dwell(_) => Some(Opcode::Dwell),
            Command::Rate(_) => Some(Opcode::Rate),
            Command::Transition(_) => Some(Opcode::Transition),
            Command::ShiftDir(_) => Some(Opcode::ShiftDir),
            Command::Character(_) => None,
            Command::Message(_) => Some(Opcode::Message),
            Command::Data(_) => Some(Opcode::Data),
            Command::DataScroll(_) => Some(Opcode::DataScroll),
            Command::TwoChars { flipped: false, .. } => Some(Opcode::TwoChars),
            Command::TwoChars { flipped: true, .. } => Some(Opcode::TwoCharsFlipped),
        }
    }

    /// Encode this command into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_COMMAND_SIZE>, EncodeError> {
        let mut out = Vec::new();

        if let Some(opcode) = self.opcode() {
            push(&mut out, ESCAPE)?;
            push(&mut out, opcode.to_byte())?;
        }

        match self {
            Command::Reset | Command::Flip | Command::NoFlip => {}
            Command::Font(select) => push_content(&mut out, select.to_byte())?,
            Command::Dwell(value)
            | Command::Rate(value)
            | Command::Transition(value)
            | Command::ShiftDir(value)
            | Command::DataScroll(value)
            | Command::Character(value) => push_content(&mut out, *value)?,
            Command::Message(text) => {
                if text.len() > MAX_MESSAGE_LEN {
                    return Err(EncodeError::MessageTooLong);
                }
                for &byte in text.iter() {
                    if byte == 0 {
                        return Err(EncodeError::EmbeddedTerminator);
                    }
                    push_content(&mut out, byte)?;
                }
                push(&mut out, 0)?;
            }
            Command::Data(columns) => {
                // The receiver stores the last byte received at column 0
                for &column in columns.iter().rev() {
                    push_content(&mut out, column)?;
                }
            }
            Command::TwoChars { first, second, .. } => {
                push_content(&mut out, *first)?;
                push_content(&mut out, *second)?;
            }
        }

        Ok(out)
    }

    /// Encode this command into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, EncodeError> {
        let bytes = self.encode_to_vec()?;
        if buffer.len() < bytes.len() {
            return Err(EncodeError::BufferTooSmall);
        }
        buffer[..bytes.len()].copy_from_slice(&bytes);
        Ok(bytes.len())
    }
}

fn push(out: &mut Vec<u8, MAX_COMMAND_SIZE>, byte: u8) -> Result<(), EncodeError> {
    out.push(byte).map_err(|_| EncodeError::BufferTooSmall)
}

fn push_content(out: &mut Vec<u8, MAX_COMMAND_SIZE>, byte: u8) -> Result<(), EncodeError> {
    if byte == ESCAPE {
        return Err(EncodeError::ReservedByte);
    }
    push(out, byte)
}
