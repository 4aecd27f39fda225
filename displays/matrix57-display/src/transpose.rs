//! Bit transpositions between glyph space and the column buffer
//!
//! The two-character layouts are fixed permutations tied to how the
//! board is wired, so they are spelled out as tables rather than derived.

use matrix57_protocol::NUM_COLUMNS;

use crate::ROW_MASK;

/// Width of a small glyph in columns
pub const SMALL_GLYPH_COLUMNS: usize = 3;

/// Height of a small glyph in rows
pub const SMALL_GLYPH_ROWS: usize = 5;

/// Destination (column, row bit) for every source (glyph column, glyph row)
type Placement = [[(u8, u8); SMALL_GLYPH_ROWS]; SMALL_GLYPH_COLUMNS];

/// First character, pins on the right
#[rustfmt::skip]
const PINS_RIGHT_FIRST: Placement = [
    [(4, 0), (3, 0), (2, 0), (1, 0), (0, 0)],
    [(4, 1), (3, 1), (2, 1), (1, 1), (0, 1)],
    [(4, 2), (3, 2), (2, 2), (1, 2), (0, 2)],
];

/// Second character, pins on the right
#[rustfmt::skip]
const PINS_RIGHT_SECOND: Placement = [
    [(4, 4), (3, 4), (2, 4), (1, 4), (0, 4)],
    [(4, 5), (3, 5), (2, 5), (1, 5), (0, 5)],
    [(4, 6), (3, 6), (2, 6), (1, 6), (0, 6)],
];

/// First character, pins on the left
#[rustfmt::skip]
const PINS_LEFT_FIRST: Placement = [
    [(0, 6), (1, 6), (2, 6), (3, 6), (4, 6)],
    [(0, 5), (1, 5), (2, 5), (3, 5), (4, 5)],
    [(0, 4), (1, 4), (2, 4), (3, 4), (4, 4)],
];

/// Second character, pins on the left
#[rustfmt::skip]
const PINS_LEFT_SECOND: Placement = [
    [(0, 2), (1, 2), (2, 2), (3, 2), (4, 2)],
    [(0, 1), (1, 1), (2, 1), (3, 1), (4, 1)],
    [(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)],
];

fn place(columns: &mut [u8; NUM_COLUMNS], glyph: &[u8], table: &Placement) {
    for (source_column, rows) in table.iter().enumerate() {
        let bits = glyph.get(source_column).copied().unwrap_or(0);
        for (source_row, &(column, row)) in rows.iter().enumerate() {
            if bits & (1 << source_row) != 0 {
                columns[usize::from(column)] |= 1 << row;
            }
        }
    }
}

/// Lay two small glyphs side by side, rotated a quarter turn
///
/// `first` and `second` are column bytes of 3×5 glyphs (bit 0 = top row).
/// With `flipped` the mirrored layout is used, for a board mounted with
/// its pins on the other side.
pub fn two_small_chars(first: &[u8], second: &[u8], flipped: bool) -> [u8; NUM_COLUMNS] {
    let mut columns = [0; NUM_COLUMNS];
    if flipped {
        place(&mut columns, first, &PINS_LEFT_FIRST);
        place(&mut columns, second, &PINS_LEFT_SECOND);
    } else {
        place(&mut columns, first, &PINS_RIGHT_FIRST);
        place(&mut columns, second, &PINS_RIGHT_SECOND);
    }
    columns
}

/// How a `data_scroll` byte merges into the bitmap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ShiftDir {
    /// Columns move toward index 0, the byte enters at index 4
    #[default]
    IntoLast,
    /// Columns move toward index 4, the byte enters at index 0
    IntoFirst,
    /// Rows move toward bit 0, bit i of the byte enters bit 6 of column i
    IntoHighRow,
    /// Rows move toward bit 6, bit i of the byte enters bit 0 of column i
    IntoLowRow,
}

impl ShiftDir {
    /// Decode the `shift_dir` parameter, `None` if unsupported
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(ShiftDir::IntoLast),
            1 => Some(ShiftDir::IntoFirst),
            2 => Some(ShiftDir::IntoHighRow),
            3 => Some(ShiftDir::IntoLowRow),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            ShiftDir::IntoLast => 0,
            ShiftDir::IntoFirst => 1,
            ShiftDir::IntoHighRow => 2,
            ShiftDir::IntoLowRow => 3,
        }
    }

    /// Merge `byte` into `columns`
    pub fn merge(self, columns: &mut [u8], byte: u8) {
        match self {
            ShiftDir::IntoLast => {
                columns.rotate_left(1);
                if let Some(last) = columns.last_mut() {
                    *last = byte;
                }
            }
            ShiftDir::IntoFirst => {
                columns.rotate_right(1);
                if let Some(first) = columns.first_mut() {
                    *first = byte;
                }
            }
            ShiftDir::IntoHighRow => {
                for (index, column) in columns.iter_mut().enumerate() {
                    let incoming = if byte & (1 << index) != 0 { 0x40 } else { 0 };
                    *column = (*column >> 1) | incoming;
                }
            }
            ShiftDir::IntoLowRow => {
                for (index, column) in columns.iter_mut().enumerate() {
                    let incoming = if byte & (1 << index) != 0 { 0x01 } else { 0 };
                    *column = ((*column << 1) & ROW_MASK) | incoming;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn dots(columns: &[u8]) -> u32 {
        columns.iter().map(|column| column.count_ones()).sum()
    }

    proptest! {
        #[test]
        fn test_two_chars_keeps_every_dot(
            first in prop::array::uniform3(0u8..32),
            second in prop::array::uniform3(0u8..32),
            flipped: bool,
        ) {
            let columns = two_small_chars(&first, &second, flipped);
            prop_assert_eq!(dots(&columns), dots(&first) + dots(&second));
        }

        #[test]
        fn test_row_merge_stays_in_seven_rows(
            start in prop::array::uniform5(0u8..0x80),
            byte: u8,
            up: bool,
        ) {
            let mut columns = start;
            let dir = if up { ShiftDir::IntoLowRow } else { ShiftDir::IntoHighRow };
            dir.merge(&mut columns, byte);
            prop_assert!(columns.iter().all(|&column| column & !ROW_MASK == 0));
        }
    }

    #[test]
    fn test_two_chars_exact_bits() {
        // First glyph: top-left and bottom-right dots
        let first = [0b00001, 0b00000, 0b10000];
        // Second glyph: row 1 of column 0, row 2 of column 1
        let second = [0b00010, 0b00100, 0b00000];

        assert_eq!(
            two_small_chars(&first, &second, false),
            [0x04, 0x00, 0x20, 0x10, 0x01]
        );
        assert_eq!(
            two_small_chars(&first, &second, true),
            [0x40, 0x04, 0x02, 0x00, 0x10]
        );
    }

    #[test]
    fn test_two_chars_digits() {
        let one = [0x12, 0x1f, 0x10];
        let zero = [0x1f, 0x11, 0x1f];
        assert_eq!(
            two_small_chars(&one, &zero, false),
            [0x77, 0x52, 0x52, 0x53, 0x72]
        );
    }

    #[test]
    fn test_tables_are_permutations() {
        for (a, b) in [
            (&PINS_RIGHT_FIRST, &PINS_RIGHT_SECOND),
            (&PINS_LEFT_FIRST, &PINS_LEFT_SECOND),
        ] {
            let mut seen = [0u8; NUM_COLUMNS];
            for &(column, row) in a.iter().chain(b.iter()).flatten() {
                let bit = 1 << row;
                assert_eq!(seen[usize::from(column)] & bit, 0);
                seen[usize::from(column)] |= bit;
            }
            // Row 3 stays dark as the gap between the two glyphs
            assert!(seen.iter().all(|&column| column == 0x77));
        }
    }

    #[test]
    fn test_merge_columns() {
        let mut columns = [1, 2, 3, 4, 5];
        ShiftDir::IntoLast.merge(&mut columns, 9);
        assert_eq!(columns, [2, 3, 4, 5, 9]);

        let mut columns = [1, 2, 3, 4, 5];
        ShiftDir::IntoFirst.merge(&mut columns, 9);
        assert_eq!(columns, [9, 1, 2, 3, 4]);
    }

    #[test]
    fn test_merge_rows() {
        let mut columns = [0x01, 0x40, 0x00, 0x7f, 0x00];
        ShiftDir::IntoHighRow.merge(&mut columns, 0b00101);
        assert_eq!(columns, [0x40, 0x20, 0x40, 0x3f, 0x00]);

        let mut columns = [0x01, 0x40, 0x00, 0x7f, 0x00];
        ShiftDir::IntoLowRow.merge(&mut columns, 0b10010);
        assert_eq!(columns, [0x02, 0x01, 0x00, 0x7e, 0x01]);
    }

    #[test]
    fn test_shift_dir_rejects_unknown() {
        assert_eq!(ShiftDir::from_byte(4), None);
        for dir in [
            ShiftDir::IntoLast,
            ShiftDir::IntoFirst,
            ShiftDir::IntoHighRow,
            ShiftDir::IntoLowRow,
        ] {
            assert_eq!(ShiftDir::from_byte(dir.to_byte()), Some(dir));
        }
    }
}
