//! Glyph lookup capability
//!
//! The renderer only ever asks for one column of one glyph at a time, so
//! any font source (flash table, external EEPROM, test stub) can stand in
//! for [`BuiltinFont`].

use matrix57_protocol::{FontSelect, NUM_COLUMNS};

use crate::glyphs;

/// First character code with a glyph
pub const FIRST_GLYPH: u8 = 0x20;

/// Table index for a character code
///
/// Codes below [`FIRST_GLYPH`] wrap to large indices, which every font
/// renders blank.
pub const fn glyph_index(code: u8) -> u8 {
    code.wrapping_sub(FIRST_GLYPH)
}

/// Column lookup by glyph index
pub trait Font {
    /// Row mask of column `offset` of glyph `index` in `face`
    ///
    /// Unknown glyphs and offsets past the glyph width are blank.
    fn column(&self, face: FontSelect, index: u8, offset: usize) -> u8;

    /// All five columns of the glyph for a character code
    fn glyph(&self, face: FontSelect, code: u8) -> [u8; NUM_COLUMNS] {
        let index = glyph_index(code);
        let mut columns = [0; NUM_COLUMNS];
        for (offset, column) in columns.iter_mut().enumerate() {
            *column = self.column(face, index, offset);
        }
        columns
    }
}

/// Glyph tables compiled into flash
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinFont;

impl Font for BuiltinFont {
    fn column(&self, face: FontSelect, index: u8, offset: usize) -> u8 {
        let index = usize::from(index);
        match face {
            FontSelect::Wide => glyphs::WIDE
                .get(index)
                .and_then(|glyph| glyph.get(offset))
                .copied()
                .unwrap_or(0),
            FontSelect::Narrow => glyphs::narrow(index)
                .and_then(|glyph| glyph.get(offset))
                .copied()
                .unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wide_glyph() {
        let font = BuiltinFont;
        assert_eq!(
            font.glyph(FontSelect::Wide, b'A'),
            [0x7e, 0x11, 0x11, 0x11, 0x7e]
        );
    }

    #[test]
    fn test_narrow_digits() {
        let font = BuiltinFont;
        assert_eq!(
            font.glyph(FontSelect::Narrow, b'1'),
            [0x12, 0x1f, 0x10, 0x00, 0x00]
        );
        assert_eq!(
            font.glyph(FontSelect::Narrow, b'0'),
            [0x1f, 0x11, 0x1f, 0x00, 0x00]
        );
    }

    #[test]
    fn test_narrow_folds_lowercase() {
        let font = BuiltinFont;
        assert_eq!(
            font.glyph(FontSelect::Narrow, b'h'),
            font.glyph(FontSelect::Narrow, b'H')
        );
        assert_eq!(font.glyph(FontSelect::Narrow, b'{'), [0; NUM_COLUMNS]);
    }

    #[test]
    fn test_control_codes_are_blank() {
        let font = BuiltinFont;
        for code in [0x00, 0x0a, 0x1f, 0x80, 0xff] {
            assert_eq!(font.glyph(FontSelect::Wide, code), [0; NUM_COLUMNS]);
            assert_eq!(font.glyph(FontSelect::Narrow, code), [0; NUM_COLUMNS]);
        }
    }

    #[test]
    fn test_glyphs_fit_seven_rows() {
        let font = BuiltinFont;
        for code in 0x20..=0x7f {
            for column in font.glyph(FontSelect::Wide, code) {
                assert_eq!(column & 0x80, 0, "code {code:#x}");
            }
            for column in font.glyph(FontSelect::Narrow, code) {
                assert_eq!(column & !0x1f, 0, "code {code:#x}");
            }
        }
    }
}
