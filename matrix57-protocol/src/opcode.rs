//! Command opcodes of the escape-framed protocol

/// Reserved byte announcing that the next byte is an opcode
pub const ESCAPE: u8 = 0x27;

/// Opcodes accepted after [`ESCAPE`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Opcode {
    /// Restore every setting to its default and blank the display
    Reset,
    /// Zero-terminated scrolling message follows
    Message,
    /// Pin end of the board is the top edge
    Flip,
    /// Pin end of the board is the bottom edge
    NoFlip,
    /// One byte follows: 0 = 5×7 font, anything else = 3×5
    Font,
    /// One byte follows: dwell ticks before scrolling resumes
    Dwell,
    /// One byte follows: ticks per scroll phase
    Rate,
    /// One byte follows: blank ticks between shown items
    Transition,
    /// Five raw column bytes follow, last column first
    Data,
    /// One byte follows, merged into the bitmap per the shift direction
    DataScroll,
    /// Reserved, accepted and ignored
    Char,
    /// One byte follows: shift direction for [`Opcode::DataScroll`]
    ShiftDir,
    /// Two characters follow, drawn small with pins on the right
    TwoChars,
    /// Two characters follow, drawn small with pins on the left
    TwoCharsFlipped,
}

// Wire format values
const OP_RESET: u8 = 1;
const OP_MESSAGE: u8 = 2;
const OP_FLIP: u8 = 3;
const OP_NOFLIP: u8 = 4;
const OP_FONT: u8 = 5;
const OP_DWELL: u8 = 6;
const OP_RATE: u8 = 7;
const OP_TRANSITION: u8 = 8;
const OP_DATA: u8 = 9;
const OP_DATA_SCROLL: u8 = 10;
const OP_CHAR: u8 = 11;
const OP_SHIFT_DIR: u8 = 12;
const OP_2CH: u8 = 13;
const OP_2CH_FLIPPED: u8 = 14;

impl Opcode {
    /// Every opcode, in wire order
    pub const ALL: [Opcode; 14] = [
        Opcode::Reset,
        Opcode::Message,
        Opcode::Flip,
        Opcode::NoFlip,
        Opcode::Font,
        Opcode::Dwell,
        Opcode::Rate,
        Opcode::Transition,
        Opcode::Data,
        Opcode::DataScroll,
        Opcode::Char,
        Opcode::ShiftDir,
        Opcode::TwoChars,
        Opcode::TwoCharsFlipped,
    ];

    /// Parse an opcode from its wire format byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            OP_RESET => Some(Opcode::Reset),
            OP_MESSAGE => Some(Opcode::Message),
            OP_FLIP => Some(Opcode::Flip),
            OP_NOFLIP => Some(Opcode::NoFlip),
            OP_FONT => Some(Opcode::Font),
            OP_DWELL => Some(Opcode::Dwell),
            OP_RATE => Some(Opcode::Rate),
            OP_TRANSITION => Some(Opcode::Transition),
            OP_DATA => Some(Opcode::Data),
            OP_DATA_SCROLL => Some(Opcode::DataScroll),
            OP_CHAR => Some(Opcode::Char),
            OP_SHIFT_DIR => Some(Opcode::ShiftDir),
            OP_2CH => Some(Opcode::TwoChars),
            OP_2CH_FLIPPED => Some(Opcode::TwoCharsFlipped),
            _ => None,
        }
    }

    /// Convert to wire format byte
    pub fn to_byte(self) -> u8 {
        match self {
            Opcode::Reset => OP_RESET,
            Opcode::Message => OP_MESSAGE,
            Opcode::Flip => OP_FLIP,
            Opcode::NoFlip => OP_NOFLIP,
            Opcode::Font => OP_FONT,
            Opcode::Dwell => OP_DWELL,
            Opcode::Rate => OP_RATE,
            Opcode::Transition => OP_TRANSITION,
            Opcode::Data => OP_DATA,
            Opcode::DataScroll => OP_DATA_SCROLL,
            Opcode::Char => OP_CHAR,
            Opcode::ShiftDir => OP_SHIFT_DIR,
            Opcode::TwoChars => OP_2CH,
            Opcode::TwoCharsFlipped => OP_2CH_FLIPPED,
        }
    }

    /// Number of parameter bytes that follow, `None` for the
    /// zero-terminated message
    pub fn parameter_len(self) -> Option<usize> {
        match self {
            Opcode::Reset | Opcode::Flip | Opcode::NoFlip | Opcode::Char => Some(0),
            Opcode::Font
            | Opcode::Dwell
            | Opcode::Rate
            | Opcode::Transition
            | Opcode::ShiftDir
            | Opcode::DataScroll => Some(1),
            Opcode::TwoChars | Opcode::TwoCharsFlipped => Some(2),
            Opcode::Data => Some(crate::NUM_COLUMNS),
            Opcode::Message => None,
        }
    }
}

impl TryFrom<u8> for Opcode {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        Opcode::from_byte(byte).ok_or(byte)
    }
}

impl From<Opcode> for u8 {
    fn from(opcode: Opcode) -> u8 {
        opcode.to_byte()
    }
}
