//! Escape-framed protocol parser
//!
//! Bytes arrive one at a time from the link (or the demo). A byte equal to
//! [`ESCAPE`] makes the next byte an opcode; everything else is content
//! interpreted by the current sub-state. Every byte returns a
//! [`ParserEvent`] describing what it did, for logging.

use matrix57_display::{ContentKind, DisplayState, Mode, ShiftDir, NUM_COLUMNS};
use matrix57_protocol::{FontSelect, Opcode, ESCAPE, MAX_MESSAGE_LEN};

/// Setting selected by a single-parameter opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parameter {
    Dwell,
    Rate,
    Transition,
    Font,
    ShiftDir,
}

/// Receive sub-state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxState {
    /// Bytes are literal characters
    Normal,
    /// Collecting message characters
    Message { len: usize },
    /// Collecting raw column bytes
    Data { received: usize },
    /// Waiting for one byte to scroll into the bitmap
    DataScroll,
    /// Waiting for the value of a setting
    Parameter(Parameter),
    /// Collecting a character pair
    Pair { first: Option<u8>, flipped: bool },
}

/// What a received byte did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParserEvent {
    /// Escape seen, the next byte is an opcode
    Escape,
    /// Opcode accepted
    Command(Opcode),
    /// Byte after an escape is not an opcode
    UnknownOpcode(u8),
    /// Literal character shown
    Character(u8),
    /// Message character stored
    MessageByte,
    /// Message complete, scrolling starts
    MessageStored { len: usize },
    /// Raw column byte stored
    DataByte,
    /// All raw columns received
    FrameLoaded,
    /// Byte merged into the bitmap
    Scrolled(u8),
    /// Setting changed
    ParameterApplied(Parameter, u8),
    /// Setting value not supported, previous value kept
    ParameterRejected(Parameter, u8),
    /// First character of a pair stored
    PairByte,
    /// Character pair complete
    PairLoaded { first: u8, second: u8, flipped: bool },
}

/// Protocol state machine
#[derive(Debug, Clone)]
pub struct ProtocolParser {
    state: RxState,
    escape_pending: bool,
    last_opcode: Option<Opcode>,
}

impl Default for ProtocolParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolParser {
    pub const fn new() -> Self {
        Self {
            state: RxState::Normal,
            escape_pending: false,
            last_opcode: None,
        }
    }

    pub fn state(&self) -> RxState {
        self.state
    }

    pub fn last_opcode(&self) -> Option<Opcode> {
        self.last_opcode
    }

    pub fn escape_pending(&self) -> bool {
        self.escape_pending
    }

    /// Process one received byte
    pub fn feed(&mut self, byte: u8, display: &mut DisplayState) -> ParserEvent {
        if self.escape_pending {
            // Any byte after an escape is an opcode, a second escape included
            self.escape_pending = false;
            return match Opcode::from_byte(byte) {
                Some(opcode) => {
                    self.last_opcode = Some(opcode);
                    self.dispatch(opcode, display);
                    ParserEvent::Command(opcode)
                }
                None => ParserEvent::UnknownOpcode(byte),
            };
        }

        if byte == ESCAPE {
            self.escape_pending = true;
            return ParserEvent::Escape;
        }

        let (next, event) = self.content(byte, display);
        self.state = next;
        event
    }

    fn dispatch(&mut self, opcode: Opcode, display: &mut DisplayState) {
        self.state = match opcode {
            Opcode::Reset => {
                display.reset();
                RxState::Normal
            }
            Opcode::Flip => {
                display.pin_end_is_top = true;
                RxState::Normal
            }
            Opcode::NoFlip => {
                display.pin_end_is_top = false;
                RxState::Normal
            }
            Opcode::Font => RxState::Parameter(Parameter::Font),
            Opcode::Dwell => RxState::Parameter(Parameter::Dwell),
            Opcode::Rate => RxState::Parameter(Parameter::Rate),
            Opcode::Transition => RxState::Parameter(Parameter::Transition),
            Opcode::ShiftDir => RxState::Parameter(Parameter::ShiftDir),
            Opcode::Message => RxState::Message { len: 0 },
            Opcode::Data => RxState::Data { received: 0 },
            Opcode::DataScroll => RxState::DataScroll,
            Opcode::Char => RxState::Normal,
            Opcode::TwoChars => RxState::Pair {
                first: None,
                flipped: false,
            },
            Opcode::TwoCharsFlipped => RxState::Pair {
                first: None,
                flipped: true,
            },
        };
    }

    fn content(&self, byte: u8, display: &mut DisplayState) -> (RxState, ParserEvent) {
        match self.state {
            RxState::Normal => {
                display.content.set_char(byte);
                display.set_mode(Mode::StartTransition);
                (RxState::Normal, ParserEvent::Character(byte))
            }
            RxState::Message { len } => {
                if byte == 0 {
                    return finish_message(display, len);
                }
                display.content.put_message_byte(len, byte);
                let len = len + 1;
                if len == MAX_MESSAGE_LEN {
                    finish_message(display, len)
                } else {
                    (RxState::Message { len }, ParserEvent::MessageByte)
                }
            }
            RxState::Data { received } => {
                // Last byte received lands in column 0
                display.content.set_column(NUM_COLUMNS - 1 - received, byte);
                let received = received + 1;
                if received == NUM_COLUMNS {
                    show_bitmap(display);
                    (RxState::Normal, ParserEvent::FrameLoaded)
                } else {
                    (RxState::Data { received }, ParserEvent::DataByte)
                }
            }
            RxState::DataScroll => {
                display.shift_dir.merge(display.content.columns_mut(), byte);
                show_bitmap(display);
                (RxState::Normal, ParserEvent::Scrolled(byte))
            }
            RxState::Parameter(parameter) => {
                let event = apply(parameter, byte, display);
                display.set_mode(Mode::StartTransition);
                (RxState::Normal, event)
            }
            RxState::Pair {
                first: None,
                flipped,
            } => (
                RxState::Pair {
                    first: Some(byte),
                    flipped,
                },
                ParserEvent::PairByte,
            ),
            RxState::Pair {
                first: Some(first),
                flipped,
            } => {
                display.content.set_pair(first, byte);
                display.flip_two_chars = flipped;
                display.set_mode(Mode::StartTransition);
                (
                    RxState::Normal,
                    ParserEvent::PairLoaded {
                        first,
                        second: byte,
                        flipped,
                    },
                )
            }
        }
    }
}

fn finish_message(display: &mut DisplayState, len: usize) -> (RxState, ParserEvent) {
    display.content.finish_message(len);
    display.set_mode(Mode::StartScrollMessage);
    (RxState::Normal, ParserEvent::MessageStored { len })
}

fn show_bitmap(display: &mut DisplayState) {
    display.content.set_kind(ContentKind::Raw);
    display.pin_end_is_top = true;
    display.set_mode(Mode::Norm);
}

fn apply(parameter: Parameter, value: u8, display: &mut DisplayState) -> ParserEvent {
    match parameter {
        Parameter::Dwell => display.scroll.set_dwell(value),
        Parameter::Rate => display.scroll.set_rate(value),
        Parameter::Transition => display.scroll.set_transition(value),
        Parameter::Font => display.font = FontSelect::from_byte(value),
        Parameter::ShiftDir => match ShiftDir::from_byte(value) {
            Some(dir) => display.shift_dir = dir,
            None => return ParserEvent::ParameterRejected(parameter, value),
        },
    }
    ParserEvent::ParameterApplied(parameter, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use matrix57_display::{Defaults, ScrollState};
    use matrix57_protocol::Command;
    use proptest::prelude::*;

    fn display() -> DisplayState {
        DisplayState::new(Defaults::default(), false)
    }

    fn feed_all(parser: &mut ProtocolParser, display: &mut DisplayState, bytes: &[u8]) -> ParserEvent {
        let mut last = ParserEvent::Escape;
        for &byte in bytes {
            last = parser.feed(byte, display);
        }
        last
    }

    fn send(parser: &mut ProtocolParser, display: &mut DisplayState, command: Command<'_>) -> ParserEvent {
        let bytes = command.encode_to_vec().unwrap();
        feed_all(parser, display, &bytes)
    }

    #[test]
    fn test_literal_character() {
        let mut parser = ProtocolParser::new();
        let mut display = display();

        assert_eq!(parser.feed(b'A', &mut display), ParserEvent::Character(b'A'));
        assert_eq!(display.content.kind(), ContentKind::Ascii);
        assert_eq!(display.content.current(), b'A');
        assert_eq!(display.mode(), Mode::StartTransition);
    }

    #[test]
    fn test_message_stored() {
        let mut parser = ProtocolParser::new();
        let mut display = display();

        let event = send(&mut parser, &mut display, Command::Message(b"HELLO"));
        assert_eq!(event, ParserEvent::MessageStored { len: 5 });
        assert_eq!(parser.state(), RxState::Normal);
        assert_eq!(display.mode(), Mode::StartScrollMessage);
        assert_eq!(display.content.kind(), ContentKind::Ascii);
        assert_eq!(display.content.cursor(), display.content.head());
        assert_eq!(parser.last_opcode(), Some(Opcode::Message));
    }

    #[test]
    fn test_message_truncated_at_capacity() {
        let mut parser = ProtocolParser::new();
        let mut display = display();

        feed_all(&mut parser, &mut display, &[ESCAPE, 2]);
        let mut last = ParserEvent::Escape;
        for _ in 0..MAX_MESSAGE_LEN {
            last = parser.feed(b'x', &mut display);
        }
        assert_eq!(last, ParserEvent::MessageStored { len: MAX_MESSAGE_LEN });

        // Overflow bytes are shown as literal characters again
        assert_eq!(parser.feed(b'y', &mut display), ParserEvent::Character(b'y'));
    }

    #[test]
    fn test_data_reversed() {
        let mut parser = ProtocolParser::new();
        let mut display = display();

        let event = feed_all(&mut parser, &mut display, &[ESCAPE, 9, 1, 2, 3, 4, 5]);
        assert_eq!(event, ParserEvent::FrameLoaded);
        assert_eq!(display.content.columns(), [5, 4, 3, 2, 1]);
        assert_eq!(display.content.kind(), ContentKind::Raw);
        assert!(display.pin_end_is_top);
        assert_eq!(display.mode(), Mode::Norm);

        // The encoder sends columns so they land in order
        send(&mut parser, &mut display, Command::Data([1, 2, 3, 4, 5]));
        assert_eq!(display.content.columns(), [1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_data_scroll_uses_shift_dir() {
        let mut parser = ProtocolParser::new();
        let mut display = display();

        send(&mut parser, &mut display, Command::Data([1, 2, 3, 4, 5]));
        send(&mut parser, &mut display, Command::DataScroll(9));
        assert_eq!(display.content.columns(), [2, 3, 4, 5, 9]);

        send(&mut parser, &mut display, Command::ShiftDir(1));
        let event = send(&mut parser, &mut display, Command::DataScroll(7));
        assert_eq!(event, ParserEvent::Scrolled(7));
        assert_eq!(display.content.columns(), [7, 2, 3, 4, 5]);
    }

    #[test]
    fn test_parameters() {
        let mut parser = ProtocolParser::new();
        let mut display = display();

        assert_eq!(
            send(&mut parser, &mut display, Command::Dwell(12)),
            ParserEvent::ParameterApplied(Parameter::Dwell, 12)
        );
        send(&mut parser, &mut display, Command::Rate(0));
        send(&mut parser, &mut display, Command::Transition(4));
        send(&mut parser, &mut display, Command::Font(FontSelect::Narrow));

        assert_eq!(display.scroll.dwell_divisor, 12);
        assert_eq!(display.scroll.dwell_counter, 12);
        assert_eq!(display.scroll.rate_divisor.get(), 1);
        assert_eq!(display.scroll.transition_max, 4);
        assert_eq!(display.font, FontSelect::Narrow);
        assert_eq!(display.mode(), Mode::StartTransition);
        assert_eq!(parser.state(), RxState::Normal);
    }

    #[test]
    fn test_bad_shift_dir_keeps_previous() {
        let mut parser = ProtocolParser::new();
        let mut display = display();

        send(&mut parser, &mut display, Command::ShiftDir(3));
        let event = send(&mut parser, &mut display, Command::ShiftDir(9));
        assert_eq!(event, ParserEvent::ParameterRejected(Parameter::ShiftDir, 9));
        assert_eq!(display.shift_dir, ShiftDir::IntoLowRow);
    }

    #[test]
    fn test_two_chars() {
        let mut parser = ProtocolParser::new();
        let mut display = display();

        let event = send(
            &mut parser,
            &mut display,
            Command::TwoChars {
                first: b'4',
                second: b'2',
                flipped: true,
            },
        );
        assert_eq!(
            event,
            ParserEvent::PairLoaded {
                first: b'4',
                second: b'2',
                flipped: true
            }
        );
        assert_eq!(display.content.kind(), ContentKind::TwoChars);
        assert_eq!(display.content.pair(), (b'4', b'2'));
        assert!(display.flip_two_chars);
        assert_eq!(display.font, FontSelect::Wide);

        send(
            &mut parser,
            &mut display,
            Command::TwoChars {
                first: b'1',
                second: b'3',
                flipped: false,
            },
        );
        assert!(!display.flip_two_chars);
    }

    #[test]
    fn test_flip_and_noflip() {
        let mut parser = ProtocolParser::new();
        let mut display = display();

        send(&mut parser, &mut display, Command::Flip);
        assert!(display.pin_end_is_top);
        send(&mut parser, &mut display, Command::NoFlip);
        assert!(!display.pin_end_is_top);
    }

    #[test]
    fn test_unknown_opcode_and_char_are_ignored() {
        let mut parser = ProtocolParser::new();
        let mut display = display();
        send(&mut parser, &mut display, Command::Data([1, 2, 3, 4, 5]));

        assert_eq!(
            feed_all(&mut parser, &mut display, &[ESCAPE, 0x55]),
            ParserEvent::UnknownOpcode(0x55)
        );
        assert_eq!(
            feed_all(&mut parser, &mut display, &[ESCAPE, 11]),
            ParserEvent::Command(Opcode::Char)
        );
        assert_eq!(display.content.columns(), [1, 2, 3, 4, 5]);
        assert_eq!(parser.state(), RxState::Normal);
    }

    #[test]
    fn test_escape_inside_message() {
        let mut parser = ProtocolParser::new();
        let mut display = display();

        feed_all(&mut parser, &mut display, &[ESCAPE, 2, b'A', b'B']);
        feed_all(&mut parser, &mut display, &[ESCAPE, 3]);
        assert!(display.pin_end_is_top);
        assert_eq!(parser.state(), RxState::Normal);
    }

    #[test]
    fn test_double_escape() {
        let mut parser = ProtocolParser::new();
        let mut display = display();

        assert_eq!(parser.feed(ESCAPE, &mut display), ParserEvent::Escape);
        assert_eq!(
            parser.feed(ESCAPE, &mut display),
            ParserEvent::UnknownOpcode(ESCAPE)
        );
        assert!(!parser.escape_pending());
        assert_eq!(parser.feed(b'A', &mut display), ParserEvent::Character(b'A'));
        assert_eq!(display.content.current(), b'A');
    }

    proptest! {
        #[test]
        fn test_reset_from_any_state(noise in proptest::collection::vec(any::<u8>(), 0..200)) {
            let mut parser = ProtocolParser::new();
            let mut display = display();

            feed_all(&mut parser, &mut display, &noise);
            if parser.escape_pending() {
                // Close the dangling escape with an unused opcode
                prop_assert_eq!(parser.feed(0, &mut display), ParserEvent::UnknownOpcode(0));
            }
            feed_all(&mut parser, &mut display, &[ESCAPE, 1]);

            prop_assert_eq!(parser.state(), RxState::Normal);
            prop_assert_eq!(display.content.kind(), ContentKind::Raw);
            prop_assert_eq!(display.content.columns(), [0; NUM_COLUMNS]);
            prop_assert_eq!(display.mode(), Mode::Norm);
            prop_assert_eq!(display.scroll, ScrollState::new(&Defaults::default()));
            prop_assert_eq!(display.font, FontSelect::Wide);
            prop_assert!(!display.pin_end_is_top);
            prop_assert!(!display.flip_two_chars);
        }
    }
}
