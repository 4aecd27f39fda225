//! Main-loop controller
//!
//! Owns every main-loop component. One [`DisplayController::poll`] is one
//! pass: service the time base, drain at most one link byte, advance the
//! render state and, on a column edge, write one column and feed its lit
//! count back into the column divisor.

use matrix57_display::{BuiltinFont, ColumnSink, DisplayState, Font, RenderEngine};

use crate::config::DisplayConfig;
use crate::link::{LinkReceiver, LinkShared, LinkStats};
use crate::parser::{ParserEvent, ProtocolParser};
use crate::timebase::{FastTick, Rate, TimeBase};

/// One column written to the output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ColumnWrite {
    pub index: usize,
    pub rows: u8,
    pub lit: u8,
}

/// What happened during one pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pass {
    /// A fast tick was processed
    pub ticked: bool,
    /// A link byte was parsed
    pub event: Option<ParserEvent>,
    /// A column was written
    pub column: Option<ColumnWrite>,
    /// The pattern rate fired (demo step)
    pub pattern: bool,
    /// The heartbeat rate fired
    pub heartbeat: bool,
}

/// Everything the main loop runs
pub struct DisplayController<'a, S, F = BuiltinFont> {
    config: DisplayConfig,
    timebase: TimeBase<'a>,
    link: LinkReceiver<'a>,
    parser: ProtocolParser,
    state: DisplayState,
    render: RenderEngine,
    output: S,
    font: F,
}

impl<'a, S: ColumnSink, F: Font> DisplayController<'a, S, F> {
    pub fn new(
        config: DisplayConfig,
        tick: &'a FastTick,
        link: &'a LinkShared,
        output: S,
        font: F,
    ) -> Self {
        Self {
            timebase: TimeBase::new(tick, config.divisors()),
            link: LinkReceiver::new(link, config.link_idle_max),
            parser: ProtocolParser::new(),
            state: DisplayState::new(config.defaults(), config.pin_end_is_top),
            render: RenderEngine::new(),
            output,
            font,
            config,
        }
    }

    /// Run one main-loop pass
    pub fn poll(&mut self) -> Pass {
        let mut pass = Pass {
            ticked: self.timebase.service(),
            ..Pass::default()
        };

        if self.timebase.take(Rate::Link) {
            self.link.on_idle_window();
        }
        if self.timebase.take(Rate::Scroll) {
            self.render.on_scroll_tick(&mut self.state);
        }

        if let Some(byte) = self.link.take_byte() {
            pass.event = Some(self.parser.feed(byte, &mut self.state));
        }

        if self.timebase.take(Rate::Column) {
            let (index, rows) = self.render.next_column(&mut self.state, &self.font);
            let lit = self
                .output
                .write_column(index, rows, self.state.pin_end_is_top);
            self.timebase
                .select_fast_divisor(lit <= self.config.dim_threshold);
            pass.column = Some(ColumnWrite { index, rows, lit });
        }

        pass.pattern = self.timebase.take(Rate::Pattern);
        pass.heartbeat = self.timebase.take(Rate::Heartbeat);
        pass
    }

    /// Feed a byte as if it came from the link
    pub fn inject(&mut self, byte: u8) -> ParserEvent {
        self.parser.feed(byte, &mut self.state)
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    pub fn parser(&self) -> &ProtocolParser {
        &self.parser
    }

    pub fn render(&self) -> &RenderEngine {
        &self.render
    }

    pub fn timebase(&self) -> &TimeBase<'a> {
        &self.timebase
    }

    pub fn output(&self) -> &S {
        &self.output
    }

    pub fn link_stats(&self) -> LinkStats {
        self.link.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::LinkIsr;
    use matrix57_display::{Mode, NUM_COLUMNS};
    use matrix57_protocol::{bits_msb_first, Command};

    /// Sink that remembers the last row mask written to each column
    #[derive(Default)]
    struct Frame {
        columns: [u8; NUM_COLUMNS],
        writes: usize,
        lit: u8,
    }

    impl ColumnSink for Frame {
        fn write_column(&mut self, index: usize, rows: u8, _pin_end_is_top: bool) -> u8 {
            self.columns[index] = rows;
            self.writes += 1;
            self.lit = rows.count_ones() as u8;
            self.lit
        }

        fn lit(&self) -> u8 {
            self.lit
        }
    }

    fn run(controller: &mut DisplayController<'_, Frame>, tick: &FastTick, ticks: usize) {
        for _ in 0..ticks {
            tick.on_fast_tick();
            controller.poll();
        }
    }

    fn inject(controller: &mut DisplayController<'_, Frame>, command: Command<'_>) {
        for byte in command.encode_to_vec().unwrap() {
            controller.inject(byte);
        }
    }

    #[test]
    fn test_idle_pass_does_nothing() {
        let tick = FastTick::new();
        let link = LinkShared::new();
        let mut controller =
            DisplayController::new(DisplayConfig::default(), &tick, &link, Frame::default(), BuiltinFont);

        assert_eq!(controller.poll(), Pass::default());
        assert_eq!(controller.output().writes, 0);
    }

    #[test]
    fn test_column_every_other_tick() {
        let tick = FastTick::new();
        let link = LinkShared::new();
        let mut config = DisplayConfig::default();
        config.column_divisor_short = config.column_divisor;
        let mut controller = DisplayController::new(config, &tick, &link, Frame::default(), BuiltinFont);

        run(&mut controller, &tick, 20);
        assert_eq!(controller.output().writes, 10);
        assert_eq!(controller.state().mode(), Mode::Norm);
    }

    #[test]
    fn test_brightness_feedback() {
        let tick = FastTick::new();
        let link = LinkShared::new();
        let mut controller =
            DisplayController::new(DisplayConfig::default(), &tick, &link, Frame::default(), BuiltinFont);

        // Column 0 has three lit rows, column 1 four
        inject(&mut controller, Command::Data([0x07, 0x0f, 0x00, 0x00, 0x00]));

        let mut passes = Vec::new();
        while passes.len() < 2 {
            tick.on_fast_tick();
            if let Some(column) = controller.poll().column {
                passes.push((column, controller.timebase().is_short()));
            }
        }

        assert_eq!(passes[0].0.index, 0);
        assert_eq!(passes[0].0.lit, 3);
        assert!(passes[0].1);
        assert_eq!(passes[1].0.index, 1);
        assert_eq!(passes[1].0.lit, 4);
        assert!(!passes[1].1);
    }

    #[test]
    fn test_sparse_columns_refresh_faster() {
        let tick = FastTick::new();
        let link = LinkShared::new();
        let mut controller =
            DisplayController::new(DisplayConfig::default(), &tick, &link, Frame::default(), BuiltinFont);

        // A blank display lights nothing: every column takes one tick
        run(&mut controller, &tick, 2);
        let before = controller.output().writes;
        run(&mut controller, &tick, 10);
        assert_eq!(controller.output().writes - before, 10);
    }

    #[test]
    fn test_character_over_link() {
        let tick = FastTick::new();
        let link = LinkShared::new();
        let mut isr = LinkIsr::new(&link);
        let mut controller =
            DisplayController::new(DisplayConfig::default(), &tick, &link, Frame::default(), BuiltinFont);

        let mut events = Vec::new();
        for bit in bits_msb_first(b'A') {
            isr.on_clock_edge(true, bit);
            isr.on_clock_edge(false, bit);
        }
        tick.on_fast_tick();
        events.extend(controller.poll().event);
        assert_eq!(events, [ParserEvent::Character(b'A')]);

        // Transition of 2 scroll ticks, 11 column edges each, then the glyph
        run(&mut controller, &tick, 2000);
        assert_eq!(controller.state().mode(), Mode::Norm);
        assert_eq!(controller.output().columns, [0x7e, 0x11, 0x11, 0x11, 0x7e]);
        assert_eq!(controller.link_stats().bytes, 1);
    }

    #[test]
    fn test_message_scrolls_and_wraps() {
        let tick = FastTick::new();
        let link = LinkShared::new();
        let mut config = DisplayConfig::default();
        config.dwell = 0;
        config.rate = core::num::NonZeroU8::MIN;
        config.scroll_divisor = core::num::NonZeroU8::MIN;
        let mut controller = DisplayController::new(config, &tick, &link, Frame::default(), BuiltinFont);

        inject(&mut controller, Command::Message(b"0123456789"));
        assert_eq!(controller.state().mode(), Mode::StartScrollMessage);

        let mut wrapped = false;
        for _ in 0..4000 {
            tick.on_fast_tick();
            controller.poll();
            let content = &controller.state().content;
            if content.cursor() != content.head() {
                wrapped = true;
            }
            if wrapped && content.cursor() == content.head() {
                break;
            }
        }
        assert!(wrapped);
        assert_eq!(controller.state().mode(), Mode::ScrollMessage);
        assert_eq!(controller.state().content.current(), b'0');
    }

    #[test]
    fn test_pattern_and_heartbeat_flags() {
        let tick = FastTick::new();
        let link = LinkShared::new();
        let mut config = DisplayConfig::default();
        config.column_divisor_short = config.column_divisor;
        let mut controller = DisplayController::new(config, &tick, &link, Frame::default(), BuiltinFont);

        let mut patterns = 0;
        let mut heartbeats = 0;
        for _ in 0..200 {
            tick.on_fast_tick();
            let pass = controller.poll();
            patterns += usize::from(pass.pattern);
            heartbeats += usize::from(pass.heartbeat);
        }
        // 100 column edges
        assert_eq!(patterns, 10);
        assert_eq!(heartbeats, 1);
    }
}
