//! Column composition and the mode/scroll state machines
//!
//! Once per multiplex cycle [`RenderEngine::next_column`] evaluates the
//! mode, recomputes the five columns if something changed, and hands out
//! the next column in 0→4→0 order.

use matrix57_protocol::{FontSelect, NUM_COLUMNS};

use crate::content::ContentKind;
use crate::font::{glyph_index, Font};
use crate::state::{DisplayState, Mode, SCROLL_PHASES};
use crate::transpose::two_small_chars;

/// Phases at which the current character has left and the gap shows
const GAP_PHASES: u8 = 3;

/// Turns display state into column row masks
#[derive(Debug, Clone, Default)]
pub struct RenderEngine {
    columns: [u8; NUM_COLUMNS],
    column: usize,
    rendered_step: Option<u8>,
}

impl RenderEngine {
    pub const fn new() -> Self {
        Self {
            columns: [0; NUM_COLUMNS],
            column: 0,
            rendered_step: None,
        }
    }

    /// Columns as currently composed
    pub fn columns(&self) -> &[u8; NUM_COLUMNS] {
        &self.columns
    }

    /// Index of the column the next cycle writes
    pub fn column_index(&self) -> usize {
        self.column
    }

    /// Scroll-rate tick: dwell, scroll phase and transition counting
    pub fn on_scroll_tick(&mut self, state: &mut DisplayState) {
        state.scroll.tick();

        if state.mode() == Mode::InTransition {
            let scroll = &mut state.scroll;
            scroll.transition_counter = scroll.transition_counter.saturating_add(1);
            if scroll.transition_counter > scroll.transition_max
                || scroll.transition_counter == u8::MAX
            {
                state.content.rewind();
                state.set_mode(Mode::Norm);
            }
        }
    }

    /// Evaluate the mode for this cycle and return the column to write
    pub fn next_column<F: Font>(&mut self, state: &mut DisplayState, font: &F) -> (usize, u8) {
        self.compose(state, font);

        let index = self.column;
        self.column = (index + 1) % NUM_COLUMNS;
        (index, self.columns[index])
    }

    /// Run the mode machine once and refresh the columns
    pub fn compose<F: Font>(&mut self, state: &mut DisplayState, font: &F) {
        match state.mode() {
            Mode::Reset => {
                state.set_mode(Mode::Norm);
                self.compose_steady(state, font);
            }
            Mode::StartTransition => {
                if state.scroll.transition_max != 0 {
                    state.scroll.transition_counter = 0;
                    state.set_mode(Mode::InTransition);
                    self.columns = [0; NUM_COLUMNS];
                } else {
                    state.set_mode(Mode::Norm);
                    self.compose_steady(state, font);
                }
            }
            Mode::InTransition => {
                self.columns = [0; NUM_COLUMNS];
            }
            Mode::StartScrollMessage => {
                self.columns = [0; NUM_COLUMNS];
                self.rendered_step = None;
                state.scroll.restart();
                state.content.rewind();
                state.set_mode(Mode::ScrollMessage);
            }
            Mode::ScrollMessage => {
                let step = state.scroll.step;
                if self.rendered_step != Some(step) {
                    self.render_phase(state, font, step);
                    self.rendered_step = Some(step);
                }
            }
            Mode::Norm => {
                if state.is_dirty() {
                    self.compose_steady(state, font);
                }
            }
        }
    }

    fn compose_steady<F: Font>(&mut self, state: &mut DisplayState, font: &F) {
        state.take_dirty();
        let content = &state.content;
        self.columns = match content.kind() {
            ContentKind::Ascii => font.glyph(state.font, content.current()),
            ContentKind::Raw => content.columns(),
            ContentKind::TwoChars => {
                let (first, second) = content.pair();
                let first = font.glyph(FontSelect::Narrow, first);
                let second = font.glyph(FontSelect::Narrow, second);
                two_small_chars(&first, &second, state.flip_two_chars)
            }
        };
    }

    /// Phase 0 shows the current glyph, phases 1-2 shift it out behind a
    /// blank gap and phases 3-7 shift the next glyph in from column 4
    fn render_phase<F: Font>(&mut self, state: &mut DisplayState, font: &F, step: u8) {
        let content = &mut state.content;
        match step {
            0 => self.columns = font.glyph(state.font, content.current()),
            s if s < GAP_PHASES => self.shift_in(0),
            s => {
                let index = glyph_index(content.peek_next());
                let offset = usize::from(s - GAP_PHASES);
                self.shift_in(font.column(state.font, index, offset));
            }
        }

        if step == SCROLL_PHASES - 1 {
            content.advance_cursor();
            state.scroll.dwell_counter = state.scroll.dwell_divisor;
        }
    }

    fn shift_in(&mut self, column: u8) {
        self.columns.rotate_left(1);
        self.columns[NUM_COLUMNS - 1] = column;
    }
}
