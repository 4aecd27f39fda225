//! Display state shared by the protocol parser and the renderer
//!
//! The parser writes content, settings and mode requests; the renderer
//! advances the mode and scroll state machines. Both run in the main loop,
//! so plain `&mut` access is enough.

use core::num::NonZeroU8;

use matrix57_protocol::FontSelect;

use crate::content::ContentBuffer;
use crate::transpose::ShiftDir;

/// Number of scroll phases per character
pub const SCROLL_PHASES: u8 = 8;

/// Render mode, evaluated once per multiplex cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Power-on, becomes Norm on the first cycle
    Reset,
    /// Static content
    Norm,
    /// Blank, then begin scrolling the message
    StartScrollMessage,
    /// Scrolling the message
    ScrollMessage,
    /// Begin a blank gap before new content
    StartTransition,
    /// Blank gap counting down
    InTransition,
}

/// Values restored by a `reset` command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Defaults {
    /// Scroll ticks a fully shown character is held
    pub dwell: u8,
    /// Scroll ticks per scroll phase
    pub rate: NonZeroU8,
    /// Scroll ticks of blank gap before new content
    pub transition: u8,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            dwell: 30,
            rate: NonZeroU8::MIN.saturating_add(1),
            transition: 2,
        }
    }
}

/// Scroll and transition counters, all ticked by the scroll-rate flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScrollState {
    /// Current scroll phase, 0..[`SCROLL_PHASES`]
    pub step: u8,
    pub dwell_counter: u8,
    pub dwell_divisor: u8,
    /// Always in `1..=rate_divisor`
    pub rate_counter: u8,
    pub rate_divisor: NonZeroU8,
    pub transition_counter: u8,
    pub transition_max: u8,
}

impl ScrollState {
    pub fn new(defaults: &Defaults) -> Self {
        Self {
            step: 0,
            dwell_counter: defaults.dwell,
            dwell_divisor: defaults.dwell,
            rate_counter: defaults.rate.get(),
            rate_divisor: defaults.rate,
            transition_counter: 0,
            transition_max: defaults.transition,
        }
    }

    pub fn set_dwell(&mut self, ticks: u8) {
        self.dwell_divisor = ticks;
        self.dwell_counter = ticks;
    }

    /// A rate of 0 runs as 1
    pub fn set_rate(&mut self, ticks: u8) {
        self.rate_divisor = NonZeroU8::new(ticks).unwrap_or(NonZeroU8::MIN);
        self.rate_counter = self.rate_divisor.get();
    }

    pub fn set_transition(&mut self, ticks: u8) {
        self.transition_max = ticks;
        self.transition_counter = ticks;
    }

    /// One scroll-rate tick of dwell and rate counting
    ///
    /// Returns true when the scroll phase advanced.
    pub fn tick(&mut self) -> bool {
        if self.dwell_counter > 0 {
            self.dwell_counter -= 1;
        }
        if self.dwell_counter != 0 {
            return false;
        }

        self.rate_counter = self.rate_counter.saturating_sub(1);
        if self.rate_counter == 0 {
            self.rate_counter = self.rate_divisor.get();
            self.advance_phase();
            true
        } else {
            false
        }
    }

    /// Move to the next scroll phase
    ///
    /// Phase 7 wraps to phase 0, which redraws the glyph phase 7 already
    /// shifted in: every character holds one extra rate period.
    pub fn advance_phase(&mut self) {
        self.step = (self.step + 1) % SCROLL_PHASES;
    }

    /// Restart scrolling at phase 0 with a full dwell
    pub fn restart(&mut self) {
        self.step = 0;
        self.dwell_counter = self.dwell_divisor;
        self.rate_counter = self.rate_divisor.get();
    }
}

/// Everything the renderer reads and the parser writes
#[derive(Debug, Clone)]
pub struct DisplayState {
    pub content: ContentBuffer,
    pub scroll: ScrollState,
    pub font: FontSelect,
    pub shift_dir: ShiftDir,
    /// Pin end of the board faces up
    pub pin_end_is_top: bool,
    /// Use the mirrored two-character layout
    pub flip_two_chars: bool,
    mode: Mode,
    dirty: bool,
    defaults: Defaults,
}

impl DisplayState {
    /// Power-on state: the reset state in [`Mode::Reset`], with the
    /// orientation of the physical build
    pub fn new(defaults: Defaults, pin_end_is_top: bool) -> Self {
        let mut state = Self {
            content: ContentBuffer::new(),
            scroll: ScrollState::new(&defaults),
            font: FontSelect::Wide,
            shift_dir: ShiftDir::IntoLast,
            pin_end_is_top,
            flip_two_chars: false,
            mode: Mode::Reset,
            dirty: true,
            defaults,
        };
        state.reset();
        state.pin_end_is_top = pin_end_is_top;
        state.mode = Mode::Reset;
        state
    }

    /// Restore every setting to its default and blank the display
    pub fn reset(&mut self) {
        self.content.clear();
        self.scroll = ScrollState::new(&self.defaults);
        self.font = FontSelect::Wide;
        self.shift_dir = ShiftDir::IntoLast;
        self.pin_end_is_top = false;
        self.flip_two_chars = false;
        self.set_mode(Mode::Norm);
    }

    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Change mode; the next cycle recomputes the columns
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.dirty = true;
    }

    /// Force the columns to be recomputed
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Take the dirty flag, clearing it
    pub fn take_dirty(&mut self) -> bool {
        core::mem::replace(&mut self.dirty, false)
    }
}
