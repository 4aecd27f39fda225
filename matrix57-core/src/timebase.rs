//! Cascaded time base
//!
//! The periodic interrupt only bumps [`FastTick`]. The main loop calls
//! [`TimeBase::service`], which divides the fast tick down to the column
//! (multiplex) rate and, on every column edge, steps four independent
//! dividers for the scroll, link, pattern and heartbeat rates. Each rate
//! has a sticky flag that only its consumer clears.

use core::num::NonZeroU8;

use portable_atomic::{AtomicU8, Ordering};

/// Fast tick events, written only by the tick interrupt
///
/// The interrupt increments a wrapping count; the main loop compares it
/// with the last count it saw. Neither side ever does a read-modify-write
/// on a value the other side writes.
#[derive(Debug)]
pub struct FastTick {
    count: AtomicU8,
}

impl Default for FastTick {
    fn default() -> Self {
        Self::new()
    }
}

impl FastTick {
    pub const fn new() -> Self {
        Self {
            count: AtomicU8::new(0),
        }
    }

    /// Record one fast tick (interrupt context)
    pub fn on_fast_tick(&self) {
        let count = self.count.load(Ordering::Relaxed);
        self.count.store(count.wrapping_add(1), Ordering::Release);
    }

    /// Number of ticks so far, wrapping
    pub fn count(&self) -> u8 {
        self.count.load(Ordering::Acquire)
    }
}

/// Derived event rates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rate {
    /// One multiplex column
    Column,
    /// Scroll, dwell and transition counting
    Scroll,
    /// Link idle window
    Link,
    /// Demo pattern step
    Pattern,
    /// Status heartbeat
    Heartbeat,
}

impl Rate {
    pub const ALL: [Rate; 5] = [
        Rate::Column,
        Rate::Scroll,
        Rate::Link,
        Rate::Pattern,
        Rate::Heartbeat,
    ];

    const fn index(self) -> usize {
        self as usize
    }
}

/// Divisor settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Divisors {
    /// Fast ticks per column edge
    pub column: NonZeroU8,
    /// Fast ticks per column edge when the short divisor is selected
    pub column_short: NonZeroU8,
    /// Column edges per scroll tick
    pub scroll: NonZeroU8,
    /// Column edges per link window
    pub link: NonZeroU8,
    /// Column edges per pattern step
    pub pattern: NonZeroU8,
    /// Column edges per heartbeat
    pub heartbeat: NonZeroU8,
}

/// Down-counter that reloads from its divisor
///
/// The counter always stays in `1..=divisor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Divider {
    counter: u8,
    divisor: NonZeroU8,
    flag: bool,
}

impl Divider {
    pub const fn new(divisor: NonZeroU8) -> Self {
        Self {
            counter: divisor.get(),
            divisor,
            flag: false,
        }
    }

    /// Count one input event, returning true on the reload edge
    pub fn step(&mut self) -> bool {
        self.counter -= 1;
        if self.counter == 0 {
            self.counter = self.divisor.get();
            self.flag = true;
            true
        } else {
            false
        }
    }

    /// Change the divisor used from the next reload on
    pub fn set_divisor(&mut self, divisor: NonZeroU8) {
        self.divisor = divisor;
        self.counter = self.counter.min(divisor.get());
    }

    /// Restart the current period with the current divisor
    pub fn rearm(&mut self) {
        self.counter = self.divisor.get();
    }

    /// Read and clear the sticky flag
    pub fn take(&mut self) -> bool {
        core::mem::replace(&mut self.flag, false)
    }

    pub fn is_set(&self) -> bool {
        self.flag
    }

    pub fn counter(&self) -> u8 {
        self.counter
    }

    pub fn divisor(&self) -> NonZeroU8 {
        self.divisor
    }
}

/// Main-loop side of the time base
pub struct TimeBase<'a> {
    source: &'a FastTick,
    seen: u8,
    dividers: [Divider; 5],
    column_normal: NonZeroU8,
    column_short: NonZeroU8,
    short: bool,
    /// A column edge happened and no fast tick has been counted since
    fresh_edge: bool,
    coalesced: u32,
}

impl<'a> TimeBase<'a> {
    pub fn new(source: &'a FastTick, divisors: Divisors) -> Self {
        Self {
            source,
            seen: source.count(),
            dividers: [
                Divider::new(divisors.column),
                Divider::new(divisors.scroll),
                Divider::new(divisors.link),
                Divider::new(divisors.pattern),
                Divider::new(divisors.heartbeat),
            ],
            column_normal: divisors.column,
            column_short: divisors.column_short,
            short: false,
            fresh_edge: false,
            coalesced: 0,
        }
    }

    /// Process a pending fast tick, if any
    ///
    /// Several ticks that arrived since the last call count as one; the
    /// surplus is added to [`TimeBase::coalesced`]. Returns true if a tick
    /// was processed.
    pub fn service(&mut self) -> bool {
        let now = self.source.count();
        if now == self.seen {
            return false;
        }
        let missed = now.wrapping_sub(self.seen) - 1;
        self.coalesced = self.coalesced.saturating_add(u32::from(missed));
        self.seen = now;

        self.fresh_edge = self.dividers[Rate::Column.index()].step();
        if self.fresh_edge {
            for divider in &mut self.dividers[1..] {
                divider.step();
            }
        }
        true
    }

    /// Choose the short or normal column divisor
    ///
    /// Called right after a column is written. If no fast tick has passed
    /// since that column's edge, the running period restarts with the new
    /// divisor so the column's on-time matches its brightness.
    pub fn select_fast_divisor(&mut self, short: bool) {
        self.short = short;
        let divisor = if short {
            self.column_short
        } else {
            self.column_normal
        };
        let column = &mut self.dividers[Rate::Column.index()];
        column.set_divisor(divisor);
        if self.fresh_edge {
            column.rearm();
        }
    }

    /// Read and clear the flag of `rate`
    pub fn take(&mut self, rate: Rate) -> bool {
        self.dividers[rate.index()].take()
    }

    pub fn is_set(&self, rate: Rate) -> bool {
        self.dividers[rate.index()].is_set()
    }

    pub fn counter(&self, rate: Rate) -> u8 {
        self.dividers[rate.index()].counter()
    }

    pub fn divisor(&self, rate: Rate) -> NonZeroU8 {
        self.dividers[rate.index()].divisor()
    }

    /// Whether the short column divisor is selected
    pub fn is_short(&self) -> bool {
        self.short
    }

    /// Fast ticks absorbed because the main loop fell behind
    pub fn coalesced(&self) -> u32 {
        self.coalesced
    }
}
