//! Display configuration
//!
//! Every rate, divisor and default the firmware uses. [`Default`] holds
//! the values of the reference build.

use core::num::NonZeroU8;

use matrix57_display::Defaults;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::timebase::Divisors;

const fn nz(value: u8) -> NonZeroU8 {
    match NonZeroU8::new(value) {
        Some(value) => value,
        None => NonZeroU8::MIN,
    }
}

/// Complete display configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisplayConfig {
    /// Fast tick rate of the periodic interrupt (Hz)
    pub fast_tick_hz: u32,
    /// Fast ticks per column, normal brightness
    pub column_divisor: NonZeroU8,
    /// Fast ticks per column for sparsely lit columns
    pub column_divisor_short: NonZeroU8,
    /// Column edges per scroll tick
    pub scroll_divisor: NonZeroU8,
    /// Column edges per link idle window
    pub link_divisor: NonZeroU8,
    /// Column edges per demo pattern step
    pub pattern_divisor: NonZeroU8,
    /// Column edges per heartbeat
    pub heartbeat_divisor: NonZeroU8,
    /// Idle ceiling of the link watchdog (at least 2)
    pub link_idle_max: u8,
    /// Scroll ticks a character is held before scrolling on
    pub dwell: u8,
    /// Scroll ticks per scroll phase
    pub rate: NonZeroU8,
    /// Scroll ticks of blank gap before new content
    pub transition: u8,
    /// Columns with at most this many lit LEDs use the short divisor
    pub dim_threshold: u8,
    /// Pin end of the board faces up at power-on
    pub pin_end_is_top: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            fast_tick_hz: 1000,
            column_divisor: nz(2),
            column_divisor_short: nz(1),
            scroll_divisor: nz(11),
            link_divisor: nz(1),
            pattern_divisor: nz(10),
            heartbeat_divisor: nz(100),
            link_idle_max: 2,
            dwell: 30,
            rate: nz(2),
            transition: 2,
            dim_threshold: 3,
            pin_end_is_top: false,
        }
    }
}

impl DisplayConfig {
    /// Values a `reset` command restores
    pub fn defaults(&self) -> Defaults {
        Defaults {
            dwell: self.dwell,
            rate: self.rate,
            transition: self.transition,
        }
    }

    /// Divider settings for the time base
    pub fn divisors(&self) -> Divisors {
        Divisors {
            column: self.column_divisor,
            column_short: self.column_divisor_short,
            scroll: self.scroll_divisor,
            link: self.link_divisor,
            pattern: self.pattern_divisor,
            heartbeat: self.heartbeat_divisor,
        }
    }

    /// Period of the fast tick in microseconds
    pub fn tick_period_us(&self) -> u32 {
        1_000_000 / self.fast_tick_hz.max(1)
    }

    /// Column refresh rate at normal brightness (Hz)
    pub fn column_hz(&self) -> u32 {
        self.fast_tick_hz / u32::from(self.column_divisor.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_values() {
        let config = DisplayConfig::default();
        assert_eq!(config.tick_period_us(), 1000);
        assert_eq!(config.column_hz(), 500);
        assert_eq!(config.defaults(), Defaults::default());

        let divisors = config.divisors();
        assert_eq!(divisors.column.get(), 2);
        assert_eq!(divisors.column_short.get(), 1);
        assert_eq!(divisors.scroll.get(), 11);
        assert_eq!(divisors.link.get(), 1);
        assert_eq!(divisors.pattern.get(), 10);
        assert_eq!(divisors.heartbeat.get(), 100);
    }

    #[test]
    fn test_nz_never_zero() {
        assert_eq!(nz(0), NonZeroU8::MIN);
        assert_eq!(nz(7).get(), 7);
    }
}
