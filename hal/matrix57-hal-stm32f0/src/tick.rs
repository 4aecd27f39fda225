//! Periodic fast tick
//!
//! The single timer interrupt of the firmware. embassy-time's time driver
//! owns the hardware timer; a [`Ticker`] on top of it gives a drift-free
//! period without touching timer registers.

use embassy_time::{Duration, Ticker};

/// Fast tick source at a fixed rate
pub struct FastTicker {
    ticker: Ticker,
    period: Duration,
}

impl FastTicker {
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Wait for the next tick
    pub async fn next(&mut self) {
        self.ticker.next().await;
    }

    /// Restart the period from now
    pub fn reset(&mut self) {
        self.ticker.reset();
    }
}

/// Start a tick source firing `hz` times per second (`configure_periodic_tick`)
///
/// A rate of 0 is treated as 1 Hz.
pub fn configure_periodic_tick(hz: u32) -> FastTicker {
    let period = Duration::from_hz(u64::from(hz.max(1)));
    FastTicker {
        ticker: Ticker::every(period),
        period,
    }
}
