//! Link clock edge source
//!
//! On the STM32F0 the pin-change interrupt is an EXTI line. The firmware
//! binds the interrupt and builds the [`ExtiInput`]; [`ClockLine`] waits
//! for the selected transitions and reports the level the line settled at.

use embassy_stm32::exti::ExtiInput;
use embedded_hal_async::digital::Wait;
use matrix57_hal::{Edge, InputPin, Level};

/// Link clock pin with its edge selection (`register_edge_interrupt`)
pub struct ClockLine<'d> {
    pin: ExtiInput<'d>,
    edge: Edge,
}

impl<'d> ClockLine<'d> {
    pub fn new(pin: ExtiInput<'d>, edge: Edge) -> Self {
        Self { pin, edge }
    }

    pub fn edge(&self) -> Edge {
        self.edge
    }

    /// Wait for the next reported transition
    ///
    /// The level is sampled after the wake-up; a bit cell is far longer
    /// than the interrupt latency, so it is the level the edge produced.
    pub async fn wait(&mut self) -> Level {
        // EXTI waits cannot fail
        let _ = match self.edge {
            Edge::Rising => Wait::wait_for_rising_edge(&mut self.pin).await,
            Edge::Falling => Wait::wait_for_falling_edge(&mut self.pin).await,
            Edge::Any => Wait::wait_for_any_edge(&mut self.pin).await,
        };
        self.read()
    }

    pub fn into_inner(self) -> ExtiInput<'d> {
        self.pin
    }
}

impl InputPin for ClockLine<'_> {
    fn is_high(&self) -> bool {
        self.pin.is_high()
    }
}
