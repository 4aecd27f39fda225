//! GPIO wrappers for STM32F0
//!
//! embassy-stm32 pins already know their levels; these newtypes expose
//! them through the `matrix57-hal` traits.

use embassy_stm32::gpio::{Input, Output};

/// Push-pull output driving one line of the shift-register chain
pub struct ShiftPin<'d> {
    pin: Output<'d>,
}

impl<'d> ShiftPin<'d> {
    pub fn new(pin: Output<'d>) -> Self {
        Self { pin }
    }

    pub fn into_inner(self) -> Output<'d> {
        self.pin
    }
}

impl matrix57_hal::OutputPin for ShiftPin<'_> {
    fn set_high(&mut self) {
        self.pin.set_high();
    }

    fn set_low(&mut self) {
        self.pin.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.pin.is_set_high()
    }
}

/// Plain input, e.g. the link data line
pub struct Sense<'d> {
    pin: Input<'d>,
}

impl<'d> Sense<'d> {
    pub fn new(pin: Input<'d>) -> Self {
        Self { pin }
    }

    pub fn into_inner(self) -> Input<'d> {
        self.pin
    }
}

impl matrix57_hal::InputPin for Sense<'_> {
    fn is_high(&self) -> bool {
        self.pin.is_high()
    }
}
