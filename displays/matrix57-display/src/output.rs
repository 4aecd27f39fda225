//! Two cascaded shift registers driving the LED matrix
//!
//! One column is written per multiplex cycle: five active-low column
//! selects, a filler bit, then seven active-low row bits, all on a shared
//! data/clock pair while the blanking line holds the LEDs off.

use matrix57_hal::OutputPin;

use crate::{NUM_COLUMNS, NUM_ROWS};

/// Destination of composed columns
pub trait ColumnSink {
    /// Show `rows` on column `index`, returning the number of lit LEDs
    fn write_column(&mut self, index: usize, rows: u8, pin_end_is_top: bool) -> u8;

    /// Lit LED count of the most recent column
    fn lit(&self) -> u8;
}

/// Bit-banged shift-register chain
pub struct ShiftRegisterOutput<D, C, B> {
    data: D,
    clock: C,
    blank: B,
    lit: u8,
}

impl<D: OutputPin, C: OutputPin, B: OutputPin> ShiftRegisterOutput<D, C, B> {
    /// Take the pins, leaving the clock idle low and the display blanked
    pub fn new(data: D, clock: C, blank: B) -> Self {
        let mut output = Self {
            data,
            clock,
            blank,
            lit: 0,
        };
        output.clock.set_low();
        output.blank.set_high();
        output
    }

    /// Release the pins
    pub fn release(self) -> (D, C, B) {
        (self.data, self.clock, self.blank)
    }

    /// Put one bit on the data line and clock it in
    fn shift_bit(&mut self, high: bool) {
        self.data.set_state(high);
        self.pulse_clock();
    }

    fn pulse_clock(&mut self) {
        self.clock.set_high();
        self.clock.set_low();
    }
}

impl<D: OutputPin, C: OutputPin, B: OutputPin> ColumnSink for ShiftRegisterOutput<D, C, B> {
    fn write_column(&mut self, index: usize, rows: u8, pin_end_is_top: bool) -> u8 {
        self.blank.set_high();

        let selected = if pin_end_is_top {
            index
        } else {
            NUM_COLUMNS - 1 - index.min(NUM_COLUMNS - 1)
        };
        for position in 0..NUM_COLUMNS {
            self.shift_bit(position != selected);
        }

        // Unused bit between the two groups
        self.pulse_clock();

        let mut lit = 0;
        for position in 0..NUM_ROWS {
            let row = if pin_end_is_top {
                NUM_ROWS - 1 - position
            } else {
                position
            };
            let on = rows & (1 << row) != 0;
            if on {
                lit += 1;
            }
            self.shift_bit(!on);
        }

        self.blank.set_low();
        self.lit = lit;
        lit
    }

    fn lit(&self) -> u8 {
        self.lit
    }
}
