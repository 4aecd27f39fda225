//! GPIO pin abstractions
//!
//! Provides traits for digital input and output pins that can be implemented
//! by chip-specific HALs.

use crate::edge::Level;

/// Digital output pin (`digital_write`)
///
/// The shift-register chain needs nothing more than three of these:
/// serial data, serial clock and the blanking line.
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Set the pin to a specific state
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Drive the pin to a logic level
    fn write(&mut self, level: Level) {
        self.set_state(level.is_high());
    }

    /// Check if the pin is currently set high
    fn is_set_high(&self) -> bool;

    /// Check if the pin is currently set low
    fn is_set_low(&self) -> bool {
        !self.is_set_high()
    }
}

/// Digital input pin (`digital_read`)
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&self) -> bool;

    /// Check if the pin reads low (logic 0)
    fn is_low(&self) -> bool {
        !self.is_high()
    }

    /// Sample the pin
    fn read(&self) -> Level {
        Level::from(self.is_high())
    }
}

impl<T: OutputPin + ?Sized> OutputPin for &mut T {
    fn set_high(&mut self) {
        (**self).set_high();
    }

    fn set_low(&mut self) {
        (**self).set_low();
    }

    fn is_set_high(&self) -> bool {
        (**self).is_set_high()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockPin {
        high: bool,
    }

    impl OutputPin for MockPin {
        fn set_high(&mut self) {
            self.high = true;
        }

        fn set_low(&mut self) {
            self.high = false;
        }

        fn is_set_high(&self) -> bool {
            self.high
        }
    }

    impl InputPin for MockPin {
        fn is_high(&self) -> bool {
            self.high
        }
    }

    #[test]
    fn test_write_level() {
        let mut pin = MockPin { high: false };
        pin.write(Level::High);
        assert!(pin.is_set_high());
        assert_eq!(pin.read(), Level::High);

        pin.write(Level::Low);
        assert!(pin.is_set_low());
        assert!(pin.is_low());
    }

    fn drive_high<P: OutputPin>(mut pin: P) {
        pin.set_state(true);
    }

    #[test]
    fn test_mut_ref_forwards() {
        let mut pin = MockPin { high: false };
        drive_high(&mut pin);
        assert!(pin.high);
    }
}
