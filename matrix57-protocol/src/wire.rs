//! Bit-level framing of the two-wire link
//!
//! The master sets the data line, raises the clock, waits half a bit
//! period, lowers the clock and waits again. The receiver samples data
//! while the clock is high. Bytes go MSB first with no start, stop or
//! acknowledge bits; recovering from a truncated byte is the receiver's
//! idle timeout.

/// Half-bit period used by the reference master, in microseconds
pub const HALF_BIT_PERIOD_US: u32 = 150;

/// Gap the reference master leaves after every byte, in milliseconds
pub const INTER_COMMAND_GAP_MS: u32 = 5;

/// Data line levels for one byte, in transmission order (MSB first)
pub fn bits_msb_first(byte: u8) -> impl Iterator<Item = bool> {
    (0..8).rev().map(move |bit| byte & (1 << bit) != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bits_msb_first() {
        let bits: heapless::Vec<bool, 8> = bits_msb_first(0b1000_0011).collect();
        assert_eq!(
            bits.as_slice(),
            &[true, false, false, false, false, false, true, true]
        );
    }

    #[test]
    fn test_byte_fits_between_commands() {
        // Eight full bit periods must finish well inside the inter-command gap
        let byte_us = 8 * 2 * HALF_BIT_PERIOD_US;
        assert!(byte_us < INTER_COMMAND_GAP_MS * 1000);
    }
}
