//! Bit-serial link receiver
//!
//! The master drives a clock line and a data line; a byte is eight bits,
//! MSB first, sampled while the clock is high. Reception is split in two:
//!
//! - [`LinkIsr`] runs in the pin-change handler. It owns the bit cursor
//!   and the accumulator and publishes finished bytes.
//! - [`LinkReceiver`] runs in the main loop. It takes published bytes and
//!   watches for a stalled master, asking the interrupt side to drop a
//!   partial byte.
//!
//! [`LinkShared`] is the only state the two halves share. Every field has
//! exactly one writer, so plain atomic loads and stores are enough and no
//! interrupt ever has to be masked.

use matrix57_hal::InputPin;
use portable_atomic::{AtomicU8, Ordering};

/// Mailbox between the interrupt and the main loop
#[derive(Debug)]
pub struct LinkShared {
    /// Last finished byte (ISR writes)
    byte: AtomicU8,
    /// Bytes published so far, wrapping (ISR writes)
    published: AtomicU8,
    /// Bytes taken so far, wrapping (main loop writes)
    consumed: AtomicU8,
    /// Bits accepted so far, wrapping (ISR writes)
    accepted_bits: AtomicU8,
    /// Edges dropped because a byte was waiting, wrapping (ISR writes)
    dropped_edges: AtomicU8,
    /// Resynchronisation requests, wrapping (main loop writes)
    resync_requests: AtomicU8,
}

impl Default for LinkShared {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkShared {
    pub const fn new() -> Self {
        Self {
            byte: AtomicU8::new(0),
            published: AtomicU8::new(0),
            consumed: AtomicU8::new(0),
            accepted_bits: AtomicU8::new(0),
            dropped_edges: AtomicU8::new(0),
            resync_requests: AtomicU8::new(0),
        }
    }

    /// A finished byte is waiting for the main loop
    pub fn is_available(&self) -> bool {
        self.published.load(Ordering::Acquire) != self.consumed.load(Ordering::Acquire)
    }
}

fn bump(counter: &AtomicU8, ordering: Ordering) {
    let value = counter.load(Ordering::Relaxed);
    counter.store(value.wrapping_add(1), ordering);
}

/// Interrupt half of the receiver
#[derive(Debug)]
pub struct LinkIsr<'a> {
    shared: &'a LinkShared,
    /// Bit written by the next accepted edge, 7 down to 0
    cur_bit: u8,
    accumulator: u8,
    resync_seen: u8,
}

impl<'a> LinkIsr<'a> {
    pub fn new(shared: &'a LinkShared) -> Self {
        Self {
            shared,
            cur_bit: 7,
            accumulator: 0,
            resync_seen: shared.resync_requests.load(Ordering::Acquire),
        }
    }

    /// Handle a clock line change, sampling both pins
    pub fn on_pin_change<C: InputPin, D: InputPin>(&mut self, clock: &C, data: &D) {
        self.on_clock_edge(clock.is_high(), data.is_high());
    }

    /// Handle a clock line change with already sampled levels
    pub fn on_clock_edge(&mut self, clock_high: bool, data_high: bool) {
        let requests = self.shared.resync_requests.load(Ordering::Acquire);
        if requests != self.resync_seen {
            self.resync_seen = requests;
            self.cur_bit = 7;
            self.accumulator = 0;
        }

        if !clock_high {
            return;
        }
        if self.shared.is_available() {
            // The main loop has not taken the last byte yet
            bump(&self.shared.dropped_edges, Ordering::Relaxed);
            return;
        }

        if data_high {
            self.accumulator |= 1 << self.cur_bit;
        }
        bump(&self.shared.accepted_bits, Ordering::Release);

        if self.cur_bit == 0 {
            self.shared.byte.store(self.accumulator, Ordering::Relaxed);
            bump(&self.shared.published, Ordering::Release);
            self.cur_bit = 7;
            self.accumulator = 0;
        } else {
            self.cur_bit -= 1;
        }
    }
}

/// Link counters for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkStats {
    /// Bytes handed to the parser
    pub bytes: u32,
    /// Partial bytes dropped by the idle watchdog
    pub resyncs: u32,
    /// Clock edges ignored while a byte was waiting, wrapping
    pub dropped_edges: u8,
}

/// Main-loop half of the receiver
#[derive(Debug)]
pub struct LinkReceiver<'a> {
    shared: &'a LinkShared,
    idle: u8,
    idle_max: u8,
    last_bits: u8,
    stats: LinkStats,
}

impl<'a> LinkReceiver<'a> {
    /// `idle_max` is the watchdog ceiling; values below 2 act as 2
    pub fn new(shared: &'a LinkShared, idle_max: u8) -> Self {
        Self {
            shared,
            idle: 0,
            idle_max: idle_max.max(2),
            last_bits: shared.accepted_bits.load(Ordering::Acquire),
            stats: LinkStats::default(),
        }
    }

    /// Take the waiting byte, if any
    pub fn take_byte(&mut self) -> Option<u8> {
        let published = self.shared.published.load(Ordering::Acquire);
        let consumed = self.shared.consumed.load(Ordering::Relaxed);
        if published == consumed {
            return None;
        }
        let byte = self.shared.byte.load(Ordering::Relaxed);
        self.shared.consumed.store(published, Ordering::Release);
        self.stats.bytes = self.stats.bytes.wrapping_add(1);
        Some(byte)
    }

    pub fn is_available(&self) -> bool {
        self.shared.is_available()
    }

    /// One idle window of the watchdog
    ///
    /// A window without any accepted bit raises the idle counter up to its
    /// ceiling; reaching `ceiling - 1` drops whatever partial byte the
    /// interrupt side holds.
    pub fn on_idle_window(&mut self) {
        let bits = self.shared.accepted_bits.load(Ordering::Acquire);
        if bits != self.last_bits {
            self.last_bits = bits;
            self.idle = 0;
            return;
        }

        if self.idle < self.idle_max {
            self.idle += 1;
            if self.idle == self.idle_max - 1 {
                self.request_resync();
            }
        }
    }

    /// Make the interrupt side restart at bit 7 on its next edge
    pub fn request_resync(&mut self) {
        bump(&self.shared.resync_requests, Ordering::Release);
        self.stats.resyncs = self.stats.resyncs.wrapping_add(1);
    }

    pub fn idle(&self) -> u8 {
        self.idle
    }

    pub fn stats(&self) -> LinkStats {
        LinkStats {
            dropped_edges: self.shared.dropped_edges.load(Ordering::Relaxed),
            ..self.stats
        }
    }
}
