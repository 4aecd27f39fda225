//! Matrix57 Two-Wire Command Protocol
//!
//! This crate defines the byte-level protocol a master uses to drive the
//! 5×7 dot-matrix module over a synchronous clock/data pair. There is no
//! return channel: the master paces the link and the module never answers.
//!
//! # Protocol Overview
//!
//! Bytes travel MSB first, one bit per clock pulse. Every byte is content
//! unless it is the reserved escape value, in which case the next byte is
//! an opcode:
//! ```text
//! ┌────────┬────────┬──────────────────────────────┐
//! │ ESCAPE │ OPCODE │ PARAMETERS (0–33 bytes)      │
//! │ 0x27   │ 1B     │ content bytes, opcode-defined│
//! └────────┴────────┴──────────────────────────────┘
//! ```
//!
//! Bytes outside a command (no preceding escape) are literal ASCII
//! characters shown one at a time.

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

pub mod command;
pub mod opcode;
pub mod wire;

pub use command::{Command, EncodeError, FontSelect, MAX_COMMAND_SIZE, MAX_MESSAGE_LEN};
pub use opcode::{Opcode, ESCAPE};
pub use wire::{bits_msb_first, HALF_BIT_PERIOD_US, INTER_COMMAND_GAP_MS};

/// Number of LED columns on the module
pub const NUM_COLUMNS: usize = 5;

/// Number of LED rows on the module
pub const NUM_ROWS: usize = 7;
