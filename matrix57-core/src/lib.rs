//! Board-agnostic core logic for the dot-matrix firmware
//!
//! This crate contains everything between the pins and the pixels that
//! does not depend on a specific microcontroller:
//!
//! - Time base deriving the column, scroll, link, pattern and heartbeat
//!   rates from one fast tick
//! - Bit-serial link receiver, split into an interrupt half and a main
//!   loop half that share only single-writer atomics
//! - Escape-framed protocol parser
//! - The main-loop controller tying them to the renderer and output
//! - Configuration and the demo pattern generator
//!
//! # Interrupt / main loop split
//!
//! ```text
//!  periodic tick ──► FastTick ─────┐
//!                                  ▼
//!  clock edge ─► LinkIsr ─► LinkShared ─► DisplayController::poll()
//!                                          │ TimeBase::service
//!                                          │ LinkReceiver::take_byte ─► ProtocolParser
//!                                          │ RenderEngine::next_column
//!                                          ▼
//!                                    ShiftRegisterOutput
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod controller;
pub mod demo;
pub mod link;
pub mod parser;
pub mod timebase;

pub use config::DisplayConfig;
pub use controller::{DisplayController, Pass};
pub use demo::DemoSequencer;
pub use link::{LinkIsr, LinkReceiver, LinkShared, LinkStats};
pub use parser::{Parameter, ParserEvent, ProtocolParser};
pub use timebase::{Divisors, FastTick, Rate, TimeBase};
