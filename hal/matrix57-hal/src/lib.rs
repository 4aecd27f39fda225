//! Matrix57 Hardware Abstraction Layer
//!
//! This crate defines the hardware capabilities the display core consumes.
//! Chip-specific crates implement them so the same multiplexing, link and
//! rendering code runs on the target and under host tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (matrix57-fw)              │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  matrix57-core / matrix57-display       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  matrix57-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!            ┌─────────────────┐
//!            │ matrix57-hal-   │
//!            │    stm32f0      │
//!            └─────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Digital I/O
//! - [`edge::Edge`] - Which clock transitions a link edge source reports

#![no_std]
#![deny(unsafe_code)]

pub mod edge;
pub mod gpio;

// Re-export key traits at crate root for convenience
pub use edge::{Edge, Level};
pub use gpio::{InputPin, OutputPin};
