//! Rendering and output for the Matrix57 5×7 LED module
//!
//! This crate provides:
//! - [`ContentBuffer`] holding the received text, character pair or bitmap
//! - [`DisplayState`], the state shared between the protocol parser and
//!   the renderer (mode, scroll timing, orientation)
//! - [`Font`] capability plus the built-in 5×7 and 3×5 glyph tables
//! - [`RenderEngine`] turning the state into per-column row masks
//! - [`ShiftRegisterOutput`] clocking one column at a time into the two
//!   cascaded shift registers
//!
//! # Geometry
//!
//! ```text
//!          columns
//!   bit    0 1 2 3 4
//!    0   | | | | | |
//!    1   | | | | | |
//!   ...  | | | | | |
//!    6   | | | | | |
//!        +---------+
//!         | | | | |   <- edge connector (pin end)
//! ```
//!
//! Each column is a 7-bit row mask; bit 0 is the row furthest from the
//! pin end.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod content;
pub mod font;
mod glyphs;
pub mod output;
pub mod render;
pub mod state;
pub mod transpose;

// Re-export key types
pub use content::{ContentBuffer, ContentKind, BUFFER_CAPACITY};
pub use font::{glyph_index, BuiltinFont, Font};
pub use output::{ColumnSink, ShiftRegisterOutput};
pub use render::RenderEngine;
pub use state::{Defaults, DisplayState, Mode, ScrollState};
pub use transpose::ShiftDir;

pub use matrix57_protocol::{NUM_COLUMNS, NUM_ROWS};

/// Mask of the seven row bits in a column byte
pub const ROW_MASK: u8 = 0b0111_1111;
