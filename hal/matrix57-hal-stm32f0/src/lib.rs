//! STM32F0-specific HAL for the Matrix57 firmware
//!
//! Binds the `matrix57-hal` capabilities to embassy-stm32:
//!
//! - [`gpio`] - push-pull outputs and plain inputs as `OutputPin`/`InputPin`
//! - [`edge`] - the link clock line as an EXTI edge source
//! - [`tick`] - the periodic fast tick
//!
//! # Features
//!
//! - `stm32f042f6` / `stm32f042k6` - Chip variant
//! - `defmt` - Enable debug formatting support
//!
//! Peripheral construction (`embassy_stm32::init`, interrupt binding) stays
//! in the firmware; this crate only wraps pins it is handed.

#![no_std]

pub mod edge;
pub mod gpio;
pub mod tick;

pub use edge::ClockLine;
pub use gpio::{Sense, ShiftPin};
pub use tick::{configure_periodic_tick, FastTicker};
