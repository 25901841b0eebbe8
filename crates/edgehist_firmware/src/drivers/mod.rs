//! Hardware driver modules for firmware peripherals.
//!
//! Thin MMIO wrappers for the input-capture timer and the interrupt
//! controller. Register programming lives here so the capture pipeline only
//! ever sees already-latched timestamps.

pub mod capture_unit;
pub mod plic;
