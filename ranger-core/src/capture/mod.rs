//! Capture timer unit
//!
//! Driver for one input-capture timer: configuration, the single handler
//! slot, and the interrupt dispatch entry point. Shared between thread
//! context and the capture interrupt.

pub mod unit;

pub use unit::{CaptureConfig, CaptureUnit};
