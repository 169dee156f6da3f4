//! RP2040-specific HAL for the Ranger distance meter
//!
//! This crate provides RP2040-specific implementations of the shared
//! `ranger-hal` traits:
//!
//! - Sensor trigger output (implements `ranger_hal::OutputPin`)
//! - Emulated input-capture timer on the `embassy-time` timebase
//!   (implements `ranger_hal::CaptureHardware`)

#![no_std]

pub mod capture;
pub mod gpio;

pub use capture::{service_edges, CaptureRegisters, SoftCapture, SOURCE_CLOCK_HZ};
pub use gpio::GpioOutput;
