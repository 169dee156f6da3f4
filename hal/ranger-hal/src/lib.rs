//! Ranger Hardware Abstraction Layer
//!
//! This crate defines hardware abstraction traits that can be implemented
//! by chip-specific HALs. The measurement engine in `ranger-core` only ever
//! talks to these traits, so the same echo-timing logic runs on the RP2040
//! board and on the simulated board used by the host tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (ranger-firmware)          │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  ranger-core (capture unit, ranging)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  ranger-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │  ranger-hal-  │
//!             │    rp2040     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`] - Digital output (sensor trigger line)
//! - [`capture::CaptureHardware`] - Register interface of an input-capture timer

#![no_std]
#![deny(unsafe_code)]

pub mod capture;
pub mod gpio;

// Re-export key traits at crate root for convenience
pub use capture::{CaptureHardware, ClockSelect, Edge, Ticks};
pub use gpio::OutputPin;
