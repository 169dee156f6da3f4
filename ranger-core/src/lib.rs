//! Board-agnostic core logic for the Ranger distance meter
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Capture timer unit driver (edge configuration, handler slot, dispatch)
//! - Echo measurement state machine and blocking distance reads
//! - Tick-to-centimetre calibration
//! - Configuration types and the `ranger.toml` parser
//! - Character display trait and readout helpers

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod capture;
pub mod config;
pub mod ranging;
pub mod traits;

#[cfg(test)]
mod sim;
