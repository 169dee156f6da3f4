//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in ranger-core for various hardware components:
//!
//! - Character displays (HD44780 on a 4-bit or 8-bit bus)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod display;
