//! Configuration types
//!
//! Board-agnostic configuration structures plus the parser for the
//! `ranger.toml` subset the firmware embeds.

pub mod toml;
pub mod types;

pub use toml::{parse_config, ParseError};
pub use types::*;
