//! Character display drivers

pub mod hd44780;

pub use hd44780::{DataBus, EightBitBus, FourBitBus, Hd44780};
