//! Hardware abstraction traits
//!
//! These traits define the interface between the application logic
//! and hardware-specific implementations that live outside `ranger-hal`.

pub mod display;

pub use display::{CharacterDisplay, DisplayError, ReadoutExt};
