//! Distance measurement engine
//!
//! Drives an ultrasonic time-of-flight sensor: emit a trigger pulse, time
//! the echo pulse with the capture unit, convert the width to centimetres.
//!
//! The engine is split in two. [`EchoTracker`] is shared with the capture
//! interrupt and usually lives in a `static`. [`Ranger`] is the caller-side
//! handle that owns the trigger pin and the delay provider and blocks in
//! [`Ranger::read_distance`] until the echo is measured or the wait window
//! runs out.

pub mod calibration;
pub mod ranger;
pub mod state;
pub mod tracker;

pub use calibration::{Calibration, SPEED_OF_SOUND_CM_S};
pub use ranger::Ranger;
pub use state::{EchoEvent, EdgeHandler, Phase};
pub use tracker::EchoTracker;

/// Measured distance, truncated to whole centimetres
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Distance {
    cm: u32,
}

impl Distance {
    /// Create a distance from centimetres
    pub const fn from_cm(cm: u32) -> Self {
        Self { cm }
    }

    /// Distance in centimetres
    pub const fn cm(&self) -> u32 {
        self.cm
    }
}

/// Reasons a distance reading did not produce a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RangeError {
    /// A measurement is already in flight on this capture unit
    Busy,
    /// No complete echo pulse arrived within the wait window
    NoEcho,
}
