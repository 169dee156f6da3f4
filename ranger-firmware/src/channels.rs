//! Inter-task communication channels
//!
//! Defines the static signals used for communication between Embassy tasks.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use ranger_core::ranging::{Distance, RangeError};

/// Latest reading (updated by the ranging task, consumed by the display task)
///
/// Only the newest value matters, so a reading the display has not yet
/// drawn is simply replaced.
pub static READING: Signal<CriticalSectionRawMutex, Result<Distance, RangeError>> =
    Signal::new();
