//! Embassy async tasks
//!
//! Each task runs independently and communicates via signals.

pub mod display;
pub mod echo;
pub mod ranging;

pub use display::{display_task, Lcd};
pub use echo::{echo_task, CAPTURE_REGS, TRACKER};
pub use ranging::{ranging_task, BoardRanger};
