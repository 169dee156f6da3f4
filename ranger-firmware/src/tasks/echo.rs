//! Echo edge task
//!
//! Stands in for the capture interrupt. Runs on the high-priority
//! interrupt executor so edges are latched with little delay, even while
//! the ranging task busy-waits on the thread executor.

use defmt::*;
use embassy_rp::gpio::Input;

use ranger_core::ranging::EchoTracker;
use ranger_hal_rp2040::{service_edges, CaptureRegisters, SoftCapture};

/// Emulated capture timer registers
pub static CAPTURE_REGS: CaptureRegisters = CaptureRegisters::new();

/// Shared measurement state, driven by the ranging task and this task
pub static TRACKER: EchoTracker<SoftCapture> = EchoTracker::new(CAPTURE_REGS.timer());

/// Echo edge task
///
/// Latches every selected edge on the echo pin and runs the tracker's
/// capture handler.
#[embassy_executor::task]
pub async fn echo_task(mut echo: Input<'static>) {
    info!("Echo task started");
    service_edges(&CAPTURE_REGS, &mut echo, || TRACKER.on_capture_interrupt()).await;
}
