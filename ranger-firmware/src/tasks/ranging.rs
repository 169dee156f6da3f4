//! Ranging task
//!
//! Takes a reading every `interval_ms` and publishes it for the display.

use defmt::*;
use embassy_time::{Delay, Duration, Ticker};

use ranger_core::ranging::{RangeError, Ranger};
use ranger_hal_rp2040::{GpioOutput, SoftCapture};

use crate::channels::READING;

/// Ranger as wired on this board
pub type BoardRanger = Ranger<'static, SoftCapture, GpioOutput<'static>, Delay>;

/// Ranging task
///
/// `read_distance` busy-waits for up to the echo timeout. The edge task
/// lives on a higher-priority executor, so the blocking wait does not
/// starve it.
#[embassy_executor::task]
pub async fn ranging_task(mut ranger: BoardRanger, interval_ms: u32) {
    info!(
        "Ranging task started: every {} ms, timeout {} us, {} ticks/cm",
        interval_ms,
        ranger.timeout_us(),
        ranger.calibration().factor()
    );

    ranger.initialize();

    let mut ticker = Ticker::every(Duration::from_millis(interval_ms as u64));

    loop {
        let reading = ranger.read_distance();

        match reading {
            Ok(distance) => debug!("Distance: {} cm", distance.cm()),
            Err(RangeError::NoEcho) => debug!("No echo"),
            Err(RangeError::Busy) => warn!("Ranger busy"),
        }

        READING.signal(reading);
        ticker.next().await;
    }
}
