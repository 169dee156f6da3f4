//! Display task
//!
//! Draws the label once, then redraws the value field for every reading.

use defmt::*;
use embassy_rp::gpio::Output;
use embassy_time::{Delay, Timer};

use ranger_core::config::DisplayConfig;
use ranger_core::traits::ReadoutExt;
use ranger_drivers::display::{FourBitBus, Hd44780};

use crate::channels::READING;

/// Retry interval while the LCD refuses to initialize
const INIT_RETRY_MS: u64 = 1000;

/// HD44780 on a 4-bit bus, as wired on this board
pub type Lcd = Hd44780<FourBitBus<Output<'static>, Output<'static>>, Output<'static>, Delay>;

/// Display task
#[embassy_executor::task]
pub async fn display_task(mut lcd: Lcd, layout: DisplayConfig) {
    info!("Display task started");

    while let Err(e) = lcd.init().and_then(|_| lcd.draw_label(&layout)) {
        warn!("LCD init failed: {:?}", e);
        Timer::after_millis(INIT_RETRY_MS).await;
    }

    loop {
        let reading = READING.wait().await;
        if let Err(e) = lcd.draw_reading(&layout, reading) {
            warn!("LCD update failed: {:?}", e);
        }
    }
}
