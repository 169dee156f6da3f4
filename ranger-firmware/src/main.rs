//! Ranger - Ultrasonic Distance Meter Firmware
//!
//! Main firmware binary for an HC-SR04 style ranger on an RP2040 board.
//! Reads the distance periodically and shows it on an HD44780 LCD.
//!
//! Pin assignments:
//! - GPIO2: sensor trigger
//! - GPIO3: sensor echo
//! - GPIO16: LCD RS, GPIO17: LCD E
//! - GPIO18-21: LCD D4-D7 (R/W tied low)

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_time::Delay;
use {defmt_rtt as _, panic_probe as _};

use ranger_core::ranging::Ranger;
use ranger_drivers::display::{FourBitBus, Hd44780};
use ranger_hal_rp2040::GpioOutput;

mod channels;
mod config;
mod tasks;

/// Executor for the echo edge task, above the thread-mode executor
static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_HIGH.on_interrupt()
}

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Ranger firmware starting...");

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = config::load();
    info!("Configuration loaded");

    // Echo input, serviced at high priority
    let echo = Input::new(p.PIN_3, Pull::Down);
    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let high_spawner = EXECUTOR_HIGH.start(interrupt::SWI_IRQ_1);
    high_spawner.spawn(tasks::echo_task(echo)).unwrap();

    // Trigger output
    let trigger = GpioOutput::new(p.PIN_2);
    let ranger = match Ranger::new(&tasks::TRACKER, trigger, Delay, &config.sensor) {
        Ok(ranger) => ranger,
        Err(e) => {
            error!("Invalid sensor configuration: {:?}", e);
            loop {
                embassy_time::Timer::after_secs(60).await;
            }
        }
    };

    // LCD on a 4-bit bus
    let bus = FourBitBus::new(
        Output::new(p.PIN_17, Level::Low),
        [
            Output::new(p.PIN_18, Level::Low),
            Output::new(p.PIN_19, Level::Low),
            Output::new(p.PIN_20, Level::Low),
            Output::new(p.PIN_21, Level::Low),
        ],
    );
    let rs = Output::new(p.PIN_16, Level::Low);
    let lcd = Hd44780::new(
        bus,
        rs,
        Delay,
        config.display.rows,
        config.display.columns,
    );

    // Spawn tasks
    spawner
        .spawn(tasks::ranging_task(ranger, config.interval_ms))
        .unwrap();
    spawner
        .spawn(tasks::display_task(lcd, config.display))
        .unwrap();

    info!("All tasks spawned, firmware running");

    // Main task has nothing else to do - all work happens in spawned tasks
    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
