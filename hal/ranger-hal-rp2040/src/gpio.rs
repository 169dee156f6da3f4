//! GPIO output wrapper
//!
//! Adapts an `embassy-rp` [`Output`] to the infallible
//! [`ranger_hal::OutputPin`] used for the sensor trigger line.

use embassy_rp::gpio::{Level, Output};
use embassy_rp::Peri;

/// Push-pull GPIO output
pub struct GpioOutput<'d> {
    pin: Output<'d>,
}

impl<'d> GpioOutput<'d> {
    /// Take a pin as an output, initially low
    pub fn new(pin: Peri<'d, impl embassy_rp::gpio::Pin>) -> Self {
        Self {
            pin: Output::new(pin, Level::Low),
        }
    }

    /// Wrap an already configured output
    pub fn from_output(pin: Output<'d>) -> Self {
        Self { pin }
    }
}

impl ranger_hal::OutputPin for GpioOutput<'_> {
    fn set_high(&mut self) {
        self.pin.set_high();
    }

    fn set_low(&mut self) {
        self.pin.set_low();
    }

    fn toggle(&mut self) {
        self.pin.toggle();
    }

    fn is_set_high(&self) -> bool {
        self.pin.is_set_high()
    }
}
