//! Caller-side measurement handle

use embedded_hal::delay::DelayNs;
use ranger_hal::capture::{CaptureHardware, ClockSelect};
use ranger_hal::gpio::OutputPin;

use super::{Calibration, Distance, EchoTracker, RangeError};
use crate::config::{ConfigError, SensorConfig};

/// Ultrasonic ranger
///
/// Owns the trigger line and a busy-wait delay. The echo line is handled by
/// the capture unit inside the shared [`EchoTracker`], whose interrupt
/// entry point must be wired to the capture ISR.
pub struct Ranger<'a, H, P, D> {
    tracker: &'a EchoTracker<H>,
    trigger: P,
    delay: D,
    clock: ClockSelect,
    calibration: Calibration,
    trigger_width_us: u32,
    poll_interval_us: u32,
    timeout_us: u32,
}

impl<'a, H, P, D> Ranger<'a, H, P, D>
where
    H: CaptureHardware,
    P: OutputPin,
    D: DelayNs,
{
    /// Create a ranger from a validated sensor configuration
    pub fn new(
        tracker: &'a EchoTracker<H>,
        trigger: P,
        delay: D,
        config: &SensorConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            tracker,
            trigger,
            delay,
            clock: config.clock,
            calibration: config.calibration()?,
            trigger_width_us: config.trigger_width_us,
            poll_interval_us: config.poll_interval_us,
            timeout_us: config.timeout_us()?,
        })
    }

    /// Drive the trigger low and configure the capture unit
    ///
    /// Must run once before the first reading. Running it again abandons
    /// any measurement in flight.
    pub fn initialize(&mut self) {
        self.trigger.set_low();
        self.tracker.initialize(self.clock);
    }

    /// Take one distance reading
    ///
    /// Blocks for at most the trigger width plus the echo timeout.
    /// Returns [`RangeError::Busy`] immediately, without emitting a
    /// trigger, if the tracker already has a measurement in flight.
    pub fn read_distance(&mut self) -> Result<Distance, RangeError> {
        if let Err(e) = self.tracker.begin() {
            #[cfg(feature = "defmt")]
            defmt::debug!("ranger: rejected, measurement in flight");
            return Err(e);
        }

        self.pulse_trigger();
        self.tracker.arm();

        let pulse = self.wait_for_echo()?;
        Ok(self.calibration.distance(pulse))
    }

    /// Emit the trigger pulse
    fn pulse_trigger(&mut self) {
        self.trigger.set_high();
        self.delay.delay_us(self.trigger_width_us);
        self.trigger.set_low();
    }

    /// Poll the tracker until the echo is measured or the window closes
    fn wait_for_echo(&mut self) -> Result<u32, RangeError> {
        let mut waited_us: u32 = 0;

        loop {
            if let Some(pulse) = self.tracker.take_measurement() {
                return Ok(pulse);
            }

            if waited_us >= self.timeout_us {
                let result = self.tracker.finish_or_abort();
                #[cfg(feature = "defmt")]
                if result.is_err() {
                    defmt::debug!("ranger: no echo after {} us", waited_us);
                }
                return result;
            }

            let step = self.poll_interval_us.min(self.timeout_us - waited_us);
            self.delay.delay_us(step);
            waited_us += step;
        }
    }

    /// Tick-to-centimetre calibration in use
    pub fn calibration(&self) -> Calibration {
        self.calibration
    }

    /// Echo wait window in microseconds
    pub fn timeout_us(&self) -> u32 {
        self.timeout_us
    }

    /// Shut the capture unit down and hand back the trigger pin and delay
    pub fn release(self) -> (P, D) {
        self.tracker.unit().deinit();
        (self.trigger, self.delay)
    }
}
