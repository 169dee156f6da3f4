//! Configuration type definitions
//!
//! These types represent the ranger configuration. At boot the firmware
//! parses them from the embedded `ranger.toml`; every field has a default
//! so a partial file is enough.

use ranger_hal::capture::ClockSelect;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ranging::{Calibration, SPEED_OF_SOUND_CM_S};

/// Settle margin added to the round-trip time of the rated range, in µs
pub const ECHO_SETTLE_US: u32 = 2_000;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The capture clock is stopped, so no time would ever elapse
    ClockStopped,
    /// Speed of sound is zero
    ZeroSpeedOfSound,
    /// Tick rate too low to resolve a single centimetre
    TickRateTooLow,
    /// Poll interval is zero
    ZeroPollInterval,
    /// Trigger pulse width is zero, so the sensor never fires
    ZeroTriggerWidth,
    /// Explicit echo timeout is zero, so every reading misses its echo
    ZeroEchoTimeout,
}

/// Sensor and capture timer configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SensorConfig {
    /// Capture timer source clock (Hz)
    pub source_clock_hz: u32,
    /// Capture timer prescaler
    pub clock: ClockSelect,
    /// Speed of sound (cm/s)
    pub speed_of_sound_cm_s: u32,
    /// Rated maximum range (cm)
    pub max_range_cm: u32,
    /// Trigger pulse width (µs)
    pub trigger_width_us: u32,
    /// How often the blocking read checks for completion (µs)
    pub poll_interval_us: u32,
    /// Echo wait window (µs), derived from the rated range when unset
    pub echo_timeout_us: Option<u32>,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            source_clock_hz: 1_000_000,
            clock: ClockSelect::Div1,
            speed_of_sound_cm_s: SPEED_OF_SOUND_CM_S,
            max_range_cm: 400,
            trigger_width_us: 10,
            poll_interval_us: 10,
            echo_timeout_us: None,
        }
    }
}

impl SensorConfig {
    /// Capture counter rate (Hz)
    pub fn tick_rate_hz(&self) -> Result<u32, ConfigError> {
        match self.clock.tick_rate_hz(self.source_clock_hz) {
            None => Err(ConfigError::ClockStopped),
            Some(0) => Err(ConfigError::TickRateTooLow),
            Some(rate) => Ok(rate),
        }
    }

    /// Tick-to-centimetre calibration for this clock
    pub fn calibration(&self) -> Result<Calibration, ConfigError> {
        Calibration::new(self.tick_rate_hz()?, self.speed_of_sound_cm_s)
    }

    /// Echo wait window (µs)
    ///
    /// The explicit `echo_timeout_us` if set, otherwise the round trip at
    /// the rated range plus [`ECHO_SETTLE_US`].
    pub fn timeout_us(&self) -> Result<u32, ConfigError> {
        if let Some(timeout) = self.echo_timeout_us {
            return Ok(timeout);
        }
        if self.speed_of_sound_cm_s == 0 {
            return Err(ConfigError::ZeroSpeedOfSound);
        }

        let round_trip =
            self.max_range_cm as u64 * 2 * 1_000_000 / self.speed_of_sound_cm_s as u64;
        let timeout = round_trip + ECHO_SETTLE_US as u64;
        Ok(timeout.min(u32::MAX as u64) as u32)
    }

    /// Check every derived value
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.calibration()?;
        if self.timeout_us()? == 0 {
            return Err(ConfigError::ZeroEchoTimeout);
        }
        if self.poll_interval_us == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        if self.trigger_width_us == 0 {
            return Err(ConfigError::ZeroTriggerWidth);
        }
        Ok(())
    }
}

/// Character display layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisplayConfig {
    /// Visible rows
    pub rows: u8,
    /// Visible columns
    pub columns: u8,
    /// Row holding the readout
    pub row: u8,
    /// First column of the distance value
    pub value_col: u8,
    /// Characters reserved for the distance value
    pub value_width: u8,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            rows: 2,
            columns: 16,
            row: 0,
            value_col: 10,
            value_width: 3,
        }
    }
}

/// Complete ranger configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RangerConfig {
    /// Sensor and capture timer
    pub sensor: SensorConfig,
    /// Display layout
    pub display: DisplayConfig,
    /// Time between readings (ms)
    pub interval_ms: u32,
}

impl Default for RangerConfig {
    fn default() -> Self {
        Self {
            sensor: SensorConfig::default(),
            display: DisplayConfig::default(),
            interval_ms: 100,
        }
    }
}
