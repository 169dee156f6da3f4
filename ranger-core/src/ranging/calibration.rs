//! Tick to distance conversion
//!
//! The echo pulse covers the round trip, so one centimetre of range costs
//! `ticks_per_second * 2 / speed_of_sound_cm_s` ticks. That factor is
//! computed once with truncating integer division. At 1 MHz and 34000 cm/s
//! the exact value is 58.82 but the factor is 58, so readings run up to
//! about 1.4% long. Distances are truncated to whole centimetres.

use ranger_hal::capture::Ticks;

use super::Distance;
use crate::config::ConfigError;

/// Speed of sound in air at roughly 20 °C, in cm/s
pub const SPEED_OF_SOUND_CM_S: u32 = 34_000;

/// Integer tick-to-centimetre calibration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibration {
    factor: u32,
}

impl Calibration {
    /// Derive the calibration factor from the capture tick rate
    pub const fn new(ticks_per_second: u32, speed_of_sound_cm_s: u32) -> Result<Self, ConfigError> {
        if speed_of_sound_cm_s == 0 {
            return Err(ConfigError::ZeroSpeedOfSound);
        }

        let factor = (ticks_per_second as u64 * 2) / speed_of_sound_cm_s as u64;
        if factor == 0 {
            return Err(ConfigError::TickRateTooLow);
        }

        let factor = if factor > u32::MAX as u64 {
            u32::MAX
        } else {
            factor as u32
        };

        Ok(Self { factor })
    }

    /// Ticks per centimetre of range
    pub const fn factor(&self) -> u32 {
        self.factor
    }

    /// Convert an echo pulse width to whole centimetres
    pub const fn ticks_to_cm(&self, ticks: Ticks) -> u32 {
        ticks / self.factor
    }

    /// Convert an echo pulse width to a [`Distance`]
    pub const fn distance(&self, ticks: Ticks) -> Distance {
        Distance::from_cm(self.ticks_to_cm(ticks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn one_mhz() -> Calibration {
        Calibration::new(1_000_000, SPEED_OF_SOUND_CM_S).unwrap()
    }

    #[test]
    fn test_factor_truncates() {
        assert_eq!(one_mhz().factor(), 58);
    }

    #[test]
    fn test_known_conversions() {
        let cal = one_mhz();
        assert_eq!(cal.ticks_to_cm(0), 0);
        assert_eq!(cal.ticks_to_cm(57), 0);
        assert_eq!(cal.ticks_to_cm(580), 10);
        assert_eq!(cal.ticks_to_cm(1160), 20);
        assert_eq!(cal.distance(1160), Distance::from_cm(20));
    }

    #[test]
    fn test_prescaled_clock() {
        // 16 MHz / 64 = 250 kHz, 500000 / 34000 = 14
        let cal = Calibration::new(250_000, SPEED_OF_SOUND_CM_S).unwrap();
        assert_eq!(cal.factor(), 14);
        assert_eq!(cal.ticks_to_cm(140), 10);
    }

    #[test]
    fn test_invalid_inputs() {
        assert_eq!(
            Calibration::new(1_000_000, 0),
            Err(ConfigError::ZeroSpeedOfSound)
        );
        assert_eq!(
            Calibration::new(10_000, SPEED_OF_SOUND_CM_S),
            Err(ConfigError::TickRateTooLow)
        );
    }

    #[test]
    fn test_large_tick_rate_does_not_overflow() {
        let cal = Calibration::new(u32::MAX, 1).unwrap();
        assert_eq!(cal.factor(), u32::MAX);
        assert_eq!(cal.ticks_to_cm(u32::MAX), 1);
    }

    proptest! {
        #[test]
        fn conversion_is_monotonic(a in any::<u32>(), b in any::<u32>()) {
            let cal = one_mhz();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(cal.ticks_to_cm(lo) <= cal.ticks_to_cm(hi));
        }

        #[test]
        fn conversion_never_overshoots(
            ticks in any::<u32>(),
            rate in 17_000u32..=16_000_000,
        ) {
            let cal = Calibration::new(rate, SPEED_OF_SOUND_CM_S).unwrap();
            let cm = cal.ticks_to_cm(ticks) as u64;
            prop_assert!(cm * cal.factor() as u64 <= ticks as u64);
        }
    }
}
