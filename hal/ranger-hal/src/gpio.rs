//! GPIO pin abstractions
//!
//! The measurement engine drives the sensor trigger line through
//! [`OutputPin`]. Writes are synchronous and cannot fail: the level must be
//! on the wire before the call returns, because the trigger pulse width is
//! timed with a busy-wait right after it.

/// Digital output pin
///
/// Implementations should handle the actual hardware register manipulation
/// for the specific chip.
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Toggle the pin state
    fn toggle(&mut self) {
        if self.is_set_high() {
            self.set_low();
        } else {
            self.set_high();
        }
    }

    /// Set the pin to a specific state
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Check if the pin is currently set high
    fn is_set_high(&self) -> bool;

    /// Check if the pin is currently set low
    fn is_set_low(&self) -> bool {
        !self.is_set_high()
    }
}

impl<T: OutputPin + ?Sized> OutputPin for &mut T {
    fn set_high(&mut self) {
        T::set_high(self)
    }

    fn set_low(&mut self) {
        T::set_low(self)
    }

    fn is_set_high(&self) -> bool {
        T::is_set_high(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockPin {
        high: bool,
        writes: u8,
    }

    impl OutputPin for MockPin {
        fn set_high(&mut self) {
            self.high = true;
            self.writes += 1;
        }

        fn set_low(&mut self) {
            self.high = false;
            self.writes += 1;
        }

        fn is_set_high(&self) -> bool {
            self.high
        }
    }

    #[test]
    fn test_toggle_flips_level() {
        let mut pin = MockPin {
            high: false,
            writes: 0,
        };

        pin.toggle();
        assert!(pin.is_set_high());

        pin.toggle();
        assert!(pin.is_set_low());
        assert_eq!(pin.writes, 2);
    }

    #[test]
    fn test_set_state_through_reference() {
        let mut pin = MockPin {
            high: false,
            writes: 0,
        };

        fn drive<P: OutputPin>(mut pin: P, high: bool) -> bool {
            pin.set_state(high);
            pin.is_set_high()
        }

        assert!(drive(&mut pin, true));
        assert!(!drive(&mut pin, false));
        assert!(pin.is_set_low());
        assert_eq!(pin.writes, 2);
    }
}
