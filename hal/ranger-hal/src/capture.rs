//! Input-capture timer abstractions
//!
//! An input-capture timer is a free-running counter that latches its current
//! value into a capture register whenever the monitored input line makes the
//! selected transition, and raises an interrupt when it does.
//!
//! [`CaptureHardware`] is the register-level view of one such unit. It has
//! no notion of callbacks or measurements; `ranger-core` builds the
//! capture-unit driver and the echo state machine on top of it.

/// Counter and capture register value
///
/// The real duration of one tick depends on the configured [`ClockSelect`].
pub type Ticks = u32;

/// Edge that latches the counter into the capture register
///
/// Datasheet semantics: a rising edge is a low→high transition on the
/// capture input. The edge-select register bit is 1 for rising edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Edge {
    /// High→low transition
    Falling,
    /// Low→high transition
    #[default]
    Rising,
}

impl Edge {
    /// Value of the edge-select register bit
    pub const fn bit(self) -> u8 {
        match self {
            Edge::Falling => 0,
            Edge::Rising => 1,
        }
    }
}

/// Counter clock source, as a divisor of the timer's source clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ClockSelect {
    /// No clock, the counter is frozen
    #[default]
    Stopped,
    /// Source clock
    Div1,
    /// Source clock / 8
    Div8,
    /// Source clock / 64
    Div64,
    /// Source clock / 256
    Div256,
    /// Source clock / 1024
    Div1024,
}

impl ClockSelect {
    /// Value of the 3-bit clock-select register field
    pub const fn bits(self) -> u8 {
        match self {
            ClockSelect::Stopped => 0,
            ClockSelect::Div1 => 1,
            ClockSelect::Div8 => 2,
            ClockSelect::Div64 => 3,
            ClockSelect::Div256 => 4,
            ClockSelect::Div1024 => 5,
        }
    }

    /// Decode the clock-select register field
    ///
    /// Returns `None` for encodings 6 and 7, which select external clock
    /// sources this firmware never uses.
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits & 0x07 {
            0 => Some(ClockSelect::Stopped),
            1 => Some(ClockSelect::Div1),
            2 => Some(ClockSelect::Div8),
            3 => Some(ClockSelect::Div64),
            4 => Some(ClockSelect::Div256),
            5 => Some(ClockSelect::Div1024),
            _ => None,
        }
    }

    /// Select the clock for a source clock divisor
    ///
    /// Returns `None` for divisors the prescaler cannot produce.
    pub const fn from_divisor(divisor: u32) -> Option<Self> {
        match divisor {
            1 => Some(ClockSelect::Div1),
            8 => Some(ClockSelect::Div8),
            64 => Some(ClockSelect::Div64),
            256 => Some(ClockSelect::Div256),
            1024 => Some(ClockSelect::Div1024),
            _ => None,
        }
    }

    /// Source clock divisor, or `None` when stopped
    pub const fn divisor(self) -> Option<u32> {
        match self {
            ClockSelect::Stopped => None,
            ClockSelect::Div1 => Some(1),
            ClockSelect::Div8 => Some(8),
            ClockSelect::Div64 => Some(64),
            ClockSelect::Div256 => Some(256),
            ClockSelect::Div1024 => Some(1024),
        }
    }

    /// Counter rate for the given source clock
    ///
    /// Returns `None` when the counter is stopped.
    pub const fn tick_rate_hz(self, source_hz: u32) -> Option<u32> {
        match self.divisor() {
            Some(div) => Some(source_hz / div),
            None => None,
        }
    }
}

/// Register interface of one input-capture timer unit
///
/// Every method maps to a single register access on real hardware and
/// must not block. None of them can fail once the unit exists.
pub trait CaptureHardware {
    /// Select the counter clock (`Stopped` halts the counter)
    fn set_clock(&mut self, clock: ClockSelect);

    /// Select which edge latches the counter
    fn set_edge(&mut self, edge: Edge);

    /// Load the free-running counter
    fn write_counter(&mut self, value: Ticks);

    /// Load the capture register
    fn write_capture(&mut self, value: Ticks);

    /// Read the capture register
    fn read_capture(&self) -> Ticks;

    /// Enable or disable the capture interrupt
    fn set_interrupt_enabled(&mut self, enabled: bool);

    /// Configure the capture input line as a digital input
    fn configure_capture_input(&mut self);
}
