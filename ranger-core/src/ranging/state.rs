//! Measurement state machine
//!
//! One measurement walks `Idle → Triggered → AwaitingRisingEdge →
//! AwaitingFallingEdge → Measured → Idle`. A timeout from any in-flight
//! phase goes straight back to `Idle`.

use ranger_hal::capture::{Edge, Ticks};

/// Measurement phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// No measurement in flight
    #[default]
    Idle,
    /// Trigger pulse being emitted
    Triggered,
    /// Capture armed for the start of the echo pulse
    AwaitingRisingEdge,
    /// Echo pulse in progress, counter running from zero
    AwaitingFallingEdge,
    /// Echo pulse width latched, waiting for the caller to collect it
    Measured {
        /// Pulse width in capture ticks
        pulse: Ticks,
    },
}

/// Events that drive the measurement state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EchoEvent {
    /// Caller asked for a distance reading
    ReadRequested,
    /// Capture unit primed for the rising edge
    Armed,
    /// Echo line went high
    RisingEdge,
    /// Echo line went low after the given number of ticks
    FallingEdge(Ticks),
    /// Caller collected the pulse width
    ResultTaken,
    /// The echo wait window elapsed
    TimedOut,
}

/// Capture handler tags, one per edge-waiting phase
///
/// These are the only values that ever sit in the capture unit's handler
/// slot during a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EdgeHandler {
    /// Start of the echo pulse
    RisingEdge,
    /// End of the echo pulse
    FallingEdge,
}

impl EdgeHandler {
    /// Capture edge this handler must be paired with
    pub const fn edge(self) -> Edge {
        match self {
            EdgeHandler::RisingEdge => Edge::Rising,
            EdgeHandler::FallingEdge => Edge::Falling,
        }
    }
}

impl Phase {
    /// Check if a measurement is in flight
    pub fn is_busy(&self) -> bool {
        !matches!(self, Phase::Idle)
    }

    /// Latched pulse width, if the measurement has completed
    pub fn pulse(&self) -> Option<Ticks> {
        match self {
            Phase::Measured { pulse } => Some(*pulse),
            _ => None,
        }
    }

    /// Handler that belongs in the capture slot during this phase
    ///
    /// `None` means the slot must be empty.
    pub fn handler(&self) -> Option<EdgeHandler> {
        match self {
            Phase::AwaitingRisingEdge => Some(EdgeHandler::RisingEdge),
            Phase::AwaitingFallingEdge => Some(EdgeHandler::FallingEdge),
            _ => None,
        }
    }

    /// Process an event and return the next phase
    pub fn transition(self, event: EchoEvent) -> Self {
        use EchoEvent::*;
        use Phase::*;

        match (self, event) {
            (Idle, ReadRequested) => Triggered,
            (Triggered, Armed) => AwaitingRisingEdge,
            (AwaitingRisingEdge, RisingEdge) => AwaitingFallingEdge,
            (AwaitingFallingEdge, FallingEdge(pulse)) => Measured { pulse },
            (Measured { .. }, ResultTaken) => Idle,

            (Triggered | AwaitingRisingEdge | AwaitingFallingEdge, TimedOut) => Idle,

            // Everything else is ignored
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_measurement_cycle() {
        let phase = Phase::Idle
            .transition(EchoEvent::ReadRequested)
            .transition(EchoEvent::Armed)
            .transition(EchoEvent::RisingEdge)
            .transition(EchoEvent::FallingEdge(1160));

        assert_eq!(phase, Phase::Measured { pulse: 1160 });
        assert_eq!(phase.pulse(), Some(1160));
        assert_eq!(phase.transition(EchoEvent::ResultTaken), Phase::Idle);
    }

    #[test]
    fn test_second_request_is_ignored_while_busy() {
        let phase = Phase::AwaitingFallingEdge;
        assert!(phase.is_busy());
        assert_eq!(phase.transition(EchoEvent::ReadRequested), phase);
    }

    #[test]
    fn test_edges_out_of_order_are_ignored() {
        assert_eq!(
            Phase::AwaitingRisingEdge.transition(EchoEvent::FallingEdge(10)),
            Phase::AwaitingRisingEdge
        );
        assert_eq!(
            Phase::Triggered.transition(EchoEvent::RisingEdge),
            Phase::Triggered
        );
        assert_eq!(Phase::Idle.transition(EchoEvent::RisingEdge), Phase::Idle);
    }

    #[test]
    fn test_timeout_returns_to_idle() {
        for phase in [
            Phase::Triggered,
            Phase::AwaitingRisingEdge,
            Phase::AwaitingFallingEdge,
        ] {
            assert_eq!(phase.transition(EchoEvent::TimedOut), Phase::Idle);
        }

        // A completed result survives a late timeout
        let done = Phase::Measured { pulse: 42 };
        assert_eq!(done.transition(EchoEvent::TimedOut), done);
    }

    #[test]
    fn test_handler_matches_phase() {
        assert_eq!(Phase::Idle.handler(), None);
        assert_eq!(Phase::Triggered.handler(), None);
        assert_eq!(
            Phase::AwaitingRisingEdge.handler().map(EdgeHandler::edge),
            Some(Edge::Rising)
        );
        assert_eq!(
            Phase::AwaitingFallingEdge.handler().map(EdgeHandler::edge),
            Some(Edge::Falling)
        );
        assert_eq!(Phase::Measured { pulse: 0 }.handler(), None);
    }
}
