//! Interrupt-side half of the measurement engine
//!
//! [`EchoTracker`] owns the capture unit and the measurement phase. The
//! caller side ([`Ranger`](super::Ranger)) moves it out of `Idle` and
//! collects the result; the capture interrupt moves it through the two
//! edge phases. Phase and handler slot always change inside the same
//! critical section, so the handler that runs on a capture is the one that
//! belongs to the current phase.

use core::cell::Cell;

use critical_section::Mutex;
use ranger_hal::capture::{CaptureHardware, ClockSelect, Edge, Ticks};

use super::state::{EchoEvent, EdgeHandler, Phase};
use super::RangeError;
use crate::capture::{CaptureConfig, CaptureUnit};

/// Capture unit plus measurement phase, shared with the capture interrupt
pub struct EchoTracker<H> {
    unit: CaptureUnit<H, EdgeHandler>,
    phase: Mutex<Cell<Phase>>,
}

impl<H: CaptureHardware> EchoTracker<H> {
    /// Create a tracker around a capture timer
    pub const fn new(hw: H) -> Self {
        Self {
            unit: CaptureUnit::new(hw),
            phase: Mutex::new(Cell::new(Phase::Idle)),
        }
    }

    /// The underlying capture unit
    pub fn unit(&self) -> &CaptureUnit<H, EdgeHandler> {
        &self.unit
    }

    /// Current measurement phase
    pub fn phase(&self) -> Phase {
        critical_section::with(|cs| self.phase.borrow(cs).get())
    }

    /// Configure the capture unit for rising edges at `clock` and go idle
    ///
    /// Abandons any measurement in flight.
    pub fn initialize(&self, clock: ClockSelect) {
        critical_section::with(|cs| {
            self.unit.configure(CaptureConfig::new(Edge::Rising, clock));
            self.enter(self.phase.borrow(cs), Phase::Idle);
        });
    }

    /// Claim the tracker for a new measurement
    ///
    /// Fails with [`RangeError::Busy`] without touching anything if a
    /// measurement is already in flight.
    pub fn begin(&self) -> Result<(), RangeError> {
        critical_section::with(|cs| {
            let phase = self.phase.borrow(cs);
            if phase.get().is_busy() {
                return Err(RangeError::Busy);
            }
            self.enter(phase, phase.get().transition(EchoEvent::ReadRequested));
            Ok(())
        })
    }

    /// Prime the capture unit for the rising edge of the echo
    ///
    /// Only valid right after [`begin`](Self::begin); ignored otherwise.
    pub fn arm(&self) {
        critical_section::with(|cs| {
            let phase = self.phase.borrow(cs);
            if phase.get() != Phase::Triggered {
                return;
            }
            self.unit.reset_counter();
            self.enter(phase, phase.get().transition(EchoEvent::Armed));
        });
    }

    /// Capture interrupt entry point
    ///
    /// Call from the capture ISR. Dispatches to the handler currently in the
    /// slot, if any.
    pub fn on_capture_interrupt(&self) {
        self.unit.on_capture(|handler| match handler {
            EdgeHandler::RisingEdge => self.on_rising_edge(),
            EdgeHandler::FallingEdge => self.on_falling_edge(),
        });
    }

    fn on_rising_edge(&self) {
        critical_section::with(|cs| {
            let phase = self.phase.borrow(cs);
            if phase.get() != Phase::AwaitingRisingEdge {
                return;
            }
            self.unit.reset_counter();
            self.enter(phase, phase.get().transition(EchoEvent::RisingEdge));
        });
    }

    fn on_falling_edge(&self) {
        critical_section::with(|cs| {
            let phase = self.phase.borrow(cs);
            if phase.get() != Phase::AwaitingFallingEdge {
                return;
            }
            let pulse = self.unit.captured();
            self.enter(phase, phase.get().transition(EchoEvent::FallingEdge(pulse)));
        });
    }

    /// Collect a completed measurement
    ///
    /// Returns the pulse width and goes back to `Idle` if the falling edge
    /// has been seen, `None` otherwise.
    pub fn take_measurement(&self) -> Option<Ticks> {
        critical_section::with(|cs| {
            let phase = self.phase.borrow(cs);
            let pulse = phase.get().pulse()?;
            self.enter(phase, phase.get().transition(EchoEvent::ResultTaken));
            Some(pulse)
        })
    }

    /// End the wait for an echo
    ///
    /// Collects the result if the falling edge made it in after all,
    /// otherwise clears the handler slot, leaves the unit primed for rising
    /// edges with the interrupt enabled, and reports [`RangeError::NoEcho`].
    /// Either way the tracker is `Idle` afterwards.
    pub fn finish_or_abort(&self) -> Result<Ticks, RangeError> {
        critical_section::with(|cs| {
            let phase = self.phase.borrow(cs);
            match phase.get() {
                Phase::Measured { pulse } => {
                    self.enter(phase, phase.get().transition(EchoEvent::ResultTaken));
                    Ok(pulse)
                }
                Phase::Idle => Err(RangeError::NoEcho),
                in_flight => {
                    self.unit.reset_counter();
                    self.enter(phase, in_flight.transition(EchoEvent::TimedOut));
                    Err(RangeError::NoEcho)
                }
            }
        })
    }

    /// Move to `next`, loading the handler and edge that phase requires
    ///
    /// Phases without a handler leave the unit primed for rising edges with
    /// an empty slot. Must run inside the caller's critical section.
    fn enter(&self, cell: &Cell<Phase>, next: Phase) {
        let handler = next.handler();
        self.unit
            .retarget(handler.map_or(Edge::Rising, EdgeHandler::edge), handler);
        cell.set(next);
    }
}
