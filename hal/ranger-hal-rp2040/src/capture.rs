//! Software input capture on the RP2040
//!
//! The RP2040 has no timer input-capture channel, and `embassy-rp` owns the
//! GPIO bank interrupt. The capture timer is therefore emulated: the
//! registers live in a [`CaptureRegisters`] block and the free-running
//! counter is derived from the `embassy-time` timebase. An edge task running
//! on a high-priority interrupt executor waits for edges on the echo pin and
//! latches the counter through [`service_edges`], which is this board's
//! capture interrupt.
//!
//! The latch happens after the executor wakes, so every capture is late by
//! the wake-up latency. Both edges of a pulse see roughly the same delay,
//! which mostly cancels out in the pulse width. The edge direction is read
//! from the pin level after the wake-up, so a pulse must stay high for
//! longer than that latency (a few tens of microseconds at worst) to be
//! timed; shorter ones end as a missed echo. The sensor's shortest echo,
//! at its 2 cm minimum range, is about 116 µs.

use core::sync::atomic::Ordering;

use embassy_rp::gpio::Input;
use embassy_time::Instant;
use portable_atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicU8};
use ranger_hal::capture::{CaptureHardware, ClockSelect, Edge, Ticks};

/// Source clock of the emulated timer: the `embassy-time` tick rate
pub const SOURCE_CLOCK_HZ: u32 = embassy_time::TICK_HZ as u32;

fn now() -> u64 {
    Instant::now().as_ticks()
}

/// Emulated capture timer registers
///
/// Meant to live in a `static`; [`SoftCapture`] is the register view the
/// capture unit drives, [`service_edges`] the interrupt side.
pub struct CaptureRegisters {
    /// Timebase value at which the counter read zero
    base: AtomicU64,
    /// Counter value while the clock is stopped
    frozen: AtomicU32,
    capture: AtomicU32,
    clock: AtomicU8,
    edge: AtomicU8,
    interrupt_enabled: AtomicBool,
    input_ready: AtomicBool,
}

impl CaptureRegisters {
    /// Registers in their reset state: clock stopped, interrupt disabled
    pub const fn new() -> Self {
        Self {
            base: AtomicU64::new(0),
            frozen: AtomicU32::new(0),
            capture: AtomicU32::new(0),
            clock: AtomicU8::new(0),
            edge: AtomicU8::new(0),
            interrupt_enabled: AtomicBool::new(false),
            input_ready: AtomicBool::new(false),
        }
    }

    /// Register view for a capture unit
    pub const fn timer(&'static self) -> SoftCapture {
        SoftCapture { regs: self }
    }

    fn divisor(&self) -> Option<u32> {
        ClockSelect::from_bits(self.clock.load(Ordering::Relaxed)).and_then(ClockSelect::divisor)
    }

    fn counter_at(&self, now: u64) -> Ticks {
        match self.divisor() {
            Some(div) => (now.wrapping_sub(self.base.load(Ordering::Relaxed)) / div as u64) as Ticks,
            None => self.frozen.load(Ordering::Relaxed),
        }
    }

    /// Make the counter read `value` at `now`
    fn rebase(&self, now: u64, value: Ticks) {
        match self.divisor() {
            Some(div) => self
                .base
                .store(now.wrapping_sub(value as u64 * div as u64), Ordering::Relaxed),
            None => self.frozen.store(value, Ordering::Relaxed),
        }
    }

    /// Current counter value
    pub fn counter(&self) -> Ticks {
        critical_section::with(|_| self.counter_at(now()))
    }

    /// Record an edge that left the input at `level_high`
    ///
    /// Latches the counter if the transition matches the selected edge.
    /// Returns whether the capture interrupt would fire, i.e. whether the
    /// caller should run the capture unit's dispatch.
    pub fn latch(&self, level_high: bool) -> bool {
        critical_section::with(|_| {
            let now = now();
            let edge = if level_high { Edge::Rising } else { Edge::Falling };
            if edge.bit() != self.edge.load(Ordering::Relaxed) {
                return false;
            }
            self.capture.store(self.counter_at(now), Ordering::Relaxed);
            self.interrupt_enabled.load(Ordering::Relaxed) && self.input_ready.load(Ordering::Relaxed)
        })
    }
}

impl Default for CaptureRegisters {
    fn default() -> Self {
        Self::new()
    }
}

/// Register view of the emulated capture timer
pub struct SoftCapture {
    regs: &'static CaptureRegisters,
}

impl CaptureHardware for SoftCapture {
    fn set_clock(&mut self, clock: ClockSelect) {
        critical_section::with(|_| {
            let now = now();
            let current = self.regs.counter_at(now);
            self.regs.clock.store(clock.bits(), Ordering::Relaxed);
            self.regs.rebase(now, current);
        });
    }

    fn set_edge(&mut self, edge: Edge) {
        self.regs.edge.store(edge.bit(), Ordering::Relaxed);
    }

    fn write_counter(&mut self, value: Ticks) {
        critical_section::with(|_| self.regs.rebase(now(), value));
    }

    fn write_capture(&mut self, value: Ticks) {
        self.regs.capture.store(value, Ordering::Relaxed);
    }

    fn read_capture(&self) -> Ticks {
        self.regs.capture.load(Ordering::Relaxed)
    }

    fn set_interrupt_enabled(&mut self, enabled: bool) {
        self.regs.interrupt_enabled.store(enabled, Ordering::Relaxed);
    }

    fn configure_capture_input(&mut self) {
        // The pin itself is already an `Input` owned by the edge task
        self.regs.input_ready.store(true, Ordering::Relaxed);
    }
}

/// Edge task body: latch every matching edge on `input` and dispatch
///
/// Never returns. Run it on a high-priority `InterruptExecutor` so the
/// latch happens close to the edge; `on_capture` then plays the part of
/// the capture ISR.
pub async fn service_edges(
    regs: &CaptureRegisters,
    input: &mut Input<'_>,
    mut on_capture: impl FnMut(),
) -> ! {
    loop {
        input.wait_for_any_edge().await;
        let level_high = input.is_high();
        if regs.latch(level_high) {
            on_capture();
        } else {
            #[cfg(feature = "defmt")]
            defmt::trace!("capture: edge ignored, input high = {}", level_high);
        }
    }
}
