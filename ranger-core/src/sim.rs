//! Simulated capture board for host tests
//!
//! Time advances only through [`ScriptedDelay`], one microsecond at a time.
//! The source clock runs at 1 MHz, so one cycle is one microsecond.

use core::cell::Cell;

use embedded_hal::delay::DelayNs;
use ranger_hal::capture::{CaptureHardware, ClockSelect, Edge, Ticks};
use ranger_hal::gpio::OutputPin;

use crate::ranging::EchoTracker;

/// Timer registers, trigger line and clock of the simulated board
pub struct SimBoard {
    now_us: Cell<u64>,
    counter: Cell<Ticks>,
    capture: Cell<Ticks>,
    prescale: Cell<u32>,
    edge: Cell<Edge>,
    clock: Cell<ClockSelect>,
    interrupt_enabled: Cell<bool>,
    input_configured: Cell<bool>,
    trigger_high: Cell<bool>,
    trigger_rose_at: Cell<u64>,
    trigger_pulses: Cell<u32>,
    last_trigger_width: Cell<u64>,
}

impl SimBoard {
    pub fn new() -> Self {
        Self {
            now_us: Cell::new(0),
            counter: Cell::new(0),
            capture: Cell::new(0),
            prescale: Cell::new(0),
            edge: Cell::new(Edge::Falling),
            clock: Cell::new(ClockSelect::Stopped),
            interrupt_enabled: Cell::new(false),
            input_configured: Cell::new(false),
            trigger_high: Cell::new(false),
            trigger_rose_at: Cell::new(0),
            trigger_pulses: Cell::new(0),
            last_trigger_width: Cell::new(0),
        }
    }

    pub fn timer(&self) -> SimTimer<'_> {
        SimTimer { board: self }
    }

    pub fn trigger(&self) -> TriggerPin<'_> {
        TriggerPin { board: self }
    }

    /// Put garbage in the counter and capture registers
    pub fn preload(&self, counter: Ticks, capture: Ticks) {
        self.counter.set(counter);
        self.capture.set(capture);
    }

    /// Run the source clock for `cycles` microseconds
    pub fn advance(&self, cycles: u32) {
        self.now_us.set(self.now_us.get() + cycles as u64);

        let Some(div) = self.clock.get().divisor() else {
            return;
        };
        let total = self.prescale.get() + cycles;
        self.counter
            .set(self.counter.get().wrapping_add(total / div));
        self.prescale.set(total % div);
    }

    /// Apply an edge to the capture input
    ///
    /// Latches the counter if the edge matches the edge select, and returns
    /// whether the capture interrupt would fire.
    pub fn drive(&self, edge: Edge) -> bool {
        if edge != self.edge.get() {
            return false;
        }
        self.capture.set(self.counter.get());
        self.interrupt_enabled.get()
    }

    pub fn now_us(&self) -> u64 {
        self.now_us.get()
    }

    pub fn counter(&self) -> Ticks {
        self.counter.get()
    }

    pub fn edge_select(&self) -> Edge {
        self.edge.get()
    }

    pub fn clock_select(&self) -> ClockSelect {
        self.clock.get()
    }

    pub fn interrupt_enabled(&self) -> bool {
        self.interrupt_enabled.get()
    }

    pub fn input_configured(&self) -> bool {
        self.input_configured.get()
    }

    pub fn trigger_high(&self) -> bool {
        self.trigger_high.get()
    }

    pub fn trigger_pulses(&self) -> u32 {
        self.trigger_pulses.get()
    }

    pub fn last_trigger_width_us(&self) -> u64 {
        self.last_trigger_width.get()
    }
}

/// Register view of the simulated capture timer
pub struct SimTimer<'a> {
    board: &'a SimBoard,
}

impl CaptureHardware for SimTimer<'_> {
    fn set_clock(&mut self, clock: ClockSelect) {
        self.board.clock.set(clock);
    }

    fn set_edge(&mut self, edge: Edge) {
        self.board.edge.set(edge);
    }

    fn write_counter(&mut self, value: Ticks) {
        self.board.counter.set(value);
        self.board.prescale.set(0);
    }

    fn write_capture(&mut self, value: Ticks) {
        self.board.capture.set(value);
    }

    fn read_capture(&self) -> Ticks {
        self.board.capture.get()
    }

    fn set_interrupt_enabled(&mut self, enabled: bool) {
        self.board.interrupt_enabled.set(enabled);
    }

    fn configure_capture_input(&mut self) {
        self.board.input_configured.set(true);
    }
}

/// Sensor trigger line of the simulated board
pub struct TriggerPin<'a> {
    board: &'a SimBoard,
}

impl OutputPin for TriggerPin<'_> {
    fn set_high(&mut self) {
        if !self.board.trigger_high.get() {
            self.board.trigger_rose_at.set(self.board.now_us());
        }
        self.board.trigger_high.set(true);
    }

    fn set_low(&mut self) {
        if self.board.trigger_high.get() {
            let width = self.board.now_us() - self.board.trigger_rose_at.get();
            self.board.last_trigger_width.set(width);
            self.board
                .trigger_pulses
                .set(self.board.trigger_pulses.get() + 1);
        }
        self.board.trigger_high.set(false);
    }

    fn is_set_high(&self) -> bool {
        self.board.trigger_high.get()
    }
}

/// Deliver an edge and run the capture interrupt if it fires
pub fn deliver(board: &SimBoard, tracker: &EchoTracker<SimTimer<'_>>, edge: Edge) {
    if board.drive(edge) {
        tracker.on_capture_interrupt();
    }
}

/// Delay that never advances time
pub struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

/// Delay provider that plays a script of echo edges
///
/// Each elapsed microsecond advances the board clock, then applies the
/// edges and hooks scheduled for that instant, in the order they were
/// added.
pub struct ScriptedDelay<'a> {
    board: &'a SimBoard,
    tracker: &'a EchoTracker<SimTimer<'a>>,
    pending_ns: u64,
    edges: Vec<(u64, Edge)>,
    hooks: Vec<(u64, Box<dyn FnMut() + 'a>)>,
}

impl<'a> ScriptedDelay<'a> {
    pub fn new(board: &'a SimBoard, tracker: &'a EchoTracker<SimTimer<'a>>) -> Self {
        Self {
            board,
            tracker,
            pending_ns: 0,
            edges: Vec::new(),
            hooks: Vec::new(),
        }
    }

    /// Apply `edge` to the echo line at `at_us`
    pub fn edge_at(mut self, at_us: u64, edge: Edge) -> Self {
        self.edges.push((at_us, edge));
        self
    }

    /// Run `hook` in thread context at `at_us`
    pub fn hook_at(mut self, at_us: u64, hook: impl FnMut() + 'a) -> Self {
        self.hooks.push((at_us, Box::new(hook)));
        self
    }

    fn tick(&mut self) {
        self.board.advance(1);
        let now = self.board.now_us();

        for &(at, edge) in &self.edges {
            if at == now {
                deliver(self.board, self.tracker, edge);
            }
        }

        for (at, hook) in self.hooks.iter_mut() {
            if *at == now {
                hook();
            }
        }
    }
}

impl DelayNs for ScriptedDelay<'_> {
    fn delay_ns(&mut self, ns: u32) {
        self.pending_ns += ns as u64;
        while self.pending_ns >= 1_000 {
            self.pending_ns -= 1_000;
            self.tick();
        }
    }
}
