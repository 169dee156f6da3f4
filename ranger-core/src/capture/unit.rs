//! Input-capture timer driver
//!
//! [`CaptureUnit`] owns the register interface of one timer and a single
//! handler slot. Every method takes `&self` and does its register work
//! inside a critical section, so one `'static` instance can be used from
//! thread context and from the capture interrupt at the same time.
//!
//! The handler slot holds a `Copy` tag rather than a closure. The interrupt
//! entry point [`CaptureUnit::on_capture`] reads the tag under the lock,
//! releases the lock, and only then hands the tag to the caller-supplied
//! dispatcher. A handler is therefore free to re-register itself or swap in
//! a different handler while it runs.

use core::cell::RefCell;

use critical_section::Mutex;
use ranger_hal::capture::{CaptureHardware, ClockSelect, Edge, Ticks};

/// Capture timer configuration
///
/// Applied as a whole by [`CaptureUnit::configure`]. Changing only the edge
/// afterwards goes through [`CaptureUnit::set_edge`], which keeps the
/// counter running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CaptureConfig {
    /// Edge that latches the counter
    pub edge: Edge,
    /// Counter clock
    pub clock: ClockSelect,
}

impl CaptureConfig {
    /// Create a new configuration
    pub const fn new(edge: Edge, clock: ClockSelect) -> Self {
        Self { edge, clock }
    }
}

/// Mirror of the unit's configuration plus the handler slot
struct UnitState<H, C> {
    hw: H,
    edge: Edge,
    clock: ClockSelect,
    interrupt_enabled: bool,
    handler: Option<C>,
}

/// Input-capture timer unit
///
/// `C` is the handler tag stored in the slot. Any `Copy` type works; a plain
/// `fn()` gives the classic "function pointer called from the ISR" shape.
pub struct CaptureUnit<H, C> {
    state: Mutex<RefCell<UnitState<H, C>>>,
}

impl<H: CaptureHardware, C: Copy> CaptureUnit<H, C> {
    /// Wrap a timer's register interface
    ///
    /// The hardware is not touched until [`configure`](Self::configure).
    pub const fn new(hw: H) -> Self {
        Self {
            state: Mutex::new(RefCell::new(UnitState {
                hw,
                edge: Edge::Falling,
                clock: ClockSelect::Stopped,
                interrupt_enabled: false,
                handler: None,
            })),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut UnitState<H, C>) -> R) -> R {
        critical_section::with(|cs| f(&mut self.state.borrow_ref_mut(cs)))
    }

    /// Apply a full configuration
    ///
    /// Stops the counter, selects edge and clock, zeroes the counter and
    /// capture registers, enables the capture interrupt and makes the
    /// capture line an input. The handler slot is left as it is.
    pub fn configure(&self, config: CaptureConfig) {
        self.with(|unit| {
            unit.hw.set_clock(ClockSelect::Stopped);
            unit.hw.set_edge(config.edge);
            unit.hw.set_clock(config.clock);
            unit.hw.write_counter(0);
            unit.hw.write_capture(0);
            unit.hw.set_interrupt_enabled(true);
            unit.hw.configure_capture_input();

            unit.edge = config.edge;
            unit.clock = config.clock;
            unit.interrupt_enabled = true;
        });
    }

    /// Replace the handler
    ///
    /// `None` disables dispatch: the interrupt still fires but nothing runs.
    /// Safe to call from inside the running handler.
    pub fn set_handler(&self, handler: Option<C>) {
        self.with(|unit| unit.handler = handler);
    }

    /// Currently registered handler
    pub fn handler(&self) -> Option<C> {
        self.with(|unit| unit.handler)
    }

    /// Change only the capture edge
    ///
    /// Counter and clock keep running, so no elapsed time is lost.
    pub fn set_edge(&self, edge: Edge) {
        self.with(|unit| {
            unit.hw.set_edge(edge);
            unit.edge = edge;
        });
    }

    /// Change the capture edge and the handler as one step
    ///
    /// No capture can be dispatched between the two writes, so the handler
    /// that runs on the next capture always matches the armed edge.
    pub fn retarget(&self, edge: Edge, handler: Option<C>) {
        self.with(|unit| {
            unit.hw.set_edge(edge);
            unit.edge = edge;
            unit.handler = handler;
        });
    }

    /// Last value latched by a capture event
    ///
    /// Only meaningful for an edge once that edge's handler has run.
    pub fn captured(&self) -> Ticks {
        self.with(|unit| unit.hw.read_capture())
    }

    /// Zero the running counter without touching the configuration
    pub fn reset_counter(&self) {
        self.with(|unit| unit.hw.write_counter(0));
    }

    /// Disable the interrupt and return every register to its reset state
    ///
    /// Also empties the handler slot. Calling it twice is harmless.
    pub fn deinit(&self) {
        self.with(|unit| {
            unit.hw.set_interrupt_enabled(false);
            unit.hw.set_clock(ClockSelect::Stopped);
            unit.hw.set_edge(Edge::Falling);
            unit.hw.write_counter(0);
            unit.hw.write_capture(0);

            unit.edge = Edge::Falling;
            unit.clock = ClockSelect::Stopped;
            unit.interrupt_enabled = false;
            unit.handler = None;
        });
    }

    /// Capture interrupt entry point
    ///
    /// Call from the capture ISR. If a handler is registered, `dispatch` is
    /// invoked with it synchronously, outside the unit's lock. Returns
    /// whether a handler ran.
    pub fn on_capture(&self, dispatch: impl FnOnce(C)) -> bool {
        let handler = self.with(|unit| {
            if unit.interrupt_enabled {
                unit.handler
            } else {
                None
            }
        });

        match handler {
            Some(handler) => {
                dispatch(handler);
                true
            }
            None => false,
        }
    }

    /// Configured capture edge
    pub fn edge(&self) -> Edge {
        self.with(|unit| unit.edge)
    }

    /// Configured counter clock
    pub fn clock(&self) -> ClockSelect {
        self.with(|unit| unit.clock)
    }

    /// Check if the capture interrupt is enabled
    pub fn is_interrupt_enabled(&self) -> bool {
        self.with(|unit| unit.interrupt_enabled)
    }
}

#[cfg(test)]
mod tests {
    use core::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::sim::SimBoard;

    const DIV8: CaptureConfig = CaptureConfig::new(Edge::Rising, ClockSelect::Div8);

    #[test]
    fn test_configure_resets_registers() {
        let board = SimBoard::new();
        board.preload(1234, 99);
        let unit: CaptureUnit<_, u8> = CaptureUnit::new(board.timer());

        unit.configure(DIV8);

        assert_eq!(board.counter(), 0);
        assert_eq!(unit.captured(), 0);
        assert_eq!(board.edge_select(), Edge::Rising);
        assert_eq!(board.clock_select(), ClockSelect::Div8);
        assert!(board.interrupt_enabled());
        assert!(board.input_configured());
        assert_eq!(unit.handler(), None);
    }

    #[test]
    fn test_capture_latches_on_selected_edge_only() {
        let board = SimBoard::new();
        let unit: CaptureUnit<_, u8> = CaptureUnit::new(board.timer());
        unit.configure(CaptureConfig::new(Edge::Rising, ClockSelect::Div1));

        board.advance(40);
        assert!(!board.drive(Edge::Falling));
        assert_eq!(unit.captured(), 0);

        assert!(board.drive(Edge::Rising));
        assert_eq!(unit.captured(), 40);
    }

    #[test]
    fn test_set_edge_keeps_counter_running() {
        let board = SimBoard::new();
        let unit: CaptureUnit<_, u8> = CaptureUnit::new(board.timer());
        unit.configure(CaptureConfig::new(Edge::Rising, ClockSelect::Div1));

        board.advance(25);
        unit.set_edge(Edge::Falling);
        board.advance(5);

        assert_eq!(board.counter(), 30);
        assert_eq!(unit.edge(), Edge::Falling);
        assert_eq!(unit.clock(), ClockSelect::Div1);
    }

    #[test]
    fn test_reset_counter_keeps_configuration() {
        let board = SimBoard::new();
        let unit: CaptureUnit<_, u8> = CaptureUnit::new(board.timer());
        unit.configure(DIV8);

        board.advance(800);
        assert_eq!(board.counter(), 100);

        unit.reset_counter();
        assert_eq!(board.counter(), 0);
        assert_eq!(board.clock_select(), ClockSelect::Div8);
        assert_eq!(board.edge_select(), Edge::Rising);
    }

    #[test]
    fn test_dispatch_requires_handler() {
        let board = SimBoard::new();
        let unit: CaptureUnit<_, u8> = CaptureUnit::new(board.timer());
        unit.configure(DIV8);

        let mut seen = None;
        assert!(!unit.on_capture(|tag| seen = Some(tag)));
        assert_eq!(seen, None);

        unit.set_handler(Some(7));
        assert!(unit.on_capture(|tag| seen = Some(tag)));
        assert_eq!(seen, Some(7));

        unit.set_handler(None);
        seen = None;
        assert!(!unit.on_capture(|tag| seen = Some(tag)));
        assert_eq!(seen, None);
    }

    #[test]
    fn test_handler_can_replace_itself() {
        let board = SimBoard::new();
        let unit: CaptureUnit<_, u8> = CaptureUnit::new(board.timer());
        unit.configure(DIV8);
        unit.set_handler(Some(1));

        // The handler runs outside the lock, so touching the unit is fine
        unit.on_capture(|tag| {
            assert_eq!(tag, 1);
            unit.retarget(Edge::Falling, Some(2));
        });
        assert_eq!(unit.handler(), Some(2));
        assert_eq!(board.edge_select(), Edge::Falling);

        unit.on_capture(|tag| {
            assert_eq!(tag, 2);
            unit.set_handler(None);
        });
        assert_eq!(unit.handler(), None);
    }

    #[test]
    fn test_function_pointer_handler() {
        static CALLS: AtomicU32 = AtomicU32::new(0);

        fn on_edge() {
            CALLS.fetch_add(1, Ordering::Relaxed);
        }

        let board = SimBoard::new();
        let unit: CaptureUnit<_, fn()> = CaptureUnit::new(board.timer());
        unit.configure(DIV8);
        unit.set_handler(Some(on_edge as fn()));

        unit.on_capture(|handler| handler());
        unit.on_capture(|handler| handler());

        assert_eq!(CALLS.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_deinit_is_idempotent() {
        let board = SimBoard::new();
        let unit: CaptureUnit<_, u8> = CaptureUnit::new(board.timer());
        unit.configure(DIV8);
        unit.set_handler(Some(3));
        board.advance(80);

        unit.deinit();
        unit.deinit();

        assert!(!board.interrupt_enabled());
        assert!(!unit.is_interrupt_enabled());
        assert_eq!(board.clock_select(), ClockSelect::Stopped);
        assert_eq!(board.counter(), 0);
        assert_eq!(unit.handler(), None);
        assert!(!unit.on_capture(|_| panic!("handler ran after deinit")));
    }
}
