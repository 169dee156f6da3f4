//! HD44780 character LCD driver
//!
//! Write-only driver for HD44780-compatible controllers. R/W must be tied
//! low. The data bus is either four or eight lines wide; see [`FourBitBus`]
//! and [`EightBitBus`].
//!
//! Timing follows the datasheet: a 20 ms power-up wait, 1 µs strobe phases,
//! 50 µs after ordinary instructions and 2 ms after clear/home.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use ranger_core::traits::{CharacterDisplay, DisplayError};

/// Clear display, cursor home
pub const CLEAR_DISPLAY: u8 = 0x01;
/// Cursor home
pub const RETURN_HOME: u8 = 0x02;
/// Display on, cursor off
pub const DISPLAY_ON_CURSOR_OFF: u8 = 0x0C;
/// Two lines, 8-bit bus
pub const FUNCTION_SET_8BIT: u8 = 0x38;
/// Two lines, 4-bit bus
pub const FUNCTION_SET_4BIT: u8 = 0x28;
/// Set DDRAM address (OR with the address)
pub const SET_DDRAM_ADDRESS: u8 = 0x80;

/// DDRAM address of the first column of each row (16x4 layout)
pub const ROW_OFFSETS: [u8; 4] = [0x00, 0x40, 0x10, 0x50];

const POWER_UP_MS: u32 = 20;
const STROBE_US: u32 = 1;
const EXECUTE_US: u32 = 50;
const CLEAR_US: u32 = 2_000;

/// Data lines plus the enable strobe
pub trait DataBus {
    /// Instructions that put the controller into this bus width
    const FUNCTION_SET: &'static [u8];

    /// Latch one byte into the controller
    fn write_byte<D: DelayNs>(&mut self, byte: u8, delay: &mut D) -> Result<(), DisplayError>;
}

fn set<P: OutputPin>(pin: &mut P, high: bool) -> Result<(), DisplayError> {
    pin.set_state(high.into()).map_err(|_| DisplayError::Bus)
}

fn strobe<E: OutputPin, D: DelayNs>(enable: &mut E, delay: &mut D) -> Result<(), DisplayError> {
    set(enable, true)?;
    delay.delay_us(STROBE_US);
    set(enable, false)?;
    delay.delay_us(STROBE_US);
    Ok(())
}

/// 4-bit bus on D4..D7
///
/// Each byte goes out as two strobes, high nibble first.
pub struct FourBitBus<E, P> {
    enable: E,
    data: [P; 4],
}

impl<E: OutputPin, P: OutputPin> FourBitBus<E, P> {
    /// `data` is D4, D5, D6, D7 in that order
    pub fn new(enable: E, data: [P; 4]) -> Self {
        Self { enable, data }
    }

    fn write_nibble<D: DelayNs>(&mut self, nibble: u8, delay: &mut D) -> Result<(), DisplayError> {
        for (bit, pin) in self.data.iter_mut().enumerate() {
            set(pin, nibble & (1 << bit) != 0)?;
        }
        strobe(&mut self.enable, delay)
    }

    /// Release the pins
    pub fn release(self) -> (E, [P; 4]) {
        (self.enable, self.data)
    }
}

impl<E: OutputPin, P: OutputPin> DataBus for FourBitBus<E, P> {
    // 0x33 and 0x32 walk the controller from any state into 4-bit mode
    const FUNCTION_SET: &'static [u8] = &[0x33, 0x32, FUNCTION_SET_4BIT];

    fn write_byte<D: DelayNs>(&mut self, byte: u8, delay: &mut D) -> Result<(), DisplayError> {
        self.write_nibble(byte >> 4, delay)?;
        self.write_nibble(byte & 0x0F, delay)
    }
}

/// 8-bit bus on D0..D7
pub struct EightBitBus<E, P> {
    enable: E,
    data: [P; 8],
}

impl<E: OutputPin, P: OutputPin> EightBitBus<E, P> {
    /// `data` is D0 through D7 in order
    pub fn new(enable: E, data: [P; 8]) -> Self {
        Self { enable, data }
    }

    /// Release the pins
    pub fn release(self) -> (E, [P; 8]) {
        (self.enable, self.data)
    }
}

impl<E: OutputPin, P: OutputPin> DataBus for EightBitBus<E, P> {
    const FUNCTION_SET: &'static [u8] = &[FUNCTION_SET_8BIT];

    fn write_byte<D: DelayNs>(&mut self, byte: u8, delay: &mut D) -> Result<(), DisplayError> {
        for (bit, pin) in self.data.iter_mut().enumerate() {
            set(pin, byte & (1 << bit) != 0)?;
        }
        strobe(&mut self.enable, delay)
    }
}

/// HD44780 character LCD
pub struct Hd44780<B, RS, D> {
    bus: B,
    rs: RS,
    delay: D,
    rows: u8,
    columns: u8,
}

impl<B, RS, D> Hd44780<B, RS, D>
where
    B: DataBus,
    RS: OutputPin,
    D: DelayNs,
{
    /// Create a driver for a `rows` x `columns` display
    ///
    /// Call [`init`](Self::init) before drawing anything.
    pub fn new(bus: B, rs: RS, delay: D, rows: u8, columns: u8) -> Self {
        Self {
            bus,
            rs,
            delay,
            rows: rows.min(ROW_OFFSETS.len() as u8),
            columns,
        }
    }

    /// Power-up wait, bus width, display on, clear
    pub fn init(&mut self) -> Result<(), DisplayError> {
        self.delay.delay_ms(POWER_UP_MS);

        for &instruction in B::FUNCTION_SET {
            self.command(instruction)?;
        }
        self.command(DISPLAY_ON_CURSOR_OFF)?;
        self.command(CLEAR_DISPLAY)
    }

    /// Send an instruction byte
    pub fn command(&mut self, instruction: u8) -> Result<(), DisplayError> {
        set(&mut self.rs, false)?;
        self.bus.write_byte(instruction, &mut self.delay)?;

        let settle = match instruction {
            CLEAR_DISPLAY | RETURN_HOME => CLEAR_US,
            _ => EXECUTE_US,
        };
        self.delay.delay_us(settle);
        Ok(())
    }

    /// Send a character code
    pub fn data(&mut self, byte: u8) -> Result<(), DisplayError> {
        set(&mut self.rs, true)?;
        self.bus.write_byte(byte, &mut self.delay)?;
        self.delay.delay_us(EXECUTE_US);
        Ok(())
    }

    /// Display geometry as (rows, columns)
    pub fn size(&self) -> (u8, u8) {
        (self.rows, self.columns)
    }

    /// Release the bus, RS pin and delay
    pub fn release(self) -> (B, RS, D) {
        (self.bus, self.rs, self.delay)
    }
}

impl<B, RS, D> CharacterDisplay for Hd44780<B, RS, D>
where
    B: DataBus,
    RS: OutputPin,
    D: DelayNs,
{
    fn clear(&mut self) -> Result<(), DisplayError> {
        self.command(CLEAR_DISPLAY)
    }

    fn move_cursor(&mut self, row: u8, col: u8) -> Result<(), DisplayError> {
        if row >= self.rows || col >= self.columns {
            return Err(DisplayError::OutOfBounds);
        }
        let address = ROW_OFFSETS[row as usize] + col;
        self.command(SET_DDRAM_ADDRESS | address)
    }

    fn write_str(&mut self, text: &str) -> Result<(), DisplayError> {
        for c in text.chars() {
            // The character ROM only matches ASCII
            let code = if c.is_ascii() { c as u8 } else { b'?' };
            self.data(code)?;
        }
        Ok(())
    }
}
