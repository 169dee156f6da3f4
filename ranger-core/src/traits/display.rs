//! Character display trait
//!
//! The readout goes to an HD44780-style character LCD. The core only
//! knows this trait; `ranger-drivers` provides the implementation.

use core::fmt::Write;

use heapless::String;

use crate::config::DisplayConfig;
use crate::ranging::{Distance, RangeError};

/// Errors that can occur while driving the display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// A control or data line could not be driven
    Bus,
    /// Cursor position outside the display geometry
    OutOfBounds,
}

/// Text-mode character display
pub trait CharacterDisplay {
    /// Clear the screen and home the cursor
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Move the cursor to `row`, `col` (both zero-based)
    fn move_cursor(&mut self, row: u8, col: u8) -> Result<(), DisplayError>;

    /// Write ASCII text at the cursor
    fn write_str(&mut self, text: &str) -> Result<(), DisplayError>;

    /// Write text at a position
    fn text(&mut self, row: u8, col: u8, text: &str) -> Result<(), DisplayError> {
        self.move_cursor(row, col)?;
        self.write_str(text)
    }

    /// Write a signed decimal integer at a position
    fn integer(&mut self, row: u8, col: u8, value: i32) -> Result<(), DisplayError> {
        let mut buf: String<11> = String::new();
        // i32::MIN is 11 characters, so this cannot overflow
        let _ = write!(buf, "{}", value);
        self.text(row, col, &buf)
    }
}

impl<T: CharacterDisplay + ?Sized> CharacterDisplay for &mut T {
    fn clear(&mut self) -> Result<(), DisplayError> {
        T::clear(self)
    }

    fn move_cursor(&mut self, row: u8, col: u8) -> Result<(), DisplayError> {
        T::move_cursor(self, row, col)
    }

    fn write_str(&mut self, text: &str) -> Result<(), DisplayError> {
        T::write_str(self, text)
    }
}

/// Fixed part of the readout line
pub const DISTANCE_LABEL: &str = "Distance=    cm";

/// Longest value field the readout helpers render
pub const MAX_VALUE_WIDTH: usize = 8;

/// Helper trait for the distance readout
pub trait ReadoutExt: CharacterDisplay {
    /// Draw the static label on the readout row
    fn draw_label(&mut self, layout: &DisplayConfig) -> Result<(), DisplayError> {
        self.text(layout.row, 0, DISTANCE_LABEL)
    }

    /// Draw a reading into the value field
    ///
    /// The field is always written at its full width so a short value
    /// replaces every digit of a longer previous one. A missing echo shows
    /// as dashes, a value too wide for the field as `#`. A `Busy` result
    /// leaves the previous reading in place.
    fn draw_reading(
        &mut self,
        layout: &DisplayConfig,
        reading: Result<Distance, RangeError>,
    ) -> Result<(), DisplayError> {
        let width = (layout.value_width as usize).min(MAX_VALUE_WIDTH);
        let mut field: String<MAX_VALUE_WIDTH> = String::new();

        match reading {
            Ok(distance) => {
                if write!(field, "{}", distance.cm()).is_err() || field.len() > width {
                    field.clear();
                    fill(&mut field, '#', width);
                }
            }
            Err(RangeError::NoEcho) => fill(&mut field, '-', width),
            Err(RangeError::Busy) => return Ok(()),
        }

        fill(&mut field, ' ', width);
        self.text(layout.row, layout.value_col, &field)
    }
}

// Blanket implementation for all CharacterDisplay types
impl<T: CharacterDisplay + ?Sized> ReadoutExt for T {}

/// Pad `field` with `c` up to `width` characters
fn fill<const N: usize>(field: &mut String<N>, c: char, width: usize) {
    while field.len() < width {
        if field.push(c).is_err() {
            break;
        }
    }
}
