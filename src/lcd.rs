//! HD44780-compatible character LCD driver.
//!
//! The display hangs off eleven GPIO lines (register select, read/write,
//! enable, and an 8-bit data bus) owned by an external GPIO driver, which
//! this module reaches through the [`Gpio`] trait. Command timing comes
//! from the [`DelayMs`] collaborator; the SysTick timing service implements
//! it. Only the 8-bit bus interface is supported.

use crate::{Error, Result};

/// A port/pin pair on the external GPIO driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinId {
    pub port: u8,
    pub pin: u8,
}

/// Pin direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    Input,
    Output,
    Alternate,
    Analog,
}

/// Output driver type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputType {
    PushPull,
    OpenDrain,
}

/// Internal pull resistor selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pull {
    None,
    Up,
    Down,
}

/// Output slew rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speed {
    Low,
    Medium,
    Fast,
    High,
}

/// Full pin configuration handed to the external GPIO driver.
#[derive(Debug, Clone, Copy)]
pub struct PinConfig {
    pub mode: PinMode,
    pub output_type: OutputType,
    pub pull: Pull,
    pub speed: Speed,
}

impl PinConfig {
    /// A plain push-pull output, as every LCD line wants.
    pub const fn output() -> Self {
        Self {
            mode: PinMode::Output,
            output_type: OutputType::PushPull,
            pull: Pull::None,
            speed: Speed::Low,
        }
    }
}

/// The external GPIO collaborator.
///
/// Implementations map failures onto [`Error::Failed`] or a more specific
/// variant of their choosing.
pub trait Gpio {
    fn configure(&mut self, pin: PinId, config: PinConfig) -> Result<()>;
    fn set_level(&mut self, pin: PinId, high: bool) -> Result<()>;
}

/// Blocking millisecond delay collaborator.
pub trait DelayMs {
    fn delay_ms(&self, ms: u32) -> Result<()>;
}

impl DelayMs for crate::SysTick<'_> {
    fn delay_ms(&self, ms: u32) -> Result<()> {
        self.wait_ms(ms)
    }
}

impl<T: DelayMs + ?Sized> DelayMs for &T {
    fn delay_ms(&self, ms: u32) -> Result<()> {
        (**self).delay_ms(ms)
    }
}

/// LCD pin assignment.
#[derive(Debug, Clone, Copy)]
pub struct Pins {
    /// Register select: low for commands, high for data.
    pub rs: PinId,
    /// Read/write select, held low (write) by this driver.
    pub rw: PinId,
    /// Enable strobe; the bus is latched on its falling edge.
    pub enable: PinId,
    /// Data bus, least significant bit first.
    pub data: [PinId; 8],
}

// HD44780 instruction set.
const CLEAR_DISPLAY: u8 = 0x01;
const RETURN_HOME: u8 = 0x02;
const ENTRY_MODE_SET: u8 = 0x04;
const ENTRY_INCREMENT: u8 = 0x02;
const DISPLAY_CONTROL: u8 = 0x08;
const DISPLAY_ON: u8 = 0x04;
const CURSOR_ON: u8 = 0x02;
const BLINK_ON: u8 = 0x01;
const SHIFT: u8 = 0x10;
const SHIFT_DISPLAY: u8 = 0x08;
const SHIFT_RIGHT: u8 = 0x04;
const FUNCTION_SET: u8 = 0x20;
const DATA_LENGTH_8BIT: u8 = 0x10;
const TWO_LINES: u8 = 0x08;
const SET_CGRAM_ADDR: u8 = 0x40;
const SET_DDRAM_ADDR: u8 = 0x80;

// DDRAM address of column 0, by row.
const ROW_BASES: [u8; 4] = [0x00, 0x40, 0x14, 0x54];

/// Shift direction for [`Lcd::shift_display`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftDirection {
    Left,
    Right,
}

/// An HD44780 character LCD.
///
/// Tracks the cursor position per instance so consecutive writes advance
/// and wrap across rows without the caller re-addressing DDRAM.
pub struct Lcd<G, D> {
    gpio: G,
    delay: D,
    pins: Pins,
    columns: u8,
    rows: u8,
    cursor_row: u8,
    cursor_col: u8,
}

impl<G: Gpio, D: DelayMs> Lcd<G, D> {
    /// Create the driver for a `columns` x `rows` display.
    ///
    /// A zero-dimension geometry is [`Error::InvalidPosition`]; the cursor
    /// arithmetic needs at least one column and one row. Nothing is
    /// written to the display until [`init`](Self::init).
    pub fn new(gpio: G, delay: D, pins: Pins, columns: u8, rows: u8) -> Result<Self> {
        if columns == 0 || rows == 0 {
            return Err(Error::InvalidPosition);
        }
        Ok(Self {
            gpio,
            delay,
            pins,
            columns,
            rows,
            cursor_row: 0,
            cursor_col: 0,
        })
    }

    /// Configure the pins and run the power-on initialization sequence.
    ///
    /// Leaves the display on, cleared, cursor hidden at the origin, with
    /// left-to-right entry mode.
    pub fn init(&mut self) -> Result<()> {
        let config = PinConfig::output();
        self.gpio.configure(self.pins.rs, config)?;
        self.gpio.configure(self.pins.rw, config)?;
        self.gpio.configure(self.pins.enable, config)?;
        for pin in self.pins.data {
            self.gpio.configure(pin, config)?;
        }
        self.gpio.set_level(self.pins.rw, false)?;
        self.gpio.set_level(self.pins.enable, false)?;

        // Reset by instruction: the controller needs the function-set
        // opcode three times with generous waits before it accepts the
        // real configuration.
        self.delay.delay_ms(15)?;
        self.command(FUNCTION_SET | DATA_LENGTH_8BIT)?;
        self.delay.delay_ms(5)?;
        self.command(FUNCTION_SET | DATA_LENGTH_8BIT)?;
        self.command(FUNCTION_SET | DATA_LENGTH_8BIT)?;

        let lines = if self.rows > 1 { TWO_LINES } else { 0 };
        self.command(FUNCTION_SET | DATA_LENGTH_8BIT | lines)?;
        self.command(DISPLAY_CONTROL)?; // display off while clearing
        self.clear()?;
        self.command(ENTRY_MODE_SET | ENTRY_INCREMENT)?;
        self.command(DISPLAY_CONTROL | DISPLAY_ON)
    }

    /// Clear the display and move the cursor to the origin.
    pub fn clear(&mut self) -> Result<()> {
        self.command(CLEAR_DISPLAY)?;
        self.delay.delay_ms(2)?;
        self.cursor_row = 0;
        self.cursor_col = 0;
        Ok(())
    }

    /// Move the cursor to the origin and undo any display shift.
    pub fn home(&mut self) -> Result<()> {
        self.command(RETURN_HOME)?;
        self.delay.delay_ms(2)?;
        self.cursor_row = 0;
        self.cursor_col = 0;
        Ok(())
    }

    /// Move the cursor to `(row, col)`.
    pub fn set_cursor(&mut self, row: u8, col: u8) -> Result<()> {
        if row >= self.rows || col >= self.columns {
            return Err(Error::InvalidPosition);
        }
        self.command(SET_DDRAM_ADDR | (ROW_BASES[usize::from(row)] + col))?;
        self.cursor_row = row;
        self.cursor_col = col;
        Ok(())
    }

    /// Write one character at the cursor and advance it.
    ///
    /// `ch` is a byte in the controller's character set: ASCII for the
    /// printable range, 0 through 7 for the custom CGRAM glyphs.
    pub fn write_char(&mut self, ch: u8) -> Result<()> {
        self.data(ch)?;
        self.cursor_col += 1;
        if self.cursor_col == self.columns {
            let row = (self.cursor_row + 1) % self.rows;
            self.set_cursor(row, 0)?;
        }
        Ok(())
    }

    /// Write a string starting at the cursor, wrapping across rows.
    pub fn write_str(&mut self, s: &str) -> Result<()> {
        for ch in s.bytes() {
            self.write_char(ch)?;
        }
        Ok(())
    }

    /// Upload a 5x8 glyph into one of the eight CGRAM slots.
    ///
    /// The glyph becomes printable as character code `slot`. The cursor
    /// address is restored afterwards so writes continue where they were.
    pub fn define_glyph(&mut self, slot: u8, glyph: [u8; 8]) -> Result<()> {
        if slot >= 8 {
            return Err(Error::InvalidGlyphSlot);
        }
        self.command(SET_CGRAM_ADDR | (slot << 3))?;
        for row in glyph {
            self.data(row)?;
        }
        // Back to DDRAM addressing.
        self.set_cursor(self.cursor_row, self.cursor_col)
    }

    /// Switch the display, cursor, and cursor blink on or off.
    pub fn display_control(&mut self, display: bool, cursor: bool, blink: bool) -> Result<()> {
        let mut control = DISPLAY_CONTROL;
        if display {
            control |= DISPLAY_ON;
        }
        if cursor {
            control |= CURSOR_ON;
        }
        if blink {
            control |= BLINK_ON;
        }
        self.command(control)
    }

    /// Shift the whole display window one position without touching DDRAM.
    pub fn shift_display(&mut self, direction: ShiftDirection) -> Result<()> {
        let right = match direction {
            ShiftDirection::Right => SHIFT_RIGHT,
            ShiftDirection::Left => 0,
        };
        self.command(SHIFT | SHIFT_DISPLAY | right)
    }

    fn command(&mut self, byte: u8) -> Result<()> {
        self.gpio.set_level(self.pins.rs, false)?;
        self.put_byte(byte)
    }

    fn data(&mut self, byte: u8) -> Result<()> {
        self.gpio.set_level(self.pins.rs, true)?;
        self.put_byte(byte)
    }

    fn put_byte(&mut self, byte: u8) -> Result<()> {
        for (i, pin) in self.pins.data.into_iter().enumerate() {
            self.gpio.set_level(pin, byte & (1 << i) != 0)?;
        }
        // Latch on the enable falling edge, then let the controller chew.
        self.gpio.set_level(self.pins.enable, true)?;
        self.gpio.set_level(self.pins.enable, false)?;
        self.delay.delay_ms(1)
    }
}
