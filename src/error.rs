//! Driver status codes.
//!
//! Every fallible operation reports exactly which precondition failed.
//! Callers should treat any error as fatal to that call; nothing here is
//! transient, and the drivers never retry on their own.

/// Errors reported by the SysTick, DMA, and LCD drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Generic failure with no more specific cause.
    ///
    /// External collaborators (like a GPIO implementation) may map their
    /// own failures onto this.
    Failed,

    //
    // DMA transfer configuration
    //
    /// Controller id out of range (two controllers: 0 and 1).
    InvalidController,
    /// Stream id out of range (eight streams per controller).
    InvalidStream,
    /// Channel selection out of range.
    InvalidChannel,
    /// Memory burst configuration out of range.
    InvalidMemoryBurst,
    /// Peripheral burst configuration out of range.
    InvalidPeripheralBurst,
    /// Double-buffer selection is neither on nor off.
    InvalidBufferMode,
    /// Priority level out of range.
    InvalidPriority,
    /// Memory data size out of range.
    InvalidMemoryDataSize,
    /// Peripheral data size out of range.
    InvalidPeripheralDataSize,
    /// Memory increment selection is neither on nor off.
    InvalidMemoryIncrement,
    /// Peripheral increment selection is neither on nor off.
    InvalidPeripheralIncrement,
    /// Circular mode selection is neither on nor off.
    InvalidCircularMode,
    /// Transfer direction out of range.
    InvalidDirection,
    /// Flow control selection is neither on nor off.
    InvalidFlowControl,
    /// Transfer mode is neither direct nor FIFO.
    InvalidTransferMode,
    /// FIFO threshold out of range.
    InvalidFifoThreshold,
    /// Interrupt enable mask has bits outside the five defined events.
    InvalidInterruptMask,
    /// A transfer of zero data items was requested.
    ZeroTransferCount,

    //
    // SysTick timing service
    //
    /// Prescaler is not one of the two supported division factors.
    InvalidPrescaler,
    /// Reload value does not fit in the 24-bit counter.
    InvalidReload,
    /// A delay was requested while the counter is disabled.
    TimerOff,
    /// A delay was requested with a zero reload value.
    ZeroReload,
    /// A delay was requested while the tick exception is masked.
    InterruptOff,

    //
    // Character LCD
    //
    /// Cursor position outside the display geometry.
    InvalidPosition,
    /// Custom glyph slot outside CGRAM (eight slots).
    InvalidGlyphSlot,
}
