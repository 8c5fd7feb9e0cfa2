//! SysTick, DMA stream, and character LCD drivers for STM32F4 processors.
//!
//! `stm32f4-drivers` provides
//!
//! - a [`Dma`] driver that programs, starts, and stops transfers on the
//!   two DMA controllers (eight streams each), and dispatches stream
//!   interrupts to registered callbacks.
//! - a [`SysTick`](crate::systick::SysTick) timing service with a blocking
//!   millisecond delay and an optional periodic callback.
//! - an [`Lcd`](crate::lcd::Lcd) driver for HD44780-compatible character
//!   displays, built on an external GPIO interface and the timing service.
//!
//! This crate talks to memory-mapped registers directly; there is no
//! operating system underneath. It may be re-exported from a hardware
//! abstraction layer (HAL). If it is, you should use the safer APIs
//! provided by your HAL.
//!
//! # Getting started
//!
//! Allocate the drivers in statics, pointing them at the register blocks
//! for your part. The [`ral`] module carries the STM32F4 base addresses.
//! You own the vector table, so you also own the 16 `DMAx_Streamy`
//! interrupt symbols and the `SysTick` exception; route each one into the
//! matching driver entry point.
//!
//! ```no_run
//! use stm32f4_drivers::{interrupt::Event, ral, Dma, SysTick};
//!
//! // Safety: addresses point to the DMA1, DMA2, and SysTick register
//! // blocks on this target.
//! static DMA: Dma = unsafe { Dma::new(ral::dma::DMA1.cast(), ral::dma::DMA2.cast()) };
//! static TICK: SysTick = unsafe { SysTick::new(ral::systick::SYSTICK.cast()) };
//!
//! #[no_mangle]
//! extern "C" fn DMA1_Stream5() {
//!     DMA.on_interrupt(0, 5);
//! }
//!
//! #[no_mangle]
//! extern "C" fn SysTick() {
//!     TICK.on_interrupt();
//! }
//!
//! fn tx_complete() { /* ... */ }
//!
//! # fn demo() -> Result<(), stm32f4_drivers::Error> {
//! TICK.init(16_000_000, stm32f4_drivers::systick::PRESCALER_NONE)?;
//! TICK.set_start_value(16_000 - 1)?;
//! TICK.start_count();
//!
//! DMA.set_callback(0, 5, Event::TransferComplete, Some(&tx_complete))?;
//! TICK.wait_ms(100)?;
//! # Ok(())
//! # }
//! ```
//!
//! Transfers are described by a [`TransferConfig`], validated and written
//! to the stream registers by [`Dma::configure`], and started with
//! [`Dma::start_transfer`]. See the [`stream`] module for the
//! configuration constants.
//!
//! ### License
//!
//! Licensed under either of
//!
//! - [Apache License, Version 2.0](http://www.apache.org/licenses/LICENSE-2.0) ([LICENSE-APACHE](./LICENSE-APACHE))
//! - [MIT License](http://opensource.org/licenses/MIT) ([LICENSE-MIT](./LICENSE-MIT))
//!
//! at your option.
//!
//! Unless you explicitly state otherwise, any contribution intentionally submitted
//! for inclusion in the work by you, as defined in the Apache-2.0 license, shall be
//! dual licensed as above, without any additional terms or conditions.

#![cfg_attr(not(test), no_std)]

mod error;
pub mod interrupt;
pub mod lcd;
pub mod ral;
pub mod stream;
pub mod systick;

pub use error::Error;
pub use interrupt::Event;
pub use stream::TransferConfig;
pub use systick::SysTick;

/// A driver result
pub type Result<T> = core::result::Result<T, Error>;

/// Number of DMA controllers.
pub const CONTROLLER_COUNT: usize = 2;
/// Number of streams per DMA controller.
pub const STREAM_COUNT: usize = 8;

use interrupt::CallbackSlots;

/// A DMA driver.
///
/// This driver manages both DMA controllers. It's configured with pointers
/// to their register blocks, and it owns the callback registry consulted
/// by [`on_interrupt`](Dma::on_interrupt).
///
/// Streams are addressed by `(controller, stream)` pairs: controller 0 or
/// 1, stream 0 through 7. Every fallible method validates both ids before
/// touching a register.
pub struct Dma<'a> {
    controllers: [ral::Static<ral::dma::RegisterBlock>; CONTROLLER_COUNT],
    callbacks: [[CallbackSlots<'a>; STREAM_COUNT]; CONTROLLER_COUNT],
}

// Safety: OK to allocate a DMA driver in a static context. The callback
// cells are written behind masked interrupts and read from interrupt
// context only.
unsafe impl Sync for Dma<'_> {}

impl<'a> Dma<'a> {
    const EMPTY_STREAMS: [CallbackSlots<'a>; STREAM_COUNT] =
        [CallbackSlots::EMPTY; STREAM_COUNT];

    /// Create the DMA driver.
    ///
    /// Note that this can evaluate at compile time, so the driver can live
    /// in a static reachable from your interrupt handlers.
    ///
    /// # Safety
    ///
    /// Caller must make sure that `dma1` and `dma2` point to the start of
    /// the first and second DMA controller register blocks for your MCU.
    pub const unsafe fn new(dma1: *const (), dma2: *const ()) -> Self {
        Self {
            controllers: [ral::Static(dma1.cast()), ral::Static(dma2.cast())],
            callbacks: [Self::EMPTY_STREAMS; CONTROLLER_COUNT],
        }
    }

    /// Returns the register block for `controller`, or the id error.
    pub(crate) fn registers(&self, controller: u8) -> Result<ral::Static<ral::dma::RegisterBlock>> {
        self.controllers
            .get(usize::from(controller))
            .copied()
            .ok_or(Error::InvalidController)
    }

    pub(crate) fn slots(&self, controller: u8, stream: u8) -> &CallbackSlots<'a> {
        &self.callbacks[usize::from(controller)][usize::from(stream)]
    }
}

/// Run `f` with interrupts masked on bare-metal targets.
///
/// Callback slots hold two-word trait object references, so a store must
/// not tear against a dispatching interrupt. Host builds (unit tests) have
/// no interrupts to mask.
pub(crate) fn interrupt_free<R>(f: impl FnOnce() -> R) -> R {
    cfg_if::cfg_if! {
        if #[cfg(all(target_arch = "arm", target_os = "none"))] {
            cortex_m::interrupt::free(|_| f())
        } else {
            f()
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Drivers pointed at plain-memory register blocks, so host tests can
    //! observe every register side effect.

    use crate::ral;

    fn zeroed<T>() -> Box<T> {
        // Register cells are volatile integer wrappers; all-zero is valid.
        unsafe { Box::new(core::mem::MaybeUninit::zeroed().assume_init()) }
    }

    pub(crate) fn fake_dma<'a>() -> (crate::Dma<'a>, [Box<ral::dma::RegisterBlock>; 2]) {
        let mem = [zeroed::<ral::dma::RegisterBlock>(), zeroed()];
        let dma = unsafe {
            crate::Dma::new(
                (&*mem[0] as *const ral::dma::RegisterBlock).cast(),
                (&*mem[1] as *const ral::dma::RegisterBlock).cast(),
            )
        };
        (dma, mem)
    }

    pub(crate) fn fake_systick<'a>() -> (crate::SysTick<'a>, Box<ral::systick::RegisterBlock>) {
        let mem = zeroed::<ral::systick::RegisterBlock>();
        let tick =
            unsafe { crate::SysTick::new((&*mem as *const ral::systick::RegisterBlock).cast()) };
        (tick, mem)
    }

    /// Raw read of any 32-bit register cell, including write-only ones.
    pub(crate) fn read_raw<T>(reg: &T) -> u32 {
        unsafe { (reg as *const T).cast::<u32>().read_volatile() }
    }

    /// Raw write to any 32-bit register cell, including read-only ones.
    pub(crate) fn write_raw<T>(reg: &T, value: u32) {
        unsafe { (reg as *const T as *mut u32).write_volatile(value) }
    }

    /// Latch a condition flag in the controller's status registers.
    pub(crate) fn set_status_flag(regs: &ral::dma::RegisterBlock, stream: u8, position: u32) {
        let status = if stream < 4 { &regs.LISR } else { &regs.HISR };
        write_raw(status, read_raw(status) | (1 << position));
    }
}
