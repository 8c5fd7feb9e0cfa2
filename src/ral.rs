//! A RAL-like module for peripheral register access
//!
//! Register blocks are plain `#[repr(C)]` overlays of the hardware layout,
//! addressed through raw pointers that the caller supplies at driver
//! construction. Field constant modules let us use the RAL macros for
//! named-field access where the bit position is fixed; the DMA status and
//! flag-clear registers are accessed with computed shifts instead, since
//! their bit positions depend on the stream index.

#![allow(
    non_snake_case, // Compatibility with RAL
    non_upper_case_globals, // RAL field constant convention
)]

pub mod dma;
pub mod systick;

pub use ral_registers::{modify_reg, read_reg, write_reg};
use ral_registers::{RORegister, RWRegister, WORegister};

//
// Helper types for static memory
//
// Similar to the RAL's `Instance` type, but more copy.
//

pub(crate) struct Static<T>(pub(crate) *const T);
impl<T> core::ops::Deref for Static<T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        // Safety: pointer points to static memory (peripheral memory)
        unsafe { &*self.0 }
    }
}
impl<T> Clone for Static<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for Static<T> {}
