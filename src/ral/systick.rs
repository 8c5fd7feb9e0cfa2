//! SysTick register block and fields
//!
//! Documented in the Cortex-M Devices Generic User Guide, chapter 4.4. The
//! block lives at the same address on every Cortex-M core.

use super::{RORegister, RWRegister};

/// SysTick register base address.
pub const SYSTICK: *const RegisterBlock = 0xE000_E010 as *const RegisterBlock;

/// SysTick registers.
#[repr(C)]
pub struct RegisterBlock {
    /// Control and Status Register
    pub CSR: RWRegister<u32>,
    /// Reload Value Register
    pub RVR: RWRegister<u32>,
    /// Current Value Register
    pub CVR: RWRegister<u32>,
    /// Calibration Value Register
    pub CALIB: RORegister<u32>,
}

const _: () = assert!(core::mem::size_of::<RegisterBlock>() == 0x10);

/// Control and status register fields.
pub mod CSR {
    /// Counter enable
    pub mod ENABLE {
        pub const offset: u32 = 0;
        pub const mask: u32 = 0b1 << offset;
        pub mod R {}
        pub mod W {}
        pub mod RW {}
    }
    /// SysTick exception request enable
    pub mod TICKINT {
        pub const offset: u32 = 1;
        pub const mask: u32 = 0b1 << offset;
        pub mod R {}
        pub mod W {}
        pub mod RW {}
    }
    /// Clock source: (0) external clock, (1) processor clock
    pub mod CLKSOURCE {
        pub const offset: u32 = 2;
        pub const mask: u32 = 0b1 << offset;
        pub mod R {}
        pub mod W {}
        pub mod RW {}
    }
    /// Returns 1 if the timer counted to 0 since the last read. Reading
    /// this field clears it.
    pub mod COUNTFLAG {
        pub const offset: u32 = 16;
        pub const mask: u32 = 0b1 << offset;
        pub mod R {}
        pub mod W {}
        pub mod RW {}
    }
}

/// Reload value register fields.
pub mod RVR {
    /// Value loaded into the counter when it reaches 0
    pub mod RELOAD {
        pub const offset: u32 = 0;
        pub const mask: u32 = 0x00FF_FFFF << offset;
        pub mod R {}
        pub mod W {}
        pub mod RW {}
    }
}

/// Current value register fields.
pub mod CVR {
    /// Current counter value. A write of any value clears it to 0.
    pub mod CURRENT {
        pub const offset: u32 = 0;
        pub const mask: u32 = 0x00FF_FFFF << offset;
        pub mod R {}
        pub mod W {}
        pub mod RW {}
    }
}

/// Calibration value register fields.
pub mod CALIB {
    /// Reload value for 10ms ticks, or 0 if not calibrated
    pub mod TENMS {
        pub const offset: u32 = 0;
        pub const mask: u32 = 0x00FF_FFFF << offset;
        pub mod R {}
        pub mod W {}
        pub mod RW {}
    }
    /// 1 if TENMS is inexact or not given
    pub mod SKEW {
        pub const offset: u32 = 30;
        pub const mask: u32 = 0b1 << offset;
        pub mod R {}
        pub mod W {}
        pub mod RW {}
    }
    /// 1 if no external reference clock is provided
    pub mod NOREF {
        pub const offset: u32 = 31;
        pub const mask: u32 = 0b1 << offset;
        pub mod R {}
        pub mod W {}
        pub mod RW {}
    }
}
