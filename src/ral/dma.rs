//! DMA register blocks and fields
//!
//! One `RegisterBlock` per controller. Both STM32F4 DMA controllers share
//! this layout; only the base address differs.

use super::{RORegister, WORegister};

/// DMA1 register base address.
pub const DMA1: *const RegisterBlock = 0x4002_6000 as *const RegisterBlock;
/// DMA2 register base address.
pub const DMA2: *const RegisterBlock = 0x4002_6400 as *const RegisterBlock;

/// DMA controller registers.
#[repr(C)]
pub struct RegisterBlock {
    /// Low Interrupt Status Register (streams 0-3)
    pub LISR: RORegister<u32>,
    /// High Interrupt Status Register (streams 4-7)
    pub HISR: RORegister<u32>,
    /// Low Interrupt Flag Clear Register (streams 0-3)
    pub LIFCR: WORegister<u32>,
    /// High Interrupt Flag Clear Register (streams 4-7)
    pub HIFCR: WORegister<u32>,
    /// Stream register sub-blocks
    pub ST: [stream::RegisterBlock; 8],
}

// Stream sub-blocks start right after the flag-clear registers and pack
// six 32-bit registers each. Did I calculate the layout correctly?
const _: () = assert!(core::mem::offset_of!(RegisterBlock, ST) == 0x10);
const _: () = assert!(core::mem::size_of::<stream::RegisterBlock>() == 0x18);
const _: () = assert!(core::mem::size_of::<RegisterBlock>() == 0xD0);

/// Per-stream registers and fields.
pub mod stream {
    use super::super::RWRegister;

    /// DMA stream registers.
    #[repr(C)]
    pub struct RegisterBlock {
        /// Stream Configuration Register
        pub CR: RWRegister<u32>,
        /// Stream Number of Data Register
        pub NDTR: RWRegister<u32>,
        /// Stream Peripheral Address Register
        pub PAR: RWRegister<u32>,
        /// Stream Memory 0 Address Register
        pub M0AR: RWRegister<u32>,
        /// Stream Memory 1 Address Register
        pub M1AR: RWRegister<u32>,
        /// Stream FIFO Control Register
        pub FCR: RWRegister<u32>,
    }

    /// Stream configuration register fields.
    pub mod CR {
        /// Stream enable / flag stream ready when read low
        pub mod EN {
            pub const offset: u32 = 0;
            pub const mask: u32 = 0b1 << offset;
            pub mod R {}
            pub mod W {}
            pub mod RW {}
        }
        /// Direct mode error interrupt enable
        pub mod DMEIE {
            pub const offset: u32 = 1;
            pub const mask: u32 = 0b1 << offset;
            pub mod R {}
            pub mod W {}
            pub mod RW {}
        }
        /// Transfer error interrupt enable
        pub mod TEIE {
            pub const offset: u32 = 2;
            pub const mask: u32 = 0b1 << offset;
            pub mod R {}
            pub mod W {}
            pub mod RW {}
        }
        /// Half transfer interrupt enable
        pub mod HTIE {
            pub const offset: u32 = 3;
            pub const mask: u32 = 0b1 << offset;
            pub mod R {}
            pub mod W {}
            pub mod RW {}
        }
        /// Transfer complete interrupt enable
        pub mod TCIE {
            pub const offset: u32 = 4;
            pub const mask: u32 = 0b1 << offset;
            pub mod R {}
            pub mod W {}
            pub mod RW {}
        }
        /// Peripheral flow controller
        pub mod PFCTRL {
            pub const offset: u32 = 5;
            pub const mask: u32 = 0b1 << offset;
            pub mod R {}
            pub mod W {}
            pub mod RW {}
        }
        /// Data transfer direction
        pub mod DIR {
            pub const offset: u32 = 6;
            pub const mask: u32 = 0b11 << offset;
            pub mod R {}
            pub mod W {}
            pub mod RW {}
        }
        /// Circular mode
        pub mod CIRC {
            pub const offset: u32 = 8;
            pub const mask: u32 = 0b1 << offset;
            pub mod R {}
            pub mod W {}
            pub mod RW {}
        }
        /// Peripheral increment mode
        pub mod PINC {
            pub const offset: u32 = 9;
            pub const mask: u32 = 0b1 << offset;
            pub mod R {}
            pub mod W {}
            pub mod RW {}
        }
        /// Memory increment mode
        pub mod MINC {
            pub const offset: u32 = 10;
            pub const mask: u32 = 0b1 << offset;
            pub mod R {}
            pub mod W {}
            pub mod RW {}
        }
        /// Peripheral data size
        pub mod PSIZE {
            pub const offset: u32 = 11;
            pub const mask: u32 = 0b11 << offset;
            pub mod R {}
            pub mod W {}
            pub mod RW {}
        }
        /// Memory data size
        pub mod MSIZE {
            pub const offset: u32 = 13;
            pub const mask: u32 = 0b11 << offset;
            pub mod R {}
            pub mod W {}
            pub mod RW {}
        }
        /// Peripheral increment offset size
        pub mod PINCOS {
            pub const offset: u32 = 15;
            pub const mask: u32 = 0b1 << offset;
            pub mod R {}
            pub mod W {}
            pub mod RW {}
        }
        /// Priority level
        pub mod PL {
            pub const offset: u32 = 16;
            pub const mask: u32 = 0b11 << offset;
            pub mod R {}
            pub mod W {}
            pub mod RW {}
        }
        /// Double buffer mode
        pub mod DBM {
            pub const offset: u32 = 18;
            pub const mask: u32 = 0b1 << offset;
            pub mod R {}
            pub mod W {}
            pub mod RW {}
        }
        /// Current target (double buffer mode only)
        pub mod CT {
            pub const offset: u32 = 19;
            pub const mask: u32 = 0b1 << offset;
            pub mod R {}
            pub mod W {}
            pub mod RW {}
        }
        /// Peripheral burst transfer configuration
        pub mod PBURST {
            pub const offset: u32 = 21;
            pub const mask: u32 = 0b11 << offset;
            pub mod R {}
            pub mod W {}
            pub mod RW {}
        }
        /// Memory burst transfer configuration
        pub mod MBURST {
            pub const offset: u32 = 23;
            pub const mask: u32 = 0b11 << offset;
            pub mod R {}
            pub mod W {}
            pub mod RW {}
        }
        /// Channel selection
        pub mod CHSEL {
            pub const offset: u32 = 25;
            pub const mask: u32 = 0b111 << offset;
            pub mod R {}
            pub mod W {}
            pub mod RW {}
        }
    }

    /// Stream number-of-data register fields.
    pub mod NDTR {
        /// Number of data items to transfer
        pub mod NDT {
            pub const offset: u32 = 0;
            pub const mask: u32 = 0xFFFF << offset;
            pub mod R {}
            pub mod W {}
            pub mod RW {}
        }
    }

    /// Stream FIFO control register fields.
    pub mod FCR {
        /// FIFO threshold selection
        pub mod FTH {
            pub const offset: u32 = 0;
            pub const mask: u32 = 0b11 << offset;
            pub mod R {}
            pub mod W {}
            pub mod RW {}
        }
        /// Direct mode disable
        pub mod DMDIS {
            pub const offset: u32 = 2;
            pub const mask: u32 = 0b1 << offset;
            pub mod R {}
            pub mod W {}
            pub mod RW {}
        }
        /// FIFO status
        pub mod FS {
            pub const offset: u32 = 3;
            pub const mask: u32 = 0b111 << offset;
            pub mod R {}
            pub mod W {}
            pub mod RW {}
        }
        /// FIFO error interrupt enable
        pub mod FEIE {
            pub const offset: u32 = 7;
            pub const mask: u32 = 0b1 << offset;
            pub mod R {}
            pub mod W {}
            pub mod RW {}
        }
    }
}
