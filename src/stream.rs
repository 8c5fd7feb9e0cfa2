//! DMA stream transfer configuration and control.
//!
//! A transfer is described by a [`TransferConfig`], checked and written to
//! the stream registers by [`Dma::configure`](crate::Dma::configure), and
//! started with [`Dma::start_transfer`](crate::Dma::start_transfer). The
//! driver copies the descriptor's fields into hardware and does not retain
//! it.
//!
//! Configuration fields carry raw register encodings with the legal values
//! named by the constant modules below. Validation runs field by field in a
//! fixed order, and the first violation determines the reported error.

use crate::interrupt::Event;
use crate::{ral, Error, Result};

/// Burst transfer configuration. Applies to the memory and peripheral
/// sides independently.
pub mod burst {
    /// Single transfer
    pub const SINGLE: u8 = 0;
    /// Incremental burst of 4 beats
    pub const INCR4: u8 = 1;
    /// Incremental burst of 8 beats
    pub const INCR8: u8 = 2;
    /// Incremental burst of 16 beats
    pub const INCR16: u8 = 3;
}

/// Data item sizes.
pub mod data_size {
    /// 8-bit items
    pub const BYTE: u8 = 0;
    /// 16-bit items
    pub const HALF_WORD: u8 = 1;
    /// 32-bit items
    pub const WORD: u8 = 2;
}

/// Transfer directions.
pub mod direction {
    pub const PERIPHERAL_TO_MEMORY: u8 = 0;
    pub const MEMORY_TO_PERIPHERAL: u8 = 1;
    pub const MEMORY_TO_MEMORY: u8 = 2;
}

/// Stream arbitration priorities.
pub mod priority {
    pub const LOW: u8 = 0;
    pub const MEDIUM: u8 = 1;
    pub const HIGH: u8 = 2;
    pub const VERY_HIGH: u8 = 3;
}

/// Transfer modes.
pub mod transfer_mode {
    /// Direct mode: each item moves through the FIFO immediately.
    pub const DIRECT: u8 = 0;
    /// FIFO mode: items accumulate up to the configured threshold.
    pub const FIFO: u8 = 1;
}

/// FIFO fill thresholds, effective in FIFO mode.
pub mod fifo_threshold {
    pub const QUARTER: u8 = 0;
    pub const HALF: u8 = 1;
    pub const THREE_QUARTERS: u8 = 2;
    pub const FULL: u8 = 3;
}

/// On/off encoding for single-bit selections.
pub mod toggle {
    pub const OFF: u8 = 0;
    pub const ON: u8 = 1;
}

/// Interrupt enable mask bits for [`TransferConfig::interrupts`].
pub mod interrupts {
    pub const NONE: u8 = 0;
    pub const FIFO_ERROR: u8 = 1 << 0;
    pub const DIRECT_MODE_ERROR: u8 = 1 << 1;
    pub const TRANSFER_ERROR: u8 = 1 << 2;
    pub const HALF_TRANSFER: u8 = 1 << 3;
    pub const TRANSFER_COMPLETE: u8 = 1 << 4;
    /// Every defined enable bit.
    pub const ALL: u8 = 0x1F;
}

/// A DMA stream transfer descriptor.
///
/// Constructed by the caller, consumed by [`Dma::configure`](crate::Dma::configure).
/// Fields hold raw register encodings; the constant modules in this module
/// name the legal values.
#[derive(Debug, Clone, Copy)]
pub struct TransferConfig {
    /// Controller id, 0 or 1.
    pub controller: u8,
    /// Stream id, 0 through 7.
    pub stream: u8,
    /// Channel selection, 0 through 7.
    pub channel: u8,
    /// Memory burst, see [`burst`].
    pub memory_burst: u8,
    /// Peripheral burst, see [`burst`].
    pub peripheral_burst: u8,
    /// Double-buffer mode, see [`toggle`].
    pub double_buffer: u8,
    /// Arbitration priority, see [`priority`].
    pub priority: u8,
    /// Memory data size, see [`data_size`].
    pub memory_data_size: u8,
    /// Peripheral data size, see [`data_size`].
    pub peripheral_data_size: u8,
    /// Memory address increment, see [`toggle`].
    pub memory_increment: u8,
    /// Peripheral address increment, see [`toggle`].
    pub peripheral_increment: u8,
    /// Circular mode, see [`toggle`].
    pub circular: u8,
    /// Transfer direction, see [`direction`].
    pub direction: u8,
    /// Peripheral flow control, see [`toggle`].
    pub flow_control: u8,
    /// Direct or FIFO mode, see [`transfer_mode`].
    pub transfer_mode: u8,
    /// FIFO threshold, see [`fifo_threshold`].
    pub fifo_threshold: u8,
    /// Interrupt enable mask, see [`interrupts`].
    pub interrupts: u8,
    /// Number of data items to transfer. Must be nonzero.
    pub transfer_count: u16,
    /// Peripheral port address.
    pub peripheral_address: u32,
    /// Primary memory buffer address.
    pub memory0_address: u32,
    /// Secondary memory buffer address, written only in double-buffer mode.
    pub memory1_address: u32,
}

impl TransferConfig {
    /// Field checks in their documented order. Ids are excluded; the
    /// driver validates those before it takes the stream down.
    fn validate_fields(&self) -> Result<()> {
        if self.channel > 7 {
            return Err(Error::InvalidChannel);
        }
        if self.memory_burst > burst::INCR16 {
            return Err(Error::InvalidMemoryBurst);
        }
        if self.peripheral_burst > burst::INCR16 {
            return Err(Error::InvalidPeripheralBurst);
        }
        if self.double_buffer > toggle::ON {
            return Err(Error::InvalidBufferMode);
        }
        if self.priority > priority::VERY_HIGH {
            return Err(Error::InvalidPriority);
        }
        if self.memory_data_size > data_size::WORD {
            return Err(Error::InvalidMemoryDataSize);
        }
        if self.peripheral_data_size > data_size::WORD {
            return Err(Error::InvalidPeripheralDataSize);
        }
        if self.memory_increment > toggle::ON {
            return Err(Error::InvalidMemoryIncrement);
        }
        if self.peripheral_increment > toggle::ON {
            return Err(Error::InvalidPeripheralIncrement);
        }
        if self.circular > toggle::ON {
            return Err(Error::InvalidCircularMode);
        }
        if self.direction > direction::MEMORY_TO_MEMORY {
            return Err(Error::InvalidDirection);
        }
        if self.flow_control > toggle::ON {
            return Err(Error::InvalidFlowControl);
        }
        if self.transfer_mode > transfer_mode::FIFO {
            return Err(Error::InvalidTransferMode);
        }
        if self.fifo_threshold > fifo_threshold::FULL {
            return Err(Error::InvalidFifoThreshold);
        }
        if self.interrupts & !interrupts::ALL != 0 {
            return Err(Error::InvalidInterruptMask);
        }
        if self.transfer_count == 0 {
            return Err(Error::ZeroTransferCount);
        }
        Ok(())
    }
}

// Stream status flags pack two streams per byte lane, six bits per stream,
// and the groups are not evenly spaced within the register.
const GROUP_OFFSETS: [u32; 4] = [0, 6, 16, 22];

/// Bit position of `event`'s flag for `stream` within its status register.
///
/// Streams 0-3 live in the low status/clear registers, streams 4-7 in the
/// high ones, at the same positions.
pub(crate) fn flag_position(stream: u8, event: Event) -> u32 {
    event.base_position() + GROUP_OFFSETS[usize::from(stream % 4)]
}

impl<'a> crate::Dma<'a> {
    /// Validates ids, then returns the controller register block.
    fn checked(&self, controller: u8, stream: u8) -> Result<ral::Static<ral::dma::RegisterBlock>> {
        let regs = self.registers(controller)?;
        if usize::from(stream) >= crate::STREAM_COUNT {
            return Err(Error::InvalidStream);
        }
        Ok(regs)
    }

    /// Validate `config` and program the stream it names.
    ///
    /// The stream is disabled as soon as its ids check out, valid
    /// descriptor or not. The first invalid field aborts with its specific
    /// error and no further register writes. On success every transfer
    /// register is written; the stream is left disabled, and
    /// [`start_transfer`](Self::start_transfer) is the separate, explicit
    /// start step. The secondary memory address register is written only
    /// when double-buffer mode is requested.
    pub fn configure(&self, config: &TransferConfig) -> Result<()> {
        let regs = self.checked(config.controller, config.stream)?;
        let st = &regs.ST[usize::from(config.stream)];
        ral::modify_reg!(crate::ral::dma::stream, st, CR, EN: 0);
        config.validate_fields()?;

        let ints = u32::from(config.interrupts);
        ral::write_reg!(crate::ral::dma::stream, st, CR,
            CHSEL: u32::from(config.channel),
            MBURST: u32::from(config.memory_burst),
            PBURST: u32::from(config.peripheral_burst),
            DBM: u32::from(config.double_buffer),
            PL: u32::from(config.priority),
            MSIZE: u32::from(config.memory_data_size),
            PSIZE: u32::from(config.peripheral_data_size),
            MINC: u32::from(config.memory_increment),
            PINC: u32::from(config.peripheral_increment),
            CIRC: u32::from(config.circular),
            DIR: u32::from(config.direction),
            PFCTRL: u32::from(config.flow_control),
            TCIE: (ints >> 4) & 1,
            HTIE: (ints >> 3) & 1,
            TEIE: (ints >> 2) & 1,
            DMEIE: (ints >> 1) & 1);
        ral::write_reg!(crate::ral::dma::stream, st, NDTR, NDT: u32::from(config.transfer_count));
        ral::write_reg!(crate::ral::dma::stream, st, PAR, config.peripheral_address);
        ral::write_reg!(crate::ral::dma::stream, st, M0AR, config.memory0_address);
        if config.double_buffer == toggle::ON {
            ral::write_reg!(crate::ral::dma::stream, st, M1AR, config.memory1_address);
        }
        ral::write_reg!(crate::ral::dma::stream, st, FCR,
            FEIE: ints & 1,
            DMDIS: u32::from(config.transfer_mode),
            FTH: u32::from(config.fifo_threshold));
        Ok(())
    }

    /// Enable the stream. No other register is touched.
    pub fn start_transfer(&self, controller: u8, stream: u8) -> Result<()> {
        let regs = self.checked(controller, stream)?;
        let st = &regs.ST[usize::from(stream)];
        ral::modify_reg!(crate::ral::dma::stream, st, CR, EN: 1);
        Ok(())
    }

    /// Disable the stream. No other register is touched.
    pub fn stop_transfer(&self, controller: u8, stream: u8) -> Result<()> {
        let regs = self.checked(controller, stream)?;
        let st = &regs.ST[usize::from(stream)];
        ral::modify_reg!(crate::ral::dma::stream, st, CR, EN: 0);
        Ok(())
    }

    /// Read one stream's latched condition flag.
    pub fn flag(&self, controller: u8, stream: u8, event: Event) -> Result<bool> {
        let regs = self.checked(controller, stream)?;
        let status = if stream < 4 {
            regs.LISR.read()
        } else {
            regs.HISR.read()
        };
        Ok(status & (1 << flag_position(stream, event)) != 0)
    }

    /// Clear one stream's latched condition flag.
    pub fn clear_flag(&self, controller: u8, stream: u8, event: Event) -> Result<()> {
        let regs = self.checked(controller, stream)?;
        let clear = 1 << flag_position(stream, event);
        if stream < 4 {
            regs.LIFCR.write(clear);
        } else {
            regs.HIFCR.write(clear);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fake_dma, read_raw, set_status_flag};

    fn valid_config() -> TransferConfig {
        TransferConfig {
            controller: 0,
            stream: 5,
            channel: 3,
            memory_burst: burst::INCR4,
            peripheral_burst: burst::SINGLE,
            double_buffer: toggle::OFF,
            priority: priority::HIGH,
            memory_data_size: data_size::HALF_WORD,
            peripheral_data_size: data_size::BYTE,
            memory_increment: toggle::ON,
            peripheral_increment: toggle::OFF,
            circular: toggle::OFF,
            direction: direction::MEMORY_TO_PERIPHERAL,
            flow_control: toggle::OFF,
            transfer_mode: transfer_mode::FIFO,
            fifo_threshold: fifo_threshold::FULL,
            interrupts: interrupts::TRANSFER_COMPLETE | interrupts::TRANSFER_ERROR,
            transfer_count: 256,
            peripheral_address: 0x4001_3804,
            memory0_address: 0x2000_0000,
            memory1_address: 0x2000_1000,
        }
    }

    #[test]
    fn configure_programs_stream_registers() {
        let (dma, mem) = fake_dma();
        dma.configure(&valid_config()).unwrap();
        let st = &mem[0].ST[5];

        let expected_cr = (3 << 25)  // CHSEL
            | (1 << 23)              // MBURST INCR4
            | (2 << 16)              // PL HIGH
            | (1 << 13)              // MSIZE HALF_WORD
            | (1 << 10)              // MINC
            | (1 << 6)               // DIR MEMORY_TO_PERIPHERAL
            | (1 << 4)               // TCIE
            | (1 << 2);              // TEIE
        assert_eq!(st.CR.read(), expected_cr);
        assert_eq!(st.NDTR.read(), 256);
        assert_eq!(st.PAR.read(), 0x4001_3804);
        assert_eq!(st.M0AR.read(), 0x2000_0000);
        // Not double-buffered: the secondary address stays untouched.
        assert_eq!(st.M1AR.read(), 0);
        // DMDIS | FTH == FULL
        assert_eq!(st.FCR.read(), (1 << 2) | 3);
        // Configure never enables the stream.
        assert_eq!(st.CR.read() & 1, 0);
    }

    #[test]
    fn configure_writes_memory1_only_in_double_buffer_mode() {
        let (dma, mem) = fake_dma();
        let mut config = valid_config();
        config.double_buffer = toggle::ON;
        dma.configure(&config).unwrap();
        assert_eq!(mem[0].ST[5].M1AR.read(), 0x2000_1000);
    }

    #[test]
    fn configure_rejects_each_field_with_its_own_error() {
        let cases: [(fn(&mut TransferConfig), Error); 18] = [
            (|c| c.controller = 2, Error::InvalidController),
            (|c| c.stream = 8, Error::InvalidStream),
            (|c| c.channel = 8, Error::InvalidChannel),
            (|c| c.memory_burst = 4, Error::InvalidMemoryBurst),
            (|c| c.peripheral_burst = 4, Error::InvalidPeripheralBurst),
            (|c| c.double_buffer = 2, Error::InvalidBufferMode),
            (|c| c.priority = 4, Error::InvalidPriority),
            (|c| c.memory_data_size = 3, Error::InvalidMemoryDataSize),
            (|c| c.peripheral_data_size = 3, Error::InvalidPeripheralDataSize),
            (|c| c.memory_increment = 2, Error::InvalidMemoryIncrement),
            (|c| c.peripheral_increment = 2, Error::InvalidPeripheralIncrement),
            (|c| c.circular = 2, Error::InvalidCircularMode),
            (|c| c.direction = 3, Error::InvalidDirection),
            (|c| c.flow_control = 2, Error::InvalidFlowControl),
            (|c| c.transfer_mode = 2, Error::InvalidTransferMode),
            (|c| c.fifo_threshold = 4, Error::InvalidFifoThreshold),
            (|c| c.interrupts = 0x20, Error::InvalidInterruptMask),
            (|c| c.transfer_count = 0, Error::ZeroTransferCount),
        ];
        for (break_field, expected) in cases {
            let (dma, _mem) = fake_dma();
            let mut config = valid_config();
            break_field(&mut config);
            assert_eq!(dma.configure(&config), Err(expected));
        }
    }

    #[test]
    fn first_failing_field_determines_the_error() {
        let (dma, _mem) = fake_dma();
        let mut config = valid_config();
        config.channel = 8;
        config.priority = 4;
        config.transfer_count = 0;
        assert_eq!(dma.configure(&config), Err(Error::InvalidChannel));
    }

    #[test]
    fn invalid_field_still_disables_the_stream() {
        let (dma, mem) = fake_dma();
        let st = &mem[0].ST[5];
        st.CR.write(1); // stream previously enabled
        let mut config = valid_config();
        config.channel = 8;
        assert_eq!(dma.configure(&config), Err(Error::InvalidChannel));
        assert_eq!(st.CR.read() & 1, 0);
        // No writes beyond the disable.
        assert_eq!(st.NDTR.read(), 0);
        assert_eq!(st.PAR.read(), 0);
    }

    #[test]
    fn invalid_ids_leave_everything_untouched() {
        let (dma, mem) = fake_dma();
        let mut config = valid_config();
        config.controller = 2;
        assert_eq!(dma.configure(&config), Err(Error::InvalidController));
        config = valid_config();
        config.stream = 8;
        assert_eq!(dma.configure(&config), Err(Error::InvalidStream));
        for st in &mem[0].ST {
            assert_eq!(st.CR.read(), 0);
        }
    }

    #[test]
    fn start_and_stop_toggle_only_the_enable_bit() {
        let (dma, mem) = fake_dma();
        let st = &mem[1].ST[2];
        st.CR.write(0x0800_0050);
        dma.start_transfer(1, 2).unwrap();
        assert_eq!(st.CR.read(), 0x0800_0051);
        dma.stop_transfer(1, 2).unwrap();
        assert_eq!(st.CR.read(), 0x0800_0050);

        assert_eq!(dma.start_transfer(2, 0), Err(Error::InvalidController));
        assert_eq!(dma.stop_transfer(0, 8), Err(Error::InvalidStream));
    }

    #[test]
    fn flag_positions_follow_the_group_layout() {
        let events = [
            (Event::FifoError, 0),
            (Event::DirectModeError, 2),
            (Event::TransferError, 3),
            (Event::HalfTransfer, 4),
            (Event::TransferComplete, 5),
        ];
        for stream in 0..8u8 {
            let group = [0, 6, 16, 22][usize::from(stream % 4)];
            for (event, base) in events {
                assert_eq!(flag_position(stream, event), base + group);
            }
        }
    }

    #[test]
    fn flag_reads_the_right_register_and_bit() {
        for controller in 0..2u8 {
            for stream in 0..8u8 {
                for event in Event::DISPATCH_ORDER {
                    let (dma, mem) = fake_dma();
                    let regs = &mem[usize::from(controller)];
                    set_status_flag(regs, stream, flag_position(stream, event));
                    assert_eq!(dma.flag(controller, stream, event), Ok(true));
                    // Only that one flag reads as set.
                    for other in Event::DISPATCH_ORDER {
                        if other != event {
                            assert_eq!(dma.flag(controller, stream, other), Ok(false));
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn clear_flag_writes_one_bit_to_the_right_register() {
        for controller in 0..2u8 {
            for stream in 0..8u8 {
                let (dma, mem) = fake_dma();
                let regs = &mem[usize::from(controller)];
                dma.clear_flag(controller, stream, Event::TransferComplete)
                    .unwrap();
                let expected = 1 << flag_position(stream, Event::TransferComplete);
                let (low, high) = (read_raw(&regs.LIFCR), read_raw(&regs.HIFCR));
                if stream < 4 {
                    assert_eq!((low, high), (expected, 0));
                } else {
                    assert_eq!((low, high), (0, expected));
                }
            }
        }
    }

    #[test]
    fn flag_primitives_validate_ids() {
        let (dma, _mem) = fake_dma();
        assert_eq!(
            dma.flag(2, 0, Event::TransferComplete),
            Err(Error::InvalidController)
        );
        assert_eq!(
            dma.flag(0, 8, Event::TransferComplete),
            Err(Error::InvalidStream)
        );
        assert_eq!(
            dma.clear_flag(2, 0, Event::TransferComplete),
            Err(Error::InvalidController)
        );
        assert_eq!(
            dma.clear_flag(0, 8, Event::TransferComplete),
            Err(Error::InvalidStream)
        );
    }
}
