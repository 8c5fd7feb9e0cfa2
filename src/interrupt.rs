//! DMA stream interrupt events and callback dispatch.
//!
//! Each stream latches up to five independent conditions in the shared
//! status registers. The 16 `DMAx_Streamy` vector entries are expected to
//! be trivial trampolines into [`Dma::on_interrupt`](crate::Dma::on_interrupt)
//! with their fixed `(controller, stream)` pair.

use core::cell::Cell;

use crate::{Error, Result};

/// Number of interrupt events per stream.
pub(crate) const EVENT_COUNT: usize = 5;

/// A per-stream interrupt condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// All data items were transferred.
    TransferComplete,
    /// Half of the data items were transferred.
    HalfTransfer,
    /// The stream faulted during the transfer.
    TransferError,
    /// An error occurred while the stream operated in direct mode.
    DirectModeError,
    /// FIFO underrun or overrun.
    FifoError,
}

impl Event {
    /// Dispatch priority. When one hardware interrupt carries several
    /// pending conditions, flags are cleared and callbacks run in this
    /// order. Half-transfer and transfer-complete can legitimately be
    /// pending together.
    pub(crate) const DISPATCH_ORDER: [Event; EVENT_COUNT] = [
        Event::TransferComplete,
        Event::HalfTransfer,
        Event::TransferError,
        Event::DirectModeError,
        Event::FifoError,
    ];

    /// Bit position of this event's flag for streams 0 and 4. The other
    /// streams add a group offset; see [`flag_position`](crate::stream::flag_position).
    pub(crate) const fn base_position(self) -> u32 {
        match self {
            Event::FifoError => 0,
            Event::DirectModeError => 2,
            Event::TransferError => 3,
            Event::HalfTransfer => 4,
            Event::TransferComplete => 5,
        }
    }

    const fn registry_index(self) -> usize {
        match self {
            Event::TransferComplete => 0,
            Event::HalfTransfer => 1,
            Event::TransferError => 2,
            Event::DirectModeError => 3,
            Event::FifoError => 4,
        }
    }
}

/// A registered stream callback.
pub type Callback<'a> = &'a dyn Fn();

/// Callback registry entries for one stream, one cell per event.
pub(crate) struct CallbackSlots<'a>([Cell<Option<Callback<'a>>>; EVENT_COUNT]);

impl<'a> CallbackSlots<'a> {
    const NONE: Cell<Option<Callback<'a>>> = Cell::new(None);
    pub(crate) const EMPTY: Self = Self([Self::NONE; EVENT_COUNT]);

    fn get(&self, event: Event) -> Option<Callback<'a>> {
        self.0[event.registry_index()].get()
    }

    fn set(&self, event: Event, callback: Option<Callback<'a>>) {
        self.0[event.registry_index()].set(callback);
    }
}

impl<'a> crate::Dma<'a> {
    /// Register `callback` for one interrupt condition on one stream.
    ///
    /// The last registration for a given `(controller, stream, event)`
    /// triple wins. `None` removes the entry; a stream interrupt without a
    /// registered callback still clears the flag.
    pub fn set_callback(
        &self,
        controller: u8,
        stream: u8,
        event: Event,
        callback: Option<Callback<'a>>,
    ) -> Result<()> {
        self.registers(controller)?;
        if usize::from(stream) >= crate::STREAM_COUNT {
            return Err(Error::InvalidStream);
        }
        crate::interrupt_free(|| self.slots(controller, stream).set(event, callback));
        Ok(())
    }

    /// Service one stream interrupt.
    ///
    /// Call this from the `DMAx_Streamy` vector entry with that entry's
    /// fixed `(controller, stream)` pair. Every condition is checked in
    /// dispatch order regardless of earlier results; each pending flag is
    /// cleared first, then its callback (if any) runs.
    pub fn on_interrupt(&self, controller: u8, stream: u8) {
        // Ids come from the vector trampolines, and interrupt context has
        // nowhere to report an error. A bad id is a quiet no-op.
        if self.registers(controller).is_err() || usize::from(stream) >= crate::STREAM_COUNT {
            return;
        }
        for event in Event::DISPATCH_ORDER {
            if let Ok(true) = self.flag(controller, stream, event) {
                let _ = self.clear_flag(controller, stream, event);
                if let Some(callback) = self.slots(controller, stream).get(event) {
                    callback();
                }
            }
        }
    }
}
