//! SysTick timing service.
//!
//! Configures the 24-bit down-counter, converts a caller-supplied clock
//! frequency into tick counts, and provides a blocking millisecond delay
//! driven by the tick exception. One periodic callback may ride along on
//! the same exception.
//!
//! Documented in the Cortex-M Devices Generic User Guide, chapter 4.4.

use core::cell::Cell;
use core::sync::atomic::{AtomicU32, Ordering};

use crate::interrupt::Callback;
use crate::{ral, Error, Result};

/// Run the counter at the processor clock rate.
pub const PRESCALER_NONE: u32 = 1;
/// Run the counter at one eighth of the processor clock rate.
pub const PRESCALER_DIV8: u32 = 8;

/// The SysTick timing service.
///
/// Holds the runtime clock frequency, the interrupt-driven tick counter
/// behind [`wait_ms`](Self::wait_ms), and the optional periodic callback.
/// Route the `SysTick` exception into [`on_interrupt`](Self::on_interrupt).
pub struct SysTick<'a> {
    regs: ral::Static<ral::systick::RegisterBlock>,
    clock_hz: Cell<u32>,
    ticks: AtomicU32,
    callback: Cell<Option<Callback<'a>>>,
}

// Safety: OK to allocate the timing service in a static context. The tick
// counter is atomic; the callback cell is written behind masked interrupts
// and read from the tick exception only.
unsafe impl Sync for SysTick<'_> {}

impl<'a> SysTick<'a> {
    /// Create the timing service.
    ///
    /// Note that this can evaluate at compile time, so the service can
    /// live in a static reachable from the tick exception handler.
    ///
    /// # Safety
    ///
    /// Caller must make sure that `systick` points to the start of the
    /// SysTick register block (`0xE000_E010` on Cortex-M parts).
    pub const unsafe fn new(systick: *const ()) -> Self {
        Self {
            regs: ral::Static(systick.cast()),
            clock_hz: Cell::new(0),
            ticks: AtomicU32::new(0),
            callback: Cell::new(None),
        }
    }

    /// Select the clock prescaler and enable the tick exception.
    ///
    /// `prescaler` is the literal division factor, either
    /// [`PRESCALER_NONE`] or [`PRESCALER_DIV8`]. Anything else is
    /// [`Error::InvalidPrescaler`], and no register is written. `clock_hz`
    /// is the processor clock feeding the counter; it is stored for the
    /// delay conversion in [`wait_ms`](Self::wait_ms).
    pub fn init(&self, clock_hz: u32, prescaler: u32) -> Result<()> {
        let clksource = match prescaler {
            PRESCALER_NONE => 1,
            PRESCALER_DIV8 => 0,
            _ => return Err(Error::InvalidPrescaler),
        };
        let regs = self.regs;
        ral::modify_reg!(crate::ral::systick, regs, CSR, CLKSOURCE: clksource, TICKINT: 1);
        self.clock_hz.set(clock_hz);
        Ok(())
    }

    /// Set the counter reload value.
    ///
    /// The counter is 24 bits wide; a `reload` with any of the top 8 bits
    /// set is [`Error::InvalidReload`] and the register is left unchanged.
    pub fn set_start_value(&self, reload: u32) -> Result<()> {
        if reload >> 24 != 0 {
            return Err(Error::InvalidReload);
        }
        let regs = self.regs;
        ral::write_reg!(crate::ral::systick, regs, RVR, reload);
        Ok(())
    }

    /// Start the counter.
    pub fn start_count(&self) {
        let regs = self.regs;
        ral::modify_reg!(crate::ral::systick, regs, CSR, ENABLE: 1);
    }

    /// Stop the counter.
    pub fn stop_count(&self) {
        let regs = self.regs;
        ral::modify_reg!(crate::ral::systick, regs, CSR, ENABLE: 0);
    }

    /// Block for `delay_ms` milliseconds of counted tick exceptions.
    ///
    /// The timer must be running ([`Error::TimerOff`]), the reload value
    /// must be nonzero ([`Error::ZeroReload`]), and the tick exception must
    /// be enabled ([`Error::InterruptOff`]); these indicate a misconfigured
    /// timing service, not transient conditions. The wait busy-loops on the
    /// exception-driven tick counter and cannot be cancelled; a nonzero
    /// delay always waits for at least one full reload period.
    pub fn wait_ms(&self, delay_ms: u32) -> Result<()> {
        let regs = self.regs;
        if ral::read_reg!(crate::ral::systick, regs, CSR, ENABLE == 0) {
            return Err(Error::TimerOff);
        }
        let reload = ral::read_reg!(crate::ral::systick, regs, RVR, RELOAD);
        if reload == 0 {
            return Err(Error::ZeroReload);
        }
        if ral::read_reg!(crate::ral::systick, regs, CSR, TICKINT == 0) {
            return Err(Error::InterruptOff);
        }

        let clock = self.clock_hz.get();
        let effective = if ral::read_reg!(crate::ral::systick, regs, CSR, CLKSOURCE == 1) {
            clock
        } else {
            clock / 8
        };
        let required = required_ticks(delay_ms, effective, reload);

        self.ticks.store(0, Ordering::Relaxed);
        while u64::from(self.ticks.load(Ordering::Relaxed)) < required {
            core::hint::spin_loop();
        }
        Ok(())
    }

    /// Register the periodic callback invoked from the tick exception.
    ///
    /// The last registration wins; `None` disables invocation. The
    /// callback runs in exception context, so its duration is the caller's
    /// responsibility.
    pub fn set_callback(&self, callback: Option<Callback<'a>>) {
        crate::interrupt_free(|| self.callback.set(callback));
    }

    /// Current countdown value.
    pub fn current_count(&self) -> u32 {
        let regs = self.regs;
        ral::read_reg!(crate::ral::systick, regs, CVR, CURRENT)
    }

    /// Whether the counter reached zero since the last read.
    ///
    /// The hardware clears the flag on read, so two back-to-back calls
    /// never both return `true` for the same countdown.
    pub fn count_flag(&self) -> bool {
        let regs = self.regs;
        ral::read_reg!(crate::ral::systick, regs, CSR, COUNTFLAG == 1)
    }

    /// Tick exception entry point.
    ///
    /// Increments the tick counter unconditionally, then runs the
    /// registered periodic callback if there is one.
    pub fn on_interrupt(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
        if let Some(callback) = self.callback.get() {
            callback();
        }
    }

    #[cfg(test)]
    fn tick_count(&self) -> u32 {
        self.ticks.load(Ordering::Relaxed)
    }
}

/// Tick exceptions needed to cover `delay_ms` at `effective_hz`.
///
/// Integer division: effective clocks below 1 kHz truncate to zero ticks
/// per millisecond, and the minimum-one clamp turns any such delay into a
/// single reload period. Known edge case for slow clocks.
fn required_ticks(delay_ms: u32, effective_hz: u32, reload: u32) -> u64 {
    let ticks_per_ms = u64::from(effective_hz / 1_000);
    (u64::from(delay_ms) * ticks_per_ms / (u64::from(reload) + 1)).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fake_systick, read_raw, write_raw};
    use core::sync::atomic::AtomicBool;

    #[test]
    fn init_rejects_unsupported_prescalers() {
        let (tick, mem) = fake_systick();
        for prescaler in [0, 2, 7, 9, u32::MAX] {
            assert_eq!(tick.init(16_000_000, prescaler), Err(Error::InvalidPrescaler));
        }
        assert_eq!(read_raw(&mem.CSR), 0);
    }

    #[test]
    fn init_applies_clock_source_and_tick_interrupt() {
        let (tick, mem) = fake_systick();
        tick.init(16_000_000, PRESCALER_NONE).unwrap();
        assert_eq!(read_raw(&mem.CSR), 0b110); // CLKSOURCE | TICKINT

        let (tick, mem) = fake_systick();
        tick.init(16_000_000, PRESCALER_DIV8).unwrap();
        assert_eq!(read_raw(&mem.CSR), 0b010); // TICKINT only
    }

    #[test]
    fn reload_must_fit_in_24_bits() {
        let (tick, mem) = fake_systick();
        assert_eq!(tick.set_start_value(1 << 24), Err(Error::InvalidReload));
        assert_eq!(tick.set_start_value(u32::MAX), Err(Error::InvalidReload));
        assert_eq!(read_raw(&mem.RVR), 0);

        tick.set_start_value((1 << 24) - 1).unwrap();
        assert_eq!(read_raw(&mem.RVR), (1 << 24) - 1);
    }

    #[test]
    fn start_and_stop_toggle_the_enable_bit() {
        let (tick, mem) = fake_systick();
        tick.init(8_000_000, PRESCALER_NONE).unwrap();
        tick.start_count();
        assert_eq!(read_raw(&mem.CSR), 0b111);
        tick.stop_count();
        assert_eq!(read_raw(&mem.CSR), 0b110);
    }

    #[test]
    fn wait_preconditions_fail_in_order() {
        let (tick, mem) = fake_systick();
        tick.on_interrupt();
        tick.on_interrupt();

        // Counter disabled.
        assert_eq!(tick.wait_ms(1), Err(Error::TimerOff));
        // The failed wait did not touch the tick counter.
        assert_eq!(tick.tick_count(), 2);

        // Enabled, but zero reload. TICKINT deliberately left clear so the
        // reload check is shown to win.
        write_raw(&mem.CSR, 0b001);
        assert_eq!(tick.wait_ms(1), Err(Error::ZeroReload));

        // Enabled with a reload, exception still masked.
        tick.set_start_value(999).unwrap();
        assert_eq!(tick.wait_ms(1), Err(Error::InterruptOff));
    }

    #[test]
    fn required_ticks_math() {
        // 16 MHz, 1 kHz tick: one full second is 1000 reload periods.
        assert_eq!(required_ticks(1000, 16_000_000, 15_999), 1000);
        // Delay rounds down to whole reload periods.
        assert_eq!(required_ticks(3, 16_000_000, 31_999), 1);
        // Zero-millisecond delay still waits one period.
        assert_eq!(required_ticks(0, 16_000_000, 15_999), 1);
        // Sub-kHz effective clock truncates to zero ticks per millisecond;
        // the clamp keeps the wait at a single period. Known edge case.
        assert_eq!(required_ticks(100, 800, 99), 1);
    }

    #[test]
    fn wait_returns_once_enough_ticks_arrive() {
        let (tick, _mem) = fake_systick();
        tick.init(16_000, PRESCALER_NONE).unwrap(); // 16 ticks per ms
        tick.set_start_value(15).unwrap();
        tick.start_count();

        let done = AtomicBool::new(false);
        std::thread::scope(|s| {
            // Stand-in for the hardware tick exception.
            s.spawn(|| {
                while !done.load(Ordering::Relaxed) {
                    tick.on_interrupt();
                    std::thread::yield_now();
                }
            });
            assert_eq!(tick.wait_ms(4), Ok(()));
            done.store(true, Ordering::Relaxed);
        });
    }

    #[test]
    fn tick_callback_fires_on_each_interrupt() {
        let (tick, _mem) = fake_systick();
        let hits = Cell::new(0);
        let on_tick = || hits.set(hits.get() + 1);
        tick.set_callback(Some(&on_tick));
        tick.on_interrupt();
        tick.on_interrupt();
        assert_eq!(hits.get(), 2);

        tick.set_callback(None);
        tick.on_interrupt();
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn current_count_reads_the_counter_register() {
        let (tick, mem) = fake_systick();
        write_raw(&mem.CVR, 0x12_3456);
        assert_eq!(tick.current_count(), 0x12_3456);
    }

    #[test]
    fn count_flag_reflects_bit_16() {
        let (tick, mem) = fake_systick();
        assert!(!tick.count_flag());
        write_raw(&mem.CSR, 1 << 16);
        // In hardware this read also clears the flag; plain memory keeps it.
        assert!(tick.count_flag());
    }
}
