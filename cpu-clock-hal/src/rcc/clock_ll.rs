//! Register-level [`ClockPort`] for the ESP32.
//!
//! The digital side (CPU divider, SoC clock mux, bias, scratch registers,
//! ROM delay calibration) is written here directly. The analog side (BBPLL
//! programming over the internal I2C bus, slow clock calibration) is left to
//! an [`RtcDriver`].

use embassy_hal_internal::{into_ref, PeripheralRef};

use super::{ClockPort, FrequencyCommit, PllClock, SocClockSource, XtalClock};
use crate::_generated::ROM_TICKS_PER_US;
use crate::pac;
use crate::peripherals::CPU_CLOCK;
use crate::usart::{TxStatus, Uart};
use crate::Peripheral;

/// Analog and RTC routines the clock switch relies on.
///
/// These are usually thin wrappers around ROM functions or an existing RTC
/// driver.
pub trait RtcDriver {
    /// Switch the SoC clock to the crystal at `xtal_mhz`, CPU divider 1.
    fn update_to_xtal(&mut self, xtal_mhz: u32, settle: bool);

    /// Power up the BBPLL.
    fn bbpll_enable(&mut self);

    /// Program the BBPLL dividers for `pll` from `xtal`, and wait for lock.
    fn bbpll_configure(&mut self, xtal: XtalClock, pll: PllClock);

    /// Block for one RTC slow clock period.
    fn wait_for_slow_cycle(&mut self);

    /// CPU frequency the bootloader left the chip at.
    fn cpu_freq_mhz(&self) -> u32;
}

/// ESP32 clock port: MMIO for the digital registers, `R` for the analog ones.
pub struct Esp32ClockPort<'d, R: RtcDriver> {
    _clock: PeripheralRef<'d, CPU_CLOCK>,
    rtc: R,
    console: Uart,
}

impl<'d, R: RtcDriver> Esp32ClockPort<'d, R> {
    pub fn new(clock: impl Peripheral<P = CPU_CLOCK> + 'd, rtc: R, console: Uart) -> Self {
        into_ref!(clock);

        Self {
            _clock: clock,
            rtc,
            console,
        }
    }

    pub fn rtc(&self) -> &R {
        &self.rtc
    }

    pub fn console(&self) -> Uart {
        self.console
    }

    /// SoC clock source as currently selected in hardware.
    pub fn soc_clock_source(&self) -> SocClockSource {
        let rtc_cntl = unsafe { &*pac::RTC_CNTL::ptr() };
        SocClockSource::from_bits(rtc_cntl.clk_conf().read().soc_clk_sel().bits())
    }
}

impl<R: RtcDriver> ClockPort for Esp32ClockPort<'_, R> {
    fn tx_status(&mut self) -> TxStatus {
        self.console.tx_status()
    }

    fn select_xtal(&mut self, xtal: XtalClock, settle: bool) {
        self.rtc.update_to_xtal(xtal.mhz(), settle);
    }

    fn enable_pll(&mut self) {
        self.rtc.bbpll_enable();
    }

    fn configure_pll(&mut self, xtal: XtalClock, pll: PllClock) {
        self.rtc.bbpll_configure(xtal, pll);
    }

    fn commit_frequency(&mut self, commit: &FrequencyCommit) {
        trace!(
            "rcc: per_conf={} dbias={} soc_clk_sel={} store5={:#x}",
            commit.period.bits(),
            commit.bias.bits(),
            commit.source.bits(),
            commit.apb_freq_word
        );

        let dport = unsafe { &*pac::DPORT::ptr() };
        let rtc_cntl = unsafe { &*pac::RTC_CNTL::ptr() };

        dport
            .cpu_per_conf()
            .write(|w| unsafe { w.cpuperiod_sel().bits(commit.period.bits()) });
        rtc_cntl
            .reg()
            .modify(|_, w| unsafe { w.dig_dbias_wak().bits(commit.bias.bits()) });
        rtc_cntl
            .clk_conf()
            .modify(|_, w| unsafe { w.soc_clk_sel().bits(commit.source.bits()) });
        rtc_cntl
            .store5()
            .modify(|_, w| unsafe { w.data().bits(commit.apb_freq_word) });
    }

    /// Scale factors read by `ets_delay_us`, one ROM global per core.
    fn store_ticks_per_us(&mut self, ticks: &[u32]) {
        for (&address, &value) in ROM_TICKS_PER_US.iter().zip(ticks) {
            unsafe { (address as *mut u32).write_volatile(value) };
        }
    }

    fn wait_slow_cycle(&mut self) {
        self.rtc.wait_for_slow_cycle();
    }
}
