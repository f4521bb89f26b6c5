//! Reset and clock control: switching the CPU between the crystal and the PLL.

mod clock;
pub use clock::*;

mod plan;
pub use plan::{resolve, ClockPlan, UnsupportedFrequency};

mod clock_config;
pub use clock_config::{apb_freq_word, Config, ConfigBuilder, CpuClockControl, PLL_APB_FREQ_WORD};

mod clock_ll;
pub use clock_ll::{Esp32ClockPort, RtcDriver};

use crate::pmu::dvfs::DigBias;
use crate::usart::TxStatus;

/// Register values committed once the PLL is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrequencyCommit {
    /// DPORT_CPU_PER_CONF.CPUPERIOD_SEL
    pub period: CpuPeriod,
    /// RTC_CNTL_REG.DIG_DBIAS_WAK
    pub bias: DigBias,
    /// RTC_CNTL_CLK_CONF.SOC_CLK_SEL
    pub source: SocClockSource,
    /// RTC_CNTL_STORE5 (APB frequency)
    pub apb_freq_word: u32,
}

impl FrequencyCommit {
    pub const fn for_plan(plan: &ClockPlan) -> Self {
        Self {
            period: plan.period,
            bias: plan.bias,
            source: SocClockSource::Pll,
            apb_freq_word: PLL_APB_FREQ_WORD,
        }
    }
}

/// Hardware operations the CPU clock switch is built from.
///
/// [`CpuClockControl`] calls these in a fixed order; implementations do one
/// thing each and never fail. [`Esp32ClockPort`] is the register-level
/// implementation.
pub trait ClockPort {
    /// Current console transmitter status.
    fn tx_status(&mut self) -> TxStatus;

    /// Run the CPU from the crystal. `settle` asks the driver to wait for the
    /// slow clock before returning.
    fn select_xtal(&mut self, xtal: XtalClock, settle: bool);

    /// Power up the PLL. No frequency is selected yet.
    fn enable_pll(&mut self);

    /// Lock the PLL to `pll`, using `xtal` as reference.
    fn configure_pll(&mut self, xtal: XtalClock, pll: PllClock);

    /// Write the CPU divider, bias, clock source and APB frequency.
    fn commit_frequency(&mut self, commit: &FrequencyCommit);

    /// Publish ticks-per-microsecond, one value per core, in one step.
    fn store_ticks_per_us(&mut self, ticks: &[u32]);

    /// Block for one RTC slow clock period.
    fn wait_slow_cycle(&mut self);
}

/// Boot-time CPU clock setup.
///
/// Runs the switch in a critical section so no interrupt handler observes a
/// half-updated delay calibration.
pub(crate) fn init<P: ClockPort, const CORES: usize>(
    control: &mut CpuClockControl<P, CORES>,
    config: &Config,
) {
    critical_section::with(|_cs| control.set_cpu_clock(config.cpu_clock()));
    info!("rcc: cpu clock {} MHz", control.state().cpu_mhz());
}

#[cfg(test)]
mod tests;
