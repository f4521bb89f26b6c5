//! Clock configuration and runtime CPU frequency switching.

use core::convert::Infallible;

use super::{plan, ClockPlan, ClockPort, ClockState, CpuClock, FrequencyCommit};
use super::{SocClockSource, XtalClock};
use crate::APB_FREQ_HZ;
use crate::usart;

/// `(hz >> 12) & 0xffff` in both halves of the word, the layout the ROM
/// reads back from the APB frequency scratch register.
pub const fn apb_freq_word(hz: u32) -> u32 {
    let v = (hz >> 12) & 0xffff;
    v | (v << 16)
}

/// Written on every PLL switch. APB stays at 80 MHz whatever the CPU runs at.
pub const PLL_APB_FREQ_WORD: u32 = apb_freq_word(APB_FREQ_HZ);

/// Clock configuration
///
/// Defaults: 240 MHz CPU from a 40 MHz crystal, waiting for the slow clock
/// after falling back to the crystal.
#[non_exhaustive]
#[derive(Debug, Clone, Copy)]
pub struct ConfigBuilder {
    /// CPU clock applied by [`crate::init`]
    pub cpu_clock: CpuClock,
    /// Crystal frequency, also the PLL reference
    pub xtal: XtalClock,
    /// Settle flag passed along with every switch to the crystal
    pub xtal_settle: bool,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    pub const fn new() -> Self {
        Self {
            cpu_clock: CpuClock::max(),
            xtal: XtalClock::_40M,
            xtal_settle: true,
        }
    }

    pub const fn with_cpu_clock(mut self, cpu_clock: CpuClock) -> Self {
        self.cpu_clock = cpu_clock;
        self
    }

    pub const fn with_xtal(mut self, xtal: XtalClock) -> Self {
        self.xtal = xtal;
        self
    }

    pub const fn with_xtal_settle(mut self, settle: bool) -> Self {
        self.xtal_settle = settle;
        self
    }

    /// Validate the clock configuration at compile time.
    ///
    /// Panics with a descriptive message if the configuration is invalid.
    /// Use inside `const { }` blocks to get compile-time errors.
    pub const fn check(&self) {
        if let XtalClock::Other(mhz) = self.xtal {
            if mhz < 2 || mhz > 60 {
                ::core::panic!("XTAL frequency out of valid range (2-60 MHz)");
            }
        }
    }

    /// Validate and return a [`Config`]. Use in `const { }` blocks for compile-time checking.
    ///
    /// ```rust,ignore
    /// const { rcc::ConfigBuilder::new().with_cpu_clock(CpuClock::_160MHz).checked() }
    /// ```
    pub const fn checked(self) -> Config {
        self.check();
        Config(self)
    }
}

/// A validated clock configuration.
///
/// Can only be constructed via [`ConfigBuilder::checked()`].
#[derive(Debug, Clone, Copy)]
pub struct Config(pub(crate) ConfigBuilder);

impl Default for Config {
    fn default() -> Self {
        ConfigBuilder::new().checked()
    }
}

impl Config {
    pub const fn cpu_clock(&self) -> CpuClock {
        self.0.cpu_clock
    }

    pub const fn xtal(&self) -> XtalClock {
        self.0.xtal
    }
}

// =============================================================================
// Runtime switching
// =============================================================================

/// Owner of the CPU clock.
///
/// Holds the hardware port and the only [`ClockState`]; every frequency change
/// goes through `&mut self`, so callers sharing it across contexts must wrap it
/// in their own lock. No locking happens in here.
pub struct CpuClockControl<P: ClockPort, const CORES: usize = 1> {
    port: P,
    state: ClockState<CORES>,
    xtal: XtalClock,
    xtal_settle: bool,
}

impl<P: ClockPort, const CORES: usize> CpuClockControl<P, CORES> {
    /// `state` must describe what the hardware is running right now.
    pub fn new(port: P, state: ClockState<CORES>, config: &Config) -> Self {
        Self {
            port,
            state,
            xtal: config.0.xtal,
            xtal_settle: config.0.xtal_settle,
        }
    }

    pub fn state(&self) -> &ClockState<CORES> {
        &self.state
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn xtal(&self) -> XtalClock {
        self.xtal
    }

    /// Give back the port and the final state.
    pub fn release(self) -> (P, ClockState<CORES>) {
        (self.port, self.state)
    }

    /// Switch the CPU to `mhz`.
    ///
    /// Frequencies outside [`CpuClock::ALL`] are ignored: nothing is written
    /// and the caller is not told.
    pub fn set_cpu_frequency(&mut self, mhz: u32) {
        match plan::resolve(mhz) {
            Ok(plan) => self.apply(plan),
            Err(e) => debug!("rcc: ignoring unsupported cpu frequency {} MHz", e.mhz),
        }
    }

    pub fn set_cpu_clock(&mut self, cpu_clock: CpuClock) {
        self.apply(cpu_clock.plan());
    }

    /// Run the switch described by `plan`.
    ///
    /// Does nothing if the CPU already runs at `plan.target`. Otherwise, in
    /// this order: drain the console, fall back to the crystal, enable and
    /// configure the PLL, commit the new divider/bias/source, update every
    /// core's delay calibration, then wait one slow clock cycle.
    ///
    /// Blocks forever if the console never drains.
    pub fn apply(&mut self, plan: ClockPlan) {
        let target = plan.target.mhz();
        if self.state.cpu_mhz() == target {
            trace!("rcc: cpu already at {} MHz", target);
            return;
        }

        debug!(
            "rcc: cpu {} MHz -> {} MHz (pll {} MHz, bias {:?})",
            self.state.cpu_mhz(),
            target,
            plan.pll.mhz(),
            plan.bias
        );

        self.drain_console();

        // The PLL is about to be reprogrammed, run from the crystal meanwhile
        self.port.select_xtal(self.xtal, self.xtal_settle);
        self.port.enable_pll();
        self.port.configure_pll(self.xtal, plan.pll);
        self.port.commit_frequency(&FrequencyCommit::for_plan(&plan));
        self.state.record(target, SocClockSource::Pll);

        self.update_ticks_per_us(target);
        self.port.wait_slow_cycle();
    }

    /// Same value for every core, published in a single port call.
    fn update_ticks_per_us(&mut self, mhz: u32) {
        self.state.set_ticks_per_us(mhz);
        self.port.store_ticks_per_us(self.state.ticks_per_us());
    }

    fn drain_console(&mut self) {
        let port = &mut self.port;
        match nb::block!(poll_console_idle(port)) {
            Ok(()) => {}
            Err(never) => match never {},
        }
    }
}

/// One read of the console status through `port`.
pub(crate) fn poll_console_idle<P: ClockPort>(port: &mut P) -> nb::Result<(), Infallible> {
    usart::poll_idle(port.tx_status())
}
