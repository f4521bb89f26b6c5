#![cfg_attr(not(test), no_std)]
#![doc = include_str!("../README.md")]
#![allow(unsafe_op_in_unsafe_fn)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod pmu;
pub mod rcc;
pub mod time;
pub mod usart;

// Reexports
pub use embassy_hal_internal::{into_ref, Peripheral, PeripheralRef};
#[cfg(feature = "unstable-pac")]
pub use esp32 as pac;
#[cfg(not(feature = "unstable-pac"))]
pub(crate) use esp32 as pac;

use rcc::{ClockState, CpuClockControl, Esp32ClockPort, RtcDriver};

/// Cores whose ticks-per-microsecond value is kept in step with the CPU clock.
pub const ACTIVE_CORES: usize = if cfg!(feature = "smp") { CORE_COUNT } else { 1 };

/// HAL configuration
pub mod config {
    use crate::{rcc, usart};

    /// HAL configuration passed when initializing.
    #[non_exhaustive]
    pub struct Config {
        pub rcc: rcc::Config,
        /// UART drained before every clock switch
        pub console: usart::Uart,
    }

    impl Default for Config {
        fn default() -> Self {
            Self {
                rcc: rcc::Config::default(),
                console: usart::Uart::Uart0,
            }
        }
    }
}
pub use config::Config;

/// Take ownership of the CPU clock and switch it to `config.rcc`.
///
/// `rtc` supplies the analog routines and the frequency the bootloader left
/// the CPU at. Returns the [`CpuClockControl`] every later frequency change
/// must go through.
///
/// This should only be called once at startup, otherwise it panics.
pub fn init<R: RtcDriver>(
    config: Config,
    rtc: R,
) -> CpuClockControl<Esp32ClockPort<'static, R>, ACTIVE_CORES> {
    // Do this first, so that it panics if user is calling `init` a second time
    // before doing anything important.
    let p = Peripherals::take();

    let boot_mhz = rtc.cpu_freq_mhz();
    let port = Esp32ClockPort::new(p.CPU_CLOCK, rtc, config.console);
    let state = ClockState::new(boot_mhz, port.soc_clock_source());
    debug!("boot cpu clock {} MHz", boot_mhz);

    let mut clocks = CpuClockControl::new(port, state, &config.rcc);
    rcc::init(&mut clocks, &config.rcc);
    clocks
}

pub(crate) mod _generated {
    #![allow(dead_code)]
    #![allow(unused_imports)]
    #![allow(non_snake_case)]
    #![allow(missing_docs)]
    #![allow(clippy::all)]

    include!(concat!(env!("OUT_DIR"), "/_generated.rs"));
}

pub use _generated::{peripherals, Peripherals};
pub use _generated::{APB_FREQ_HZ, CORE_COUNT};
