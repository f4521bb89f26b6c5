//! Clock types, constants, and switch state.

use crate::time::Hertz;

// =============================================================================
// Clock sources
// =============================================================================

/// CPU clock speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(clippy::enum_variant_names)]
pub enum CpuClock {
    /// 80MHz CPU clock
    _80MHz = 80,
    /// 160MHz CPU clock
    _160MHz = 160,
    /// 240MHz CPU clock
    _240MHz = 240,
}

impl Default for CpuClock {
    fn default() -> Self {
        Self::_80MHz
    }
}

impl CpuClock {
    /// Every supported CPU clock, lowest first.
    pub const ALL: [CpuClock; 3] = [CpuClock::_80MHz, CpuClock::_160MHz, CpuClock::_240MHz];

    /// Use the highest possible frequency.
    pub const fn max() -> Self {
        Self::_240MHz
    }

    pub const fn mhz(self) -> u32 {
        self as u32
    }

    pub const fn frequency(self) -> Hertz {
        Hertz::mhz(self.mhz())
    }

    /// Returns `None` for anything outside the supported set.
    pub const fn from_mhz(mhz: u32) -> Option<Self> {
        match mhz {
            80 => Some(Self::_80MHz),
            160 => Some(Self::_160MHz),
            240 => Some(Self::_240MHz),
            _ => None,
        }
    }
}

/// XTAL clock speed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum XtalClock {
    /// 26MHz XTAL clock
    _26M,
    /// 40MHz XTAL clock
    _40M,
    /// Other XTAL clock, in MHz
    Other(u32),
}

impl Default for XtalClock {
    fn default() -> Self {
        Self::_40M
    }
}

impl XtalClock {
    pub const fn mhz(self) -> u32 {
        match self {
            Self::_26M => 26,
            Self::_40M => 40,
            Self::Other(mhz) => mhz,
        }
    }

    pub const fn frequency(self) -> Hertz {
        Hertz::mhz(self.mhz())
    }
}

/// BBPLL output frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PllClock {
    /// 320MHz PLL clock
    _320M,
    /// 480MHz PLL clock
    _480M,
}

impl PllClock {
    pub const fn mhz(self) -> u32 {
        match self {
            Self::_320M => 320,
            Self::_480M => 480,
        }
    }

    pub const fn frequency(self) -> Hertz {
        Hertz::mhz(self.mhz())
    }
}

/// RTC_CNTL_CLK_CONF.SOC_CLK_SEL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum SocClockSource {
    Xtal = 0,
    Pll = 1,
    Rc8M = 2,
    Apll = 3,
}

impl SocClockSource {
    pub const fn bits(self) -> u8 {
        self as u8
    }

    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Self::Xtal,
            1 => Self::Pll,
            2 => Self::Rc8M,
            _ => Self::Apll,
        }
    }
}

/// DPORT_CPU_PER_CONF.CPUPERIOD_SEL
///
/// Selects the CPU divider from the PLL. 80 and 160 MHz both run from the
/// 320 MHz PLL with different codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum CpuPeriod {
    Sel80 = 0,
    Sel160 = 1,
    Sel240 = 2,
}

impl CpuPeriod {
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

// =============================================================================
// Switch state
// =============================================================================

/// CPU clock state owned by [`CpuClockControl`](super::CpuClockControl).
///
/// Holds the recorded CPU frequency, where it comes from, and the
/// ticks-per-microsecond scale used by ROM delay loops, one value per core.
/// All per-core values are written together and always agree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockState<const CORES: usize = 1> {
    cpu_mhz: u32,
    source: SocClockSource,
    ticks_per_us: [u32; CORES],
}

impl<const CORES: usize> ClockState<CORES> {
    /// State for a CPU currently running at `cpu_mhz` from `source`.
    pub const fn new(cpu_mhz: u32, source: SocClockSource) -> Self {
        Self {
            cpu_mhz,
            source,
            ticks_per_us: [cpu_mhz; CORES],
        }
    }

    pub const fn cpu_mhz(&self) -> u32 {
        self.cpu_mhz
    }

    pub const fn cpu_frequency(&self) -> Hertz {
        Hertz::mhz(self.cpu_mhz)
    }

    pub const fn source(&self) -> SocClockSource {
        self.source
    }

    pub const fn ticks_per_us(&self) -> &[u32; CORES] {
        &self.ticks_per_us
    }

    pub(crate) fn record(&mut self, cpu_mhz: u32, source: SocClockSource) {
        self.cpu_mhz = cpu_mhz;
        self.source = source;
    }

    pub(crate) fn set_ticks_per_us(&mut self, ticks: u32) {
        self.ticks_per_us = [ticks; CORES];
    }
}
