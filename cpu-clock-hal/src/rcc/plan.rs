//! CPU frequency plans.
//!
//! Maps a requested CPU frequency onto the PLL rate, digital bias and
//! divider code that produce it. The mapping is a fixed table; nothing here
//! touches hardware.

use super::{CpuClock, CpuPeriod, PllClock};
use crate::pmu::dvfs::DigBias;

/// Hardware settings for one CPU frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockPlan {
    /// CPU frequency after the switch
    pub target: CpuClock,
    /// BBPLL frequency feeding the CPU divider
    pub pll: PllClock,
    /// Digital core bias while running at `target`
    pub bias: DigBias,
    /// CPU divider code
    pub period: CpuPeriod,
}

/// The requested frequency is not one of [`CpuClock::ALL`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnsupportedFrequency {
    pub mhz: u32,
}

impl CpuClock {
    /// Plan for switching the CPU to this frequency.
    pub const fn plan(self) -> ClockPlan {
        match self {
            // 320 / 4
            CpuClock::_80MHz => ClockPlan {
                target: self,
                pll: PllClock::_320M,
                bias: DigBias::Normal,
                period: CpuPeriod::Sel80,
            },
            // 320 / 2
            CpuClock::_160MHz => ClockPlan {
                target: self,
                pll: PllClock::_320M,
                bias: DigBias::Normal,
                period: CpuPeriod::Sel160,
            },
            // 480 / 2, needs the raised bias
            CpuClock::_240MHz => ClockPlan {
                target: self,
                pll: PllClock::_480M,
                bias: DigBias::High,
                period: CpuPeriod::Sel240,
            },
        }
    }
}

impl TryFrom<u32> for CpuClock {
    type Error = UnsupportedFrequency;

    fn try_from(mhz: u32) -> Result<Self, Self::Error> {
        CpuClock::from_mhz(mhz).ok_or(UnsupportedFrequency { mhz })
    }
}

/// Resolve a raw CPU frequency in MHz into a [`ClockPlan`].
pub fn resolve(mhz: u32) -> Result<ClockPlan, UnsupportedFrequency> {
    CpuClock::try_from(mhz).map(CpuClock::plan)
}
