// Digital core voltage presets (RTC_CNTL_REG.DIG_DBIAS_WAK)
pub const RTC_CNTL_DBIAS_1V10: u8 = 4;
pub const RTC_CNTL_DBIAS_1V25: u8 = 7;

pub const DIG_DBIAS_80M_160M: u8 = RTC_CNTL_DBIAS_1V10;
pub const DIG_DBIAS_240M: u8 = RTC_CNTL_DBIAS_1V25;

/// Digital core bias preset.
///
/// 80 and 160 MHz run at the normal bias; 240 MHz is only stable with the
/// raised one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigBias {
    Normal,
    High,
}

#[cfg(feature = "defmt")]
impl defmt::Format for DigBias {
    fn format(&self, f: defmt::Formatter) {
        match self {
            DigBias::Normal => defmt::write!(f, "1.10V"),
            DigBias::High => defmt::write!(f, "1.25V"),
        }
    }
}

impl DigBias {
    /// Raw DIG_DBIAS_WAK field value.
    pub const fn bits(self) -> u8 {
        match self {
            DigBias::Normal => DIG_DBIAS_80M_160M,
            DigBias::High => DIG_DBIAS_240M,
        }
    }

    pub const fn millivolts(self) -> u16 {
        match self {
            DigBias::Normal => 1100,
            DigBias::High => 1250,
        }
    }
}
