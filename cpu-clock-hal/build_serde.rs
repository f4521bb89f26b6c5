use serde::{Deserialize, Serialize};

// ---------- clock.yaml ----------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClockData {
    pub cores: usize,
    pub apb_freq_hz: u32,
    pub rom_ticks_per_us: Vec<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub peripherals: Vec<String>,
}
