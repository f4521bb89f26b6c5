//! Power management: digital bias presets and the domain callback registry.

pub mod domain;
pub mod dvfs;
