//! Effects controller configuration
//!
//! Deserialized from the `[effects]` table of `vitrine.toml`.

use crate::error::{EffectsError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct EffectsConfig {
    /// Budget for handheld devices
    #[serde(default = "default_mobile_budget")]
    pub mobile_budget: u32,
    /// Budget below `memory_threshold_gb`
    #[serde(default = "default_low_memory_budget")]
    pub low_memory_budget: u32,
    /// Budget below `core_threshold`
    #[serde(default = "default_low_core_budget")]
    pub low_core_budget: u32,
    /// Budget for capable desktops
    #[serde(default = "default_full_budget")]
    pub full_budget: u32,
    /// Ceiling while reduce-motion is on
    #[serde(default = "default_reduced_motion_cap")]
    pub reduced_motion_cap: u32,
    #[serde(default = "default_memory_threshold_gb")]
    pub memory_threshold_gb: f32,
    /// Memory assumed when the host does not report it
    #[serde(default = "default_unknown_memory_gb")]
    pub unknown_memory_gb: f32,
    #[serde(default = "default_core_threshold")]
    pub core_threshold: u32,
    /// Core count assumed when the host does not report it
    #[serde(default = "default_unknown_core_count")]
    pub unknown_core_count: u32,
    /// Sampled frame rate below which the budget steps down
    #[serde(default = "default_fatigue_fps")]
    pub fatigue_fps: u32,
    #[serde(default = "default_step")]
    pub step: u32,
    /// Lowest budget the feedback loop reaches
    #[serde(default = "default_floor")]
    pub floor: u32,
    /// Budget while the surface is hidden
    #[serde(default = "default_hidden_floor")]
    pub hidden_floor: u32,
    /// Frame-rate sampling window
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,
    /// Disable effects entirely when both the user and the OS ask for
    /// reduced motion
    #[serde(default = "default_true")]
    pub suppress_on_system_reduced_motion: bool,
}

fn default_mobile_budget() -> u32 {
    30
}

fn default_low_memory_budget() -> u32 {
    40
}

fn default_low_core_budget() -> u32 {
    60
}

fn default_full_budget() -> u32 {
    100
}

fn default_reduced_motion_cap() -> u32 {
    20
}

fn default_memory_threshold_gb() -> f32 {
    4.0
}

fn default_unknown_memory_gb() -> f32 {
    4.0
}

fn default_core_threshold() -> u32 {
    4
}

fn default_unknown_core_count() -> u32 {
    2
}

fn default_fatigue_fps() -> u32 {
    30
}

fn default_step() -> u32 {
    10
}

fn default_floor() -> u32 {
    20
}

fn default_hidden_floor() -> u32 {
    10
}

fn default_window_ms() -> u64 {
    1000
}

fn default_true() -> bool {
    true
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            mobile_budget: default_mobile_budget(),
            low_memory_budget: default_low_memory_budget(),
            low_core_budget: default_low_core_budget(),
            full_budget: default_full_budget(),
            reduced_motion_cap: default_reduced_motion_cap(),
            memory_threshold_gb: default_memory_threshold_gb(),
            unknown_memory_gb: default_unknown_memory_gb(),
            core_threshold: default_core_threshold(),
            unknown_core_count: default_unknown_core_count(),
            fatigue_fps: default_fatigue_fps(),
            step: default_step(),
            floor: default_floor(),
            hidden_floor: default_hidden_floor(),
            window_ms: default_window_ms(),
            suppress_on_system_reduced_motion: true,
        }
    }
}

impl EffectsConfig {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.window_ms == 0 {
            return Err(invalid("window_ms must be non-zero"));
        }
        if self.step == 0 {
            return Err(invalid("step must be non-zero"));
        }
        let tiers = [
            ("mobile_budget", self.mobile_budget),
            ("low_memory_budget", self.low_memory_budget),
            ("low_core_budget", self.low_core_budget),
            ("full_budget", self.full_budget),
        ];
        if let Some((name, budget)) = tiers.iter().find(|(_, budget)| *budget < self.floor) {
            return Err(invalid(&format!(
                "floor ({}) is above {} ({})",
                self.floor, name, budget
            )));
        }
        if self.hidden_floor > self.floor {
            return Err(invalid(&format!(
                "hidden_floor ({}) is above floor ({})",
                self.hidden_floor, self.floor
            )));
        }
        if self.reduced_motion_cap < self.floor {
            return Err(invalid(&format!(
                "reduced_motion_cap ({}) is below floor ({})",
                self.reduced_motion_cap, self.floor
            )));
        }
        Ok(())
    }
}

fn invalid(message: &str) -> EffectsError {
    EffectsError::InvalidConfig(message.to_string())
}
