//! Baseline budget from device capabilities
//!
//! The first matching tier wins: handheld, then low memory, then few cores,
//! then full. Unknown memory and core counts are replaced by the configured
//! assumptions before classification.

use crate::config::EffectsConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use vitrine_core::CapabilityProvider;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PerformanceTier {
    Mobile,
    LowMemory,
    LowCore,
    Full,
}

impl PerformanceTier {
    pub fn classify(config: &EffectsConfig, caps: &dyn CapabilityProvider) -> Self {
        let memory = caps.device_memory().unwrap_or(config.unknown_memory_gb);
        let cores = caps.core_count().unwrap_or(config.unknown_core_count);

        if caps.is_mobile() {
            Self::Mobile
        } else if memory < config.memory_threshold_gb {
            Self::LowMemory
        } else if cores < config.core_threshold {
            Self::LowCore
        } else {
            Self::Full
        }
    }

    /// Ceiling for this tier
    pub fn budget(self, config: &EffectsConfig) -> u32 {
        match self {
            Self::Mobile => config.mobile_budget,
            Self::LowMemory => config.low_memory_budget,
            Self::LowCore => config.low_core_budget,
            Self::Full => config.full_budget,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mobile => "mobile",
            Self::LowMemory => "low-memory",
            Self::LowCore => "low-core",
            Self::Full => "full",
        }
    }
}

impl fmt::Display for PerformanceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Starting point of a session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Baseline {
    pub tier: PerformanceTier,
    /// Tier budget, capped when reduce-motion is on
    pub budget: u32,
    pub reduce_motion: bool,
}

impl Baseline {
    pub fn compute(
        config: &EffectsConfig,
        caps: &dyn CapabilityProvider,
        reduce_motion: bool,
    ) -> Self {
        let tier = PerformanceTier::classify(config, caps);
        let mut budget = tier.budget(config);
        if reduce_motion {
            budget = budget.min(config.reduced_motion_cap);
        }
        Self {
            tier,
            budget,
            reduce_motion,
        }
    }
}
