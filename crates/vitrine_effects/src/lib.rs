//! Vitrine Effects Controller
//!
//! Decides how much decorative rendering (particles, ambient motion) the
//! device can afford, expressed as an integer effects budget.
//!
//! - **Baseline**: a tier from device class, memory and core count, capped
//!   under reduce-motion
//! - **Feedback**: a frame-rate meter steps the budget down while the device
//!   struggles; the budget never climbs back within a session
//! - **Lifecycle**: hidden surfaces drop to a minimal budget; becoming
//!   visible again restarts from the baseline
//!
//! ```rust
//! use std::sync::Arc;
//! use vitrine_core::StaticCapabilities;
//! use vitrine_effects::{EffectsConfig, EffectsController};
//!
//! let caps = Arc::new(StaticCapabilities::desktop().with_mobile(true));
//! let controller = EffectsController::new(EffectsConfig::default(), caps, false).unwrap();
//! assert_eq!(controller.budget(), 30);
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod fps;
pub mod particles;
pub mod tier;

pub use config::EffectsConfig;
pub use controller::{EffectsController, EffectsMode, EffectsSnapshot};
pub use error::EffectsError;
pub use fps::FpsMeter;
pub use particles::{ParticleOptions, ResponsiveRule};
pub use tier::{Baseline, PerformanceTier};
