//! Vitrine Theme Engine
//!
//! Reconciles the user's theme preference, the OS dark-mode signal and the
//! wall clock into one displayed appearance.
//!
//! # Overview
//!
//! - **Preferences**: `light`, `dark`, `auto` (by hour of day) and `system`
//!   (mirror the OS), resolved by the pure [`resolve`] function
//! - **Side effects**: marker classes, the `data-theme` attribute and the
//!   chrome color are pushed into a host [`StyleScope`]
//! - **Accessibility**: high-contrast and reduce-motion flags, defaulting to
//!   the OS preference until the user sets them
//! - **Color presets**: five brand palettes exposed as CSS variables
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use vitrine_core::{FixedClock, MemoryStore, StaticCapabilities};
//! use vitrine_theme::{ThemeEngine, ThemePreference};
//!
//! let engine = ThemeEngine::builder()
//!     .store(Arc::new(MemoryStore::new()))
//!     .capabilities(Arc::new(StaticCapabilities::default()))
//!     .clock(Arc::new(FixedClock::new(22)))
//!     .init()
//!     .unwrap();
//!
//! engine.set_preference(ThemePreference::Auto);
//! assert!(engine.is_dark());
//! ```

pub mod accessibility;
pub mod config;
pub mod engine;
pub mod error;
pub mod persist;
pub mod preference;
pub mod presets;
pub mod scope;

#[cfg(feature = "watcher")]
pub mod watcher;

pub use accessibility::AccessibilitySettings;
pub use config::ThemeConfig;
pub use engine::{ThemeEngine, ThemeEngineBuilder, ThemeSnapshot};
pub use error::ThemeError;
pub use persist::PersistedTheme;
pub use preference::{resolve, resolve_in, ColorScheme, ThemePreference};
pub use presets::{ColorPreset, PresetPalette};
pub use scope::{NullScope, RecordingScope, StyleScope};

#[cfg(feature = "watcher")]
pub use watcher::SchemeWatcher;
