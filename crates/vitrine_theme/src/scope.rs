//! Style scope: where theme side effects land
//!
//! The engine never renders anything itself. It pushes marker classes,
//! attributes, CSS custom properties and the browser chrome color into a
//! [`StyleScope`] owned by the host.

use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Mutex;
use vitrine_core::sync::lock;

/// Marker class present while a theme transition is running
pub const TRANSITION_CLASS: &str = "theme-transitioning";
/// Marker class present while the dark theme is displayed
pub const DARK_CLASS: &str = "dark";
/// Attribute carrying the resolved theme (`dark` / `light`)
pub const THEME_ATTRIBUTE: &str = "data-theme";
/// Chrome color while dark
pub const DARK_THEME_COLOR: &str = "#1E293B";
/// Chrome color while light
pub const LIGHT_THEME_COLOR: &str = "#FFFFFF";

/// Host surface receiving theme side effects
///
/// Implementations must be idempotent: adding a present class or setting a
/// variable to its current value is a no-op.
pub trait StyleScope: Send + Sync {
    fn set_class(&self, class: &str, present: bool);

    fn set_attribute(&self, name: &str, value: &str);

    fn set_variable(&self, name: &str, value: &str);

    /// Browser chrome / status bar color
    fn set_theme_color(&self, color: &str);
}

/// Scope that discards every side effect
#[derive(Debug, Default, Clone, Copy)]
pub struct NullScope;

impl StyleScope for NullScope {
    fn set_class(&self, _class: &str, _present: bool) {}
    fn set_attribute(&self, _name: &str, _value: &str) {}
    fn set_variable(&self, _name: &str, _value: &str) {}
    fn set_theme_color(&self, _color: &str) {}
}

#[derive(Debug, Default)]
struct Recorded {
    classes: FxHashSet<String>,
    attributes: FxHashMap<String, String>,
    variables: FxHashMap<String, String>,
    theme_color: Option<String>,
    class_additions: FxHashMap<String, usize>,
}

/// In-memory scope that keeps the current state and counts class additions
#[derive(Debug, Default)]
pub struct RecordingScope {
    state: Mutex<Recorded>,
}

impl RecordingScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_class(&self, class: &str) -> bool {
        lock(&self.state).classes.contains(class)
    }

    /// Sorted list of present classes
    pub fn classes(&self) -> Vec<String> {
        let mut classes: Vec<String> = lock(&self.state).classes.iter().cloned().collect();
        classes.sort();
        classes
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        lock(&self.state).attributes.get(name).cloned()
    }

    pub fn variable(&self, name: &str) -> Option<String> {
        lock(&self.state).variables.get(name).cloned()
    }

    pub fn theme_color(&self) -> Option<String> {
        lock(&self.state).theme_color.clone()
    }

    /// How many times `class` went from absent to present
    pub fn additions(&self, class: &str) -> usize {
        lock(&self.state)
            .class_additions
            .get(class)
            .copied()
            .unwrap_or(0)
    }
}

impl StyleScope for RecordingScope {
    fn set_class(&self, class: &str, present: bool) {
        let mut state = lock(&self.state);
        if present {
            if state.classes.insert(class.to_string()) {
                *state.class_additions.entry(class.to_string()).or_insert(0) += 1;
            }
        } else {
            state.classes.remove(class);
        }
    }

    fn set_attribute(&self, name: &str, value: &str) {
        lock(&self.state)
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    fn set_variable(&self, name: &str, value: &str) {
        lock(&self.state)
            .variables
            .insert(name.to_string(), value.to_string());
    }

    fn set_theme_color(&self, color: &str) {
        lock(&self.state).theme_color = Some(color.to_string());
    }
}
