//! Theme engine context object
//!
//! [`ThemeEngine`] owns the user's theme preference, accessibility flags and
//! color preset, resolves the displayed [`ColorScheme`] and pushes the
//! resulting side effects into a [`StyleScope`].
//!
//! Only one mode watcher is live at a time:
//! - `auto`: a scheduler interval re-evaluates the local hour
//! - `system`: a listener on the OS dark-mode signal
//!
//! Every watcher callback funnels into [`ThemeEngine::refresh`], which
//! recomputes from current state, so a callback that outlives its mode can
//! never apply a stale theme.

use crate::accessibility::AccessibilitySettings;
use crate::config::ThemeConfig;
use crate::error::Result;
use crate::persist::{self, PersistedTheme};
use crate::preference::{resolve_in, ColorScheme, ThemePreference};
use crate::presets::ColorPreset;
use crate::scope::{
    NullScope, StyleScope, DARK_CLASS, DARK_THEME_COLOR, LIGHT_THEME_COLOR, THEME_ATTRIBUTE,
    TRANSITION_CLASS,
};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use vitrine_core::sync::lock;
use vitrine_core::{
    CapabilityProvider, Clock, KeyValueStore, MemoryStore, Scheduler, Signal, Subscription,
    SystemCapabilities, SystemClock,
};

/// Point-in-time view of the engine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ThemeSnapshot {
    pub preference: ThemePreference,
    pub resolved: ColorScheme,
    pub accessibility: AccessibilitySettings,
    pub preset: ColorPreset,
    pub transitioning: bool,
}

struct EngineState {
    preference: ThemePreference,
    os_dark: bool,
    /// `None` until the first apply
    resolved: Option<ColorScheme>,
    accessibility: AccessibilitySettings,
    preset: ColorPreset,
    transitioning: bool,
    transition_epoch: u64,
    mode_watch: Option<Subscription>,
    transition_timer: Option<Subscription>,
}

struct Inner {
    config: ThemeConfig,
    store: Arc<dyn KeyValueStore>,
    caps: Arc<dyn CapabilityProvider>,
    clock: Arc<dyn Clock>,
    scheduler: Scheduler,
    scope: Arc<dyn StyleScope>,
    os_scheme: Signal<bool>,
    resolved_changed: Signal<ColorScheme>,
    accessibility_changed: Signal<AccessibilitySettings>,
    state: Mutex<EngineState>,
    disposed: AtomicBool,
}

/// Theme resolution engine
///
/// Cheap to clone; all clones share one engine.
#[derive(Clone)]
pub struct ThemeEngine {
    inner: Arc<Inner>,
}

/// Builder for [`ThemeEngine`]
///
/// Unset collaborators default to an in-memory store, the host's
/// capabilities and clock, a fresh scheduler, a scope that discards side
/// effects and a private OS signal.
#[derive(Default)]
pub struct ThemeEngineBuilder {
    config: Option<ThemeConfig>,
    store: Option<Arc<dyn KeyValueStore>>,
    caps: Option<Arc<dyn CapabilityProvider>>,
    clock: Option<Arc<dyn Clock>>,
    scheduler: Option<Scheduler>,
    scope: Option<Arc<dyn StyleScope>>,
    os_scheme: Option<Signal<bool>>,
}

impl ThemeEngineBuilder {
    pub fn config(mut self, config: ThemeConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn capabilities(mut self, caps: Arc<dyn CapabilityProvider>) -> Self {
        self.caps = Some(caps);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn scheduler(mut self, scheduler: Scheduler) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn scope(mut self, scope: Arc<dyn StyleScope>) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Signal the host emits on whenever the OS dark-mode preference changes
    pub fn system_scheme(mut self, signal: Signal<bool>) -> Self {
        self.os_scheme = Some(signal);
        self
    }

    /// Restore persisted state, apply it and start the mode watcher
    pub fn init(self) -> Result<ThemeEngine> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryStore::new()) as Arc<dyn KeyValueStore>);
        let caps = self
            .caps
            .unwrap_or_else(|| Arc::new(SystemCapabilities::new()) as Arc<dyn CapabilityProvider>);
        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(SystemClock) as Arc<dyn Clock>);
        let scope = self
            .scope
            .unwrap_or_else(|| Arc::new(NullScope) as Arc<dyn StyleScope>);

        let persisted = PersistedTheme::load(store.as_ref(), caps.as_ref());
        let os_dark = caps.prefers_dark();

        tracing::debug!(
            preference = %persisted.preference,
            preset = persisted.preset.id(),
            "ThemeEngine::init"
        );

        let inner = Arc::new(Inner {
            config,
            store,
            caps,
            clock,
            scheduler: self.scheduler.unwrap_or_default(),
            scope,
            os_scheme: self.os_scheme.unwrap_or_default(),
            resolved_changed: Signal::new(),
            accessibility_changed: Signal::new(),
            state: Mutex::new(EngineState {
                preference: persisted.preference,
                os_dark,
                resolved: None,
                accessibility: persisted.accessibility,
                preset: persisted.preset,
                transitioning: false,
                transition_epoch: 0,
                mode_watch: None,
                transition_timer: None,
            }),
            disposed: AtomicBool::new(false),
        });

        inner.apply_accessibility(persisted.accessibility);
        inner.apply_preset(persisted.preset);
        inner.wire_mode(persisted.preference);
        inner.refresh();

        Ok(ThemeEngine { inner })
    }
}

impl ThemeEngine {
    pub fn builder() -> ThemeEngineBuilder {
        ThemeEngineBuilder::default()
    }

    // ========== Preference ==========

    pub fn preference(&self) -> ThemePreference {
        lock(&self.inner.state).preference
    }

    /// Change the stored preference
    ///
    /// Persists the preference, swaps the mode watcher and re-resolves. The
    /// most recent call wins.
    pub fn set_preference(&self, preference: ThemePreference) {
        let inner = &self.inner;
        if inner.is_disposed() {
            tracing::warn!("set_preference on a disposed ThemeEngine");
            return;
        }

        let previous = {
            let mut state = lock(&inner.state);
            let previous = std::mem::replace(&mut state.preference, preference);
            if preference == ThemePreference::System {
                state.os_dark = inner.caps.prefers_dark();
            }
            previous
        };

        persist::write_key(inner.store.as_ref(), persist::THEME_KEY, preference.as_str());

        if previous != preference {
            tracing::debug!("ThemeEngine::set_preference - {} -> {}", previous, preference);
            inner.wire_mode(preference);
        }
        inner.refresh();
    }

    /// Parse and set a preference from its string form
    pub fn set_preference_str(&self, preference: &str) -> Result<()> {
        let preference = preference.parse::<ThemePreference>()?;
        self.set_preference(preference);
        Ok(())
    }

    /// All selectable preferences
    pub fn themes(&self) -> &'static [ThemePreference] {
        ThemePreference::all()
    }

    // ========== Resolution ==========

    pub fn resolved(&self) -> ColorScheme {
        lock(&self.inner.state).resolved.unwrap_or_default()
    }

    pub fn is_dark(&self) -> bool {
        self.resolved().is_dark()
    }

    pub fn is_light(&self) -> bool {
        !self.is_dark()
    }

    pub fn is_transitioning(&self) -> bool {
        lock(&self.inner.state).transitioning
    }

    /// Recompute the resolved theme from current state
    ///
    /// Side effects run only when the result differs from what is applied.
    pub fn refresh(&self) {
        self.inner.refresh();
    }

    // ========== Accessibility ==========

    pub fn accessibility(&self) -> AccessibilitySettings {
        lock(&self.inner.state).accessibility
    }

    pub fn toggle_high_contrast(&self) {
        let current = self.accessibility().high_contrast;
        self.set_high_contrast(!current);
    }

    pub fn set_high_contrast(&self, enabled: bool) {
        self.inner.update_accessibility(persist::HIGH_CONTRAST_KEY, enabled, |settings| {
            &mut settings.high_contrast
        });
    }

    pub fn toggle_reduce_motion(&self) {
        let current = self.accessibility().reduce_motion;
        self.set_reduce_motion(!current);
    }

    pub fn set_reduce_motion(&self, enabled: bool) {
        self.inner.update_accessibility(persist::REDUCE_MOTION_KEY, enabled, |settings| {
            &mut settings.reduce_motion
        });
    }

    // ========== Color presets ==========

    pub fn color_preset(&self) -> ColorPreset {
        lock(&self.inner.state).preset
    }

    pub fn presets(&self) -> &'static [ColorPreset] {
        ColorPreset::all()
    }

    /// Apply and persist a preset
    pub fn apply_color_preset(&self, preset: ColorPreset) {
        let inner = &self.inner;
        if inner.is_disposed() {
            return;
        }
        lock(&inner.state).preset = preset;
        persist::write_key(inner.store.as_ref(), persist::COLOR_PRESET_KEY, preset.id());
        inner.apply_preset(preset);
    }

    /// Apply a preset by id; unknown ids leave every setting untouched
    pub fn apply_color_preset_named(&self, name: &str) -> Result<ColorPreset> {
        let preset = name.parse::<ColorPreset>()?;
        self.apply_color_preset(preset);
        Ok(preset)
    }

    // ========== Observation ==========

    /// Called with the new scheme after each applied change
    pub fn subscribe_resolved<F>(&self, listener: F) -> Subscription
    where
        F: Fn(ColorScheme) + Send + Sync + 'static,
    {
        self.inner
            .resolved_changed
            .subscribe(move |scheme| listener(*scheme))
    }

    /// Called with the full settings after either flag changes
    pub fn subscribe_accessibility<F>(&self, listener: F) -> Subscription
    where
        F: Fn(AccessibilitySettings) + Send + Sync + 'static,
    {
        self.inner
            .accessibility_changed
            .subscribe(move |settings| listener(*settings))
    }

    pub fn snapshot(&self) -> ThemeSnapshot {
        let state = lock(&self.inner.state);
        ThemeSnapshot {
            preference: state.preference,
            resolved: state.resolved.unwrap_or_default(),
            accessibility: state.accessibility,
            preset: state.preset,
            transitioning: state.transitioning,
        }
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.inner.scheduler
    }

    /// The OS dark-mode signal this engine listens to
    pub fn system_scheme(&self) -> &Signal<bool> {
        &self.inner.os_scheme
    }

    pub fn config(&self) -> &ThemeConfig {
        &self.inner.config
    }

    // ========== Lifecycle ==========

    /// Cancel every timer and listener and remove the transition marker
    ///
    /// No callback fires after this returns. Idempotent.
    pub fn dispose(&self) {
        let inner = &self.inner;
        if inner.disposed.swap(true, Ordering::SeqCst) {
            return;
        }

        let (mode_watch, transition_timer) = {
            let mut state = lock(&inner.state);
            state.transitioning = false;
            (state.mode_watch.take(), state.transition_timer.take())
        };
        drop(mode_watch);
        drop(transition_timer);

        inner.scope.set_class(TRANSITION_CLASS, false);
        inner.resolved_changed.clear();
        inner.accessibility_changed.clear();
        tracing::debug!("ThemeEngine disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.is_disposed()
    }
}

impl fmt::Debug for ThemeEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeEngine")
            .field("snapshot", &self.snapshot())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

impl Inner {
    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    fn compute(&self, preference: ThemePreference, os_dark: bool) -> ColorScheme {
        resolve_in(
            preference,
            os_dark,
            self.clock.local_hour(),
            self.config.day_start_hour,
            self.config.night_start_hour,
        )
    }

    fn refresh(self: &Arc<Self>) {
        if self.is_disposed() {
            return;
        }

        let change = {
            let mut state = lock(&self.state);
            let next = self.compute(state.preference, state.os_dark);
            if state.resolved == Some(next) {
                None
            } else {
                let previous = state.resolved.replace(next);
                state.transitioning = true;
                state.transition_epoch += 1;
                Some((previous, next, state.transition_epoch))
            }
        };

        if let Some((previous, next, epoch)) = change {
            tracing::debug!("ThemeEngine - applying {} (was {:?})", next, previous);
            self.apply_scheme(next, epoch);
        }
    }

    fn apply_scheme(self: &Arc<Self>, scheme: ColorScheme, epoch: u64) {
        let scope = &self.scope;
        scope.set_class(TRANSITION_CLASS, true);
        scope.set_class(DARK_CLASS, scheme.is_dark());
        scope.set_attribute(THEME_ATTRIBUTE, scheme.as_str());
        scope.set_theme_color(if scheme.is_dark() {
            DARK_THEME_COLOR
        } else {
            LIGHT_THEME_COLOR
        });

        let weak: Weak<Inner> = Arc::downgrade(self);
        let timer = self.scheduler.timeout(self.config.transition(), move || {
            if let Some(inner) = weak.upgrade() {
                inner.finish_transition(epoch);
            }
        });
        let superseded = lock(&self.state).transition_timer.replace(timer);
        drop(superseded);

        self.resolved_changed.emit(&scheme);
    }

    fn finish_transition(&self, epoch: u64) {
        if self.is_disposed() {
            return;
        }
        {
            let mut state = lock(&self.state);
            if state.transition_epoch != epoch {
                return;
            }
            state.transitioning = false;
            state.transition_timer = None;
        }
        self.scope.set_class(TRANSITION_CLASS, false);
    }

    /// Replace the live mode watcher with the one `preference` needs
    fn wire_mode(self: &Arc<Self>, preference: ThemePreference) {
        let weak: Weak<Inner> = Arc::downgrade(self);
        let watch = match preference {
            ThemePreference::Auto => {
                tracing::debug!(
                    interval_ms = self.config.auto_check_interval_ms,
                    "ThemeEngine - watching the clock"
                );
                self.scheduler
                    .interval(self.config.auto_check_interval(), move || {
                        if let Some(inner) = weak.upgrade() {
                            inner.refresh();
                        }
                    })
            }
            ThemePreference::System => {
                tracing::debug!("ThemeEngine - watching the OS color scheme");
                self.os_scheme.subscribe(move |dark| {
                    if let Some(inner) = weak.upgrade() {
                        inner.on_os_scheme(*dark);
                    }
                })
            }
            ThemePreference::Light | ThemePreference::Dark => Subscription::empty(),
        };

        let previous = lock(&self.state).mode_watch.replace(watch);
        drop(previous);
    }

    fn on_os_scheme(self: &Arc<Self>, dark: bool) {
        if self.is_disposed() {
            return;
        }
        lock(&self.state).os_dark = dark;
        self.refresh();
    }

    fn update_accessibility(
        &self,
        key: &str,
        enabled: bool,
        field: impl FnOnce(&mut AccessibilitySettings) -> &mut bool,
    ) {
        if self.is_disposed() {
            return;
        }
        let (settings, changed) = {
            let mut state = lock(&self.state);
            let slot = field(&mut state.accessibility);
            let changed = *slot != enabled;
            *slot = enabled;
            (state.accessibility, changed)
        };

        persist::write_flag(self.store.as_ref(), key, enabled);
        self.apply_accessibility(settings);

        if changed {
            tracing::debug!(key, enabled, "ThemeEngine - accessibility changed");
            self.accessibility_changed.emit(&settings);
        }
    }

    fn apply_accessibility(&self, settings: AccessibilitySettings) {
        for (class, present) in settings.markers() {
            self.scope.set_class(class, present);
        }
    }

    fn apply_preset(&self, preset: ColorPreset) {
        for (name, value) in preset.palette().css_variables() {
            self.scope.set_variable(name, &value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::RecordingScope;
    use std::time::Duration;
    use vitrine_core::{FixedClock, StaticCapabilities};

    fn engine_with(store: Arc<MemoryStore>, hour: u32) -> (ThemeEngine, Arc<RecordingScope>) {
        let scope = Arc::new(RecordingScope::new());
        let engine = ThemeEngine::builder()
            .store(store)
            .capabilities(Arc::new(StaticCapabilities::default()))
            .clock(Arc::new(FixedClock::new(hour)))
            .scope(scope.clone())
            .init()
            .unwrap();
        (engine, scope)
    }

    #[test]
    fn test_init_applies_saved_theme() {
        let store = Arc::new(MemoryStore::with_entries([(persist::THEME_KEY, "dark")]));
        let (engine, scope) = engine_with(store, 12);

        assert_eq!(engine.preference(), ThemePreference::Dark);
        assert!(engine.is_dark());
        assert!(scope.has_class(DARK_CLASS));
        assert_eq!(scope.attribute(THEME_ATTRIBUTE).as_deref(), Some("dark"));
        assert_eq!(scope.theme_color().as_deref(), Some(DARK_THEME_COLOR));
        assert!(engine.is_transitioning());
    }

    #[test]
    fn test_transition_marker_clears_after_transition() {
        let (engine, scope) = engine_with(Arc::new(MemoryStore::new()), 12);
        let scheduler = engine.scheduler().clone();

        engine.set_preference(ThemePreference::Dark);
        scheduler.advance_by(Duration::from_millis(299));
        assert!(scope.has_class(TRANSITION_CLASS));
        scheduler.advance_by(Duration::from_millis(1));
        assert!(!scope.has_class(TRANSITION_CLASS));
        assert!(!engine.is_transitioning());
    }

    #[test]
    fn test_newer_transition_supersedes_older_clear() {
        let (engine, scope) = engine_with(Arc::new(MemoryStore::new()), 12);
        let scheduler = engine.scheduler().clone();
        scheduler.advance_by(Duration::from_millis(300));

        engine.set_preference(ThemePreference::Dark);
        scheduler.advance_by(Duration::from_millis(200));
        engine.set_preference(ThemePreference::Light);
        scheduler.advance_by(Duration::from_millis(200));
        assert!(scope.has_class(TRANSITION_CLASS));
        scheduler.advance_by(Duration::from_millis(100));
        assert!(!scope.has_class(TRANSITION_CLASS));
    }

    #[test]
    fn test_set_preference_persists_only_theme() {
        let store = Arc::new(MemoryStore::new());
        let (engine, _scope) = engine_with(store.clone(), 12);
        assert!(store.snapshot().is_empty());

        engine.set_preference(ThemePreference::Auto);
        let saved = store.snapshot();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved.get(persist::THEME_KEY).map(String::as_str), Some("auto"));
    }

    #[test]
    fn test_set_preference_str_rejects_garbage() {
        let (engine, _scope) = engine_with(Arc::new(MemoryStore::new()), 12);
        assert!(engine.set_preference_str("sepia").is_err());
        assert_eq!(engine.preference(), ThemePreference::System);
        engine.set_preference_str("Dark").unwrap();
        assert!(engine.is_dark());
    }
}
