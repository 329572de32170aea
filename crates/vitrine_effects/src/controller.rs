//! Effects budget controller
//!
//! Starts each session at the capability [`Baseline`] and then only walks
//! the budget down while sampled frame rates stay below the fatigue
//! threshold. The budget never climbs back on its own; only a
//! re-initialization (surface shown after being hidden, reduce-motion
//! changed, explicit call) restores the baseline. The OS reduced-motion
//! preference is read once, when the controller is built.

use crate::config::EffectsConfig;
use crate::error::Result;
use crate::fps::FpsMeter;
use crate::particles::ParticleOptions;
use crate::tier::Baseline;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use vitrine_core::sync::lock;
use vitrine_core::{
    CapabilityProvider, FrameTick, Signal, Subscription, SubscriptionSet, Visibility,
};
use vitrine_theme::ThemeEngine;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectsMode {
    /// Visible and adapting to the frame rate
    Active,
    /// Surface hidden; minimal budget, frames ignored
    Hidden,
    /// User and OS both asked for reduced motion; nothing is rendered
    Disabled,
}

impl fmt::Display for EffectsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Active => "active",
            Self::Hidden => "hidden",
            Self::Disabled => "disabled",
        })
    }
}

/// Point-in-time view of the controller
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectsSnapshot {
    pub mode: EffectsMode,
    pub budget: u32,
    pub baseline: Baseline,
    pub last_fps: Option<u32>,
    pub dark: bool,
}

impl EffectsSnapshot {
    /// Particle options for the current budget; `None` while disabled
    pub fn particle_options(&self) -> Option<ParticleOptions> {
        match self.mode {
            EffectsMode::Disabled => None,
            _ => Some(ParticleOptions::derive(
                self.budget,
                self.dark,
                self.baseline.reduce_motion,
            )),
        }
    }
}

struct ControllerState {
    mode: EffectsMode,
    budget: u32,
    baseline: Baseline,
    reduce_motion: bool,
    dark: bool,
    meter: FpsMeter,
}

impl ControllerState {
    fn snapshot(&self) -> EffectsSnapshot {
        EffectsSnapshot {
            mode: self.mode,
            budget: self.budget,
            baseline: self.baseline,
            last_fps: self.meter.last_sample(),
            dark: self.dark,
        }
    }
}

struct Inner {
    config: EffectsConfig,
    caps: Arc<dyn CapabilityProvider>,
    /// OS reduced-motion preference, read once at construction
    system_reduced_motion: bool,
    state: Mutex<ControllerState>,
    changed: Signal<EffectsSnapshot>,
    subscriptions: Mutex<SubscriptionSet>,
    disposed: AtomicBool,
}

/// Performance-adaptive effects budget
///
/// Cheap to clone; all clones share one controller.
#[derive(Clone)]
pub struct EffectsController {
    inner: Arc<Inner>,
}

impl EffectsController {
    /// Create a controller at its capability baseline
    pub fn new(
        config: EffectsConfig,
        caps: Arc<dyn CapabilityProvider>,
        reduce_motion: bool,
    ) -> Result<Self> {
        config.validate()?;

        let system_reduced_motion = caps.prefers_reduced_motion();
        let baseline = Baseline::compute(&config, caps.as_ref(), reduce_motion);
        let (mode, budget) = initial_mode(&config, system_reduced_motion, &baseline);
        tracing::info!(
            tier = %baseline.tier,
            budget,
            mode = %mode,
            "EffectsController initialized"
        );

        let meter = FpsMeter::new(config.window());
        Ok(Self {
            inner: Arc::new(Inner {
                state: Mutex::new(ControllerState {
                    mode,
                    budget,
                    baseline,
                    reduce_motion,
                    // Light until `follow_theme` reports the resolved theme
                    dark: false,
                    meter,
                }),
                config,
                caps,
                system_reduced_motion,
                changed: Signal::new(),
                subscriptions: Mutex::new(SubscriptionSet::new()),
                disposed: AtomicBool::new(false),
            }),
        })
    }

    /// Listen to the host's frame and visibility signals until disposal
    pub fn attach(&self, frames: &Signal<FrameTick>, visibility: &Signal<Visibility>) {
        if self.is_disposed() {
            return;
        }
        let weak = Arc::downgrade(&self.inner);
        let on_frame = frames.subscribe(move |tick| {
            if let Some(inner) = Weak::upgrade(&weak) {
                inner.on_frame(*tick);
            }
        });

        let weak = Arc::downgrade(&self.inner);
        let on_visibility = visibility.subscribe(move |visibility| {
            if let Some(inner) = Weak::upgrade(&weak) {
                inner.on_visibility(*visibility);
            }
        });

        lock(&self.inner.subscriptions).extend([on_frame, on_visibility]);
    }

    /// Track the engine's reduce-motion flag and resolved theme
    pub fn follow_theme(&self, engine: &ThemeEngine) {
        if self.is_disposed() {
            return;
        }
        self.inner.set_dark(engine.is_dark());
        self.inner
            .set_reduce_motion(engine.accessibility().reduce_motion);

        let weak = Arc::downgrade(&self.inner);
        let on_accessibility = engine.subscribe_accessibility(move |settings| {
            if let Some(inner) = Weak::upgrade(&weak) {
                inner.set_reduce_motion(settings.reduce_motion);
            }
        });

        let weak = Arc::downgrade(&self.inner);
        let on_scheme = engine.subscribe_resolved(move |scheme| {
            if let Some(inner) = Weak::upgrade(&weak) {
                inner.set_dark(scheme.is_dark());
            }
        });

        lock(&self.inner.subscriptions).extend([on_accessibility, on_scheme]);
    }

    pub fn on_frame(&self, tick: FrameTick) {
        self.inner.on_frame(tick);
    }

    pub fn on_visibility(&self, visibility: Visibility) {
        self.inner.on_visibility(visibility);
    }

    /// Change the reduce-motion flag; a change re-initializes the session
    pub fn set_reduce_motion(&self, reduce_motion: bool) {
        self.inner.set_reduce_motion(reduce_motion);
    }

    /// Re-query capabilities and restart from the baseline
    ///
    /// While hidden only the baseline is refreshed; the session restarts on
    /// the next visible event.
    pub fn reinitialize(&self) {
        self.inner.reinitialize();
    }

    pub fn budget(&self) -> u32 {
        lock(&self.inner.state).budget
    }

    pub fn mode(&self) -> EffectsMode {
        lock(&self.inner.state).mode
    }

    pub fn snapshot(&self) -> EffectsSnapshot {
        lock(&self.inner.state).snapshot()
    }

    pub fn config(&self) -> &EffectsConfig {
        &self.inner.config
    }

    /// Called after every budget, mode or theme change
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(EffectsSnapshot) + Send + Sync + 'static,
    {
        self.inner
            .changed
            .subscribe(move |snapshot| listener(*snapshot))
    }

    /// Detach from every signal and drop listeners. Idempotent.
    pub fn dispose(&self) {
        if self.inner.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        let mut subscriptions = std::mem::take(&mut *lock(&self.inner.subscriptions));
        subscriptions.dispose();
        self.inner.changed.clear();
        tracing::debug!("EffectsController disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for EffectsController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectsController")
            .field("snapshot", &self.snapshot())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

fn initial_mode(
    config: &EffectsConfig,
    system_reduced_motion: bool,
    baseline: &Baseline,
) -> (EffectsMode, u32) {
    let suppressed =
        config.suppress_on_system_reduced_motion && baseline.reduce_motion && system_reduced_motion;
    if suppressed {
        (EffectsMode::Disabled, 0)
    } else {
        (EffectsMode::Active, baseline.budget)
    }
}

impl Inner {
    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// Apply `update` and notify listeners if mode, budget or palette moved
    fn transition(&self, update: impl FnOnce(&Self, &mut ControllerState)) {
        if self.is_disposed() {
            return;
        }
        let change = {
            let mut state = lock(&self.state);
            let before = (state.mode, state.budget, state.dark);
            update(self, &mut state);
            let after = (state.mode, state.budget, state.dark);
            (before != after).then(|| state.snapshot())
        };
        if let Some(snapshot) = change {
            self.changed.emit(&snapshot);
        }
    }

    fn reinitialize(&self) {
        self.transition(|inner, state| inner.restart(state));
    }

    /// Restart the session, or only refresh the baseline while hidden so the
    /// next visible event picks it up
    fn restart(&self, state: &mut ControllerState) {
        if state.mode == EffectsMode::Hidden {
            state.baseline = Baseline::compute(&self.config, self.caps.as_ref(), state.reduce_motion);
            return;
        }
        self.reset_session(state);
    }

    fn reset_session(&self, state: &mut ControllerState) {
        let baseline = Baseline::compute(&self.config, self.caps.as_ref(), state.reduce_motion);
        let (mode, budget) = initial_mode(&self.config, self.system_reduced_motion, &baseline);
        state.baseline = baseline;
        state.mode = mode;
        state.budget = budget;
        state.meter.reset();
        tracing::info!(
            tier = %baseline.tier,
            budget,
            mode = %mode,
            "effects session re-initialized"
        );
    }

    fn on_frame(&self, tick: FrameTick) {
        self.transition(|inner, state| {
            if state.mode != EffectsMode::Active {
                return;
            }
            let Some(fps) = state.meter.tick(tick.timestamp) else {
                return;
            };
            tracing::trace!(fps, budget = state.budget, "fps sample");

            let config = &inner.config;
            if fps < config.fatigue_fps && state.budget > config.floor {
                let next = state.budget.saturating_sub(config.step).max(config.floor);
                tracing::info!(fps, from = state.budget, to = next, "lowering effects budget");
                state.budget = next;
                state.meter.reset();
            }
        });
    }

    fn on_visibility(&self, visibility: Visibility) {
        self.transition(|inner, state| match visibility {
            Visibility::Hidden => {
                if state.mode == EffectsMode::Disabled {
                    return;
                }
                state.mode = EffectsMode::Hidden;
                state.budget = inner.config.hidden_floor;
                state.meter.reset();
                tracing::debug!(budget = state.budget, "surface hidden");
            }
            // Only a return from hidden starts a new session
            Visibility::Visible if state.mode == EffectsMode::Hidden => inner.reset_session(state),
            Visibility::Visible => {}
        });
    }

    fn set_reduce_motion(&self, reduce_motion: bool) {
        self.transition(|inner, state| {
            if state.reduce_motion == reduce_motion {
                return;
            }
            state.reduce_motion = reduce_motion;
            inner.restart(state);
        });
    }

    fn set_dark(&self, dark: bool) {
        self.transition(|_, state| state.dark = dark);
    }
}
