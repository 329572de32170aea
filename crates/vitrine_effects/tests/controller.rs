//! Integration tests for the effects controller
//!
//! These tests verify that:
//! - Sustained low frame rates walk the budget down to the floor
//! - The budget never increases without a re-initialization
//! - Visibility and reduce-motion changes drive the session lifecycle
//! - The controller follows a live theme engine

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use vitrine_core::sync::lock;
use vitrine_core::{
    CapabilityProvider, FixedClock, FrameTick, MemoryStore, Signal, StaticCapabilities, Visibility,
};
use vitrine_effects::{EffectsConfig, EffectsController, EffectsMode, PerformanceTier};
use vitrine_theme::{ThemeEngine, ThemePreference};

struct Frames {
    now: Instant,
}

impl Frames {
    fn new() -> Self {
        Self {
            now: Instant::now(),
        }
    }

    /// Push `seconds` worth of frames at a steady `fps`
    fn run(&mut self, signal: &Signal<FrameTick>, fps: u32, seconds: u32) {
        let interval = Duration::from_secs(1) / fps;
        for _ in 0..fps * seconds {
            self.now += interval;
            signal.emit(&FrameTick::new(self.now));
        }
    }
}

fn attached(caps: StaticCapabilities) -> (EffectsController, Signal<FrameTick>, Signal<Visibility>) {
    let controller =
        EffectsController::new(EffectsConfig::default(), Arc::new(caps), false).unwrap();
    let frames = Signal::new();
    let visibility = Signal::new();
    controller.attach(&frames, &visibility);
    (controller, frames, visibility)
}

#[test]
fn test_sustained_low_fps_steps_down_to_floor() {
    let (controller, frames, _visibility) = attached(StaticCapabilities::desktop());
    let budgets = Arc::new(Mutex::new(Vec::new()));
    let b = budgets.clone();
    let _sub = controller.subscribe(move |snapshot| lock(&b).push(snapshot.budget));

    let mut clock = Frames::new();
    clock.run(&frames, 20, 30);

    assert_eq!(controller.budget(), 20);
    assert_eq!(
        *lock(&budgets),
        vec![90, 80, 70, 60, 50, 40, 30, 20],
        "one step per sampled window, never below the floor"
    );
    assert_eq!(controller.snapshot().last_fps, Some(20));
}

#[test]
fn test_recovery_does_not_raise_budget() {
    let (controller, frames, _visibility) = attached(StaticCapabilities::desktop());
    let mut clock = Frames::new();

    clock.run(&frames, 20, 3);
    let lowered = controller.budget();
    assert!(lowered < 100);

    clock.run(&frames, 60, 10);
    assert_eq!(controller.budget(), lowered);
}

#[test]
fn test_hidden_collapses_and_visible_reinitializes() {
    let (controller, frames, visibility) = attached(StaticCapabilities::desktop());
    let mut clock = Frames::new();
    clock.run(&frames, 20, 4);
    assert!(controller.budget() < 100);

    visibility.emit(&Visibility::Hidden);
    assert_eq!(controller.mode(), EffectsMode::Hidden);
    assert_eq!(controller.budget(), 10);

    // Frames while hidden are ignored
    clock.run(&frames, 5, 10);
    assert_eq!(controller.budget(), 10);

    visibility.emit(&Visibility::Visible);
    assert_eq!(controller.mode(), EffectsMode::Active);
    assert_eq!(controller.budget(), 100);
}

#[test]
fn test_visible_without_hidden_keeps_lowered_budget() {
    let (controller, frames, visibility) = attached(StaticCapabilities::desktop());
    let mut clock = Frames::new();
    clock.run(&frames, 20, 4);
    let lowered = controller.budget();
    assert!(lowered < 100);

    visibility.emit(&Visibility::Visible);
    visibility.emit(&Visibility::Visible);
    assert_eq!(controller.mode(), EffectsMode::Active);
    assert_eq!(controller.budget(), lowered);
}

#[test]
fn test_mobile_and_reduce_motion_baselines() {
    let mobile = StaticCapabilities::from_user_agent(
        "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) Mobile/15E148",
    );
    let (controller, _frames, _visibility) = attached(mobile);
    assert_eq!(controller.budget(), 30);
    assert_eq!(controller.snapshot().baseline.tier, PerformanceTier::Mobile);

    controller.set_reduce_motion(true);
    assert!(controller.budget() <= 20);
    controller.set_reduce_motion(false);
    assert_eq!(controller.budget(), 30);
}

#[test]
fn test_reduce_motion_while_hidden_waits_for_visible() {
    let (controller, _frames, visibility) = attached(StaticCapabilities::desktop());
    visibility.emit(&Visibility::Hidden);
    controller.set_reduce_motion(true);
    assert_eq!(controller.budget(), 10);

    visibility.emit(&Visibility::Visible);
    assert_eq!(controller.budget(), 20);
}

#[test]
fn test_disabled_ignores_frames_and_visibility() {
    let caps = StaticCapabilities::desktop().with_reduced_motion(true);
    let controller = EffectsController::new(EffectsConfig::default(), Arc::new(caps), true).unwrap();
    let frames = Signal::new();
    let visibility = Signal::new();
    controller.attach(&frames, &visibility);

    Frames::new().run(&frames, 10, 5);
    visibility.emit(&Visibility::Hidden);
    assert_eq!(controller.mode(), EffectsMode::Disabled);
    assert_eq!(controller.budget(), 0);

    controller.set_reduce_motion(false);
    assert_eq!(controller.mode(), EffectsMode::Active);
    assert_eq!(controller.budget(), 100);
}

#[test]
fn test_follows_theme_engine() {
    let engine = ThemeEngine::builder()
        .store(Arc::new(MemoryStore::new()))
        .capabilities(Arc::new(StaticCapabilities::default()))
        .clock(Arc::new(FixedClock::new(12)))
        .init()
        .unwrap();
    let controller = EffectsController::new(
        EffectsConfig::default(),
        Arc::new(StaticCapabilities::desktop()),
        false,
    )
    .unwrap();
    controller.follow_theme(&engine);
    assert!(!controller.snapshot().dark);

    engine.set_reduce_motion(true);
    assert_eq!(controller.budget(), 20);

    engine.set_preference(ThemePreference::Dark);
    let options = controller.snapshot().particle_options().unwrap();
    assert_eq!(options.palette[0].to_css(), "#38BDF8");
    assert!(!options.animate);

    controller.dispose();
    engine.set_reduce_motion(false);
    assert_eq!(controller.budget(), 20);
}

#[test]
fn test_dispose_detaches_from_signals() {
    let (controller, frames, visibility) = attached(StaticCapabilities::desktop());
    assert_eq!(frames.listener_count(), 1);

    controller.dispose();
    assert_eq!(frames.listener_count(), 0);
    assert_eq!(visibility.listener_count(), 0);

    visibility.emit(&Visibility::Hidden);
    assert_eq!(controller.budget(), 100);
}

proptest! {
    #[test]
    fn prop_budget_stays_within_bounds(
        rates in proptest::collection::vec(1u32..120, 1..12),
        hide_after in proptest::option::of(0usize..12),
    ) {
        let (controller, frames, visibility) = attached(StaticCapabilities::desktop());
        let config = EffectsConfig::default();
        let mut clock = Frames::new();
        let mut previous = controller.budget();

        for (i, fps) in rates.into_iter().enumerate() {
            if Some(i) == hide_after {
                visibility.emit(&Visibility::Hidden);
            }
            clock.run(&frames, fps, 2);

            let snapshot = controller.snapshot();
            match snapshot.mode {
                EffectsMode::Active => {
                    prop_assert!(snapshot.budget >= config.floor);
                    prop_assert!(snapshot.budget <= snapshot.baseline.budget);
                    prop_assert!(snapshot.budget <= previous, "budget increased");
                }
                EffectsMode::Hidden => prop_assert_eq!(snapshot.budget, config.hidden_floor),
                EffectsMode::Disabled => prop_assert_eq!(snapshot.budget, 0),
            }
            previous = snapshot.budget;
        }
    }
}

/// OS preferences that can change after construction
#[derive(Default)]
struct ChangingOs {
    dark: AtomicBool,
    reduced_motion: AtomicBool,
}

impl CapabilityProvider for ChangingOs {
    fn is_mobile(&self) -> bool {
        false
    }
    fn device_memory(&self) -> Option<f32> {
        Some(16.0)
    }
    fn core_count(&self) -> Option<u32> {
        Some(8)
    }
    fn prefers_dark(&self) -> bool {
        self.dark.load(Ordering::SeqCst)
    }
    fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion.load(Ordering::SeqCst)
    }
}

#[test]
fn test_palette_starts_light_until_theme_is_followed() {
    let os = Arc::new(ChangingOs::default());
    os.dark.store(true, Ordering::SeqCst);
    let controller = EffectsController::new(EffectsConfig::default(), os, false).unwrap();

    let snapshot = controller.snapshot();
    assert!(!snapshot.dark);
    let options = snapshot.particle_options().unwrap();
    assert_eq!(options.palette[0].to_css(), "#0EA5E9");
}

#[test]
fn test_os_reduced_motion_is_read_once() {
    let os = Arc::new(ChangingOs::default());
    let controller = EffectsController::new(EffectsConfig::default(), os.clone(), false).unwrap();

    os.reduced_motion.store(true, Ordering::SeqCst);
    controller.set_reduce_motion(true);
    assert_eq!(controller.mode(), EffectsMode::Active);
    assert_eq!(controller.budget(), 20);

    controller.reinitialize();
    assert_eq!(controller.mode(), EffectsMode::Active);
}
