//! `vitrine watch`
//!
//! Runs the theme engine and the effects controller against the live host:
//! the OS color scheme is polled, a 60 Hz ticker stands in for the render
//! loop and every change is logged until Ctrl+C or the deadline.
//!
//! On Unix, `SIGUSR1` flips the surface between visible and hidden
//! (`kill -USR1 <pid>`). No frames are delivered while hidden.

use crate::config::VitrineConfig;
use anyhow::Result;
use clap::Args;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::info;
use vitrine_core::{
    CapabilityProvider, FrameTick, KeyValueStore, Scheduler, Signal, SubscriptionSet,
    SystemCapabilities, Visibility,
};
use vitrine_effects::EffectsController;
use vitrine_theme::{SchemeWatcher, ThemeEngine};

const FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Args, Debug, Clone, Default)]
pub struct WatchArgs {
    /// Stop after this many seconds instead of waiting for Ctrl+C
    #[arg(long, value_name = "S")]
    pub seconds: Option<u64>,
}

/// Surface state as the host sees it
#[derive(Debug, Default)]
struct Surface {
    hidden: bool,
}

impl Surface {
    /// Flip visibility and announce it on `visibility`
    fn toggle(&mut self, visibility: &Signal<Visibility>) -> Visibility {
        self.hidden = !self.hidden;
        let next = Visibility::from_hidden(self.hidden);
        info!(?next, "Surface visibility changed");
        visibility.emit(&next);
        next
    }
}

/// One message per `SIGUSR1`; the channel closes at once where the signal
/// does not exist
fn visibility_toggles() -> mpsc::UnboundedReceiver<()> {
    let (tx, rx) = mpsc::unbounded_channel();

    #[cfg(unix)]
    tokio::spawn(async move {
        use tokio::signal::unix::{signal, SignalKind};

        let mut usr1 = match signal(SignalKind::user_defined1()) {
            Ok(usr1) => usr1,
            Err(err) => {
                tracing::warn!(%err, "SIGUSR1 unavailable, surface stays visible");
                return;
            }
        };
        while usr1.recv().await.is_some() {
            if tx.send(()).is_err() {
                break;
            }
        }
    });

    #[cfg(not(unix))]
    drop(tx);

    rx
}

pub async fn run(config: &VitrineConfig, store_path: Option<&Path>, args: &WatchArgs) -> Result<()> {
    let store = config.open_store(store_path)?;
    let caps: Arc<dyn CapabilityProvider> = Arc::new(SystemCapabilities::new());
    let scheduler = Scheduler::starting_at(Instant::now());
    let system_scheme = Signal::new();

    let watcher = SchemeWatcher::start(
        &scheduler,
        caps.clone(),
        system_scheme.clone(),
        config.theme.watcher_poll(),
    );

    let engine = ThemeEngine::builder()
        .config(config.theme.clone())
        .store(Arc::new(store) as Arc<dyn KeyValueStore>)
        .capabilities(caps.clone())
        .scheduler(scheduler.clone())
        .system_scheme(system_scheme)
        .init()?;

    let effects = EffectsController::new(
        config.effects.clone(),
        caps,
        engine.accessibility().reduce_motion,
    )?;
    effects.follow_theme(&engine);

    let frames = Signal::new();
    let visibility = Signal::new();
    effects.attach(&frames, &visibility);

    let mut subscriptions = SubscriptionSet::new();
    subscriptions.add(engine.subscribe_resolved(|scheme| {
        info!(%scheme, "Theme changed");
    }));
    subscriptions.add(engine.subscribe_accessibility(|settings| {
        info!(
            high_contrast = settings.high_contrast,
            reduce_motion = settings.reduce_motion,
            "Accessibility changed"
        );
    }));
    subscriptions.add(effects.subscribe(|snapshot| {
        info!(
            mode = %snapshot.mode,
            budget = snapshot.budget,
            fps = ?snapshot.last_fps,
            "Effects budget changed"
        );
    }));

    info!(
        preference = %engine.preference(),
        resolved = %engine.resolved(),
        budget = effects.budget(),
        "Watching; press Ctrl+C to stop"
    );

    let deadline = async {
        match args.seconds {
            Some(seconds) => tokio::time::sleep(Duration::from_secs(seconds)).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(deadline);

    let mut ticker = tokio::time::interval(FRAME_INTERVAL);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut toggles = visibility_toggles();
    let mut surface = Surface::default();

    loop {
        tokio::select! {
            _ = &mut deadline => {
                info!("Deadline reached");
                break;
            }
            result = tokio::signal::ctrl_c() => {
                result?;
                info!("Interrupted");
                break;
            }
            Some(()) = toggles.recv() => {
                surface.toggle(&visibility);
            }
            tick = ticker.tick() => {
                let now = tick.into_std();
                scheduler.advance_to(now);
                if !surface.hidden {
                    frames.emit(&FrameTick::new(now));
                }
            }
        }
    }

    subscriptions.dispose();
    effects.dispose();
    engine.dispose();
    watcher.stop();

    let snapshot = effects.snapshot();
    println!(
        "final: theme={} mode={} budget={}",
        engine.resolved(),
        snapshot.mode,
        snapshot.budget
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_core::StaticCapabilities;
    use vitrine_effects::{EffectsConfig, EffectsMode};

    #[test]
    fn test_toggle_drives_hidden_collapse() {
        let controller = EffectsController::new(
            EffectsConfig::default(),
            Arc::new(StaticCapabilities::desktop()),
            false,
        )
        .unwrap();
        let frames = Signal::new();
        let visibility = Signal::new();
        controller.attach(&frames, &visibility);

        let mut surface = Surface::default();
        assert_eq!(surface.toggle(&visibility), Visibility::Hidden);
        assert_eq!(controller.mode(), EffectsMode::Hidden);
        assert_eq!(controller.budget(), 10);

        assert_eq!(surface.toggle(&visibility), Visibility::Visible);
        assert_eq!(controller.mode(), EffectsMode::Active);
        assert_eq!(controller.budget(), 100);
    }
}
