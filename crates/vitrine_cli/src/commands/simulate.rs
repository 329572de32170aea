//! `vitrine simulate`
//!
//! Drives an effects controller over virtual time with synthetic frame
//! timestamps and reports the budget at the end of every simulated second.

use super::CapsArgs;
use crate::config::VitrineConfig;
use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::time::{Duration, Instant};
use vitrine_core::{CapabilityProvider, FrameTick, Signal, Visibility};
use vitrine_effects::{EffectsConfig, EffectsController, EffectsMode};

#[derive(Args, Debug)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub caps: CapsArgs,

    /// The user asked for reduced motion
    #[arg(long)]
    pub reduce_motion: bool,

    /// Frame rates, one phase each (comma separated)
    #[arg(long, value_delimiter = ',', default_value = "20")]
    pub fps: Vec<u32>,

    /// Length of each phase in seconds
    #[arg(long, default_value_t = 10)]
    pub seconds: u32,

    /// Hide the surface at the start of this second
    #[arg(long, value_name = "S")]
    pub hide_at: Option<u32>,

    /// Show the surface again at the start of this second
    #[arg(long, value_name = "S")]
    pub show_at: Option<u32>,

    /// Print the trajectory as JSON
    #[arg(long)]
    pub json: bool,
}

/// Budget observed at the end of one simulated second
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Sample {
    pub second: u32,
    pub fps: u32,
    pub mode: EffectsMode,
    pub budget: u32,
}

/// Visibility changes keyed by the second they happen at
#[derive(Debug, Clone, Copy, Default)]
pub struct VisibilityPlan {
    pub hide_at: Option<u32>,
    pub show_at: Option<u32>,
}

pub fn simulate(
    config: &EffectsConfig,
    caps: std::sync::Arc<dyn CapabilityProvider>,
    reduce_motion: bool,
    phases: &[u32],
    seconds_per_phase: u32,
    plan: VisibilityPlan,
) -> Result<Vec<Sample>> {
    if phases.iter().any(|fps| *fps == 0) {
        anyhow::bail!("frame rates must be positive");
    }

    let controller = EffectsController::new(config.clone(), caps, reduce_motion)?;
    let frames = Signal::new();
    let visibility = Signal::new();
    controller.attach(&frames, &visibility);

    let start = Instant::now();
    let mut samples = Vec::new();
    let timeline = phases
        .iter()
        .flat_map(|fps| std::iter::repeat(*fps).take(seconds_per_phase as usize));

    for (second, fps) in (0u32..).zip(timeline) {
        if plan.hide_at == Some(second) {
            visibility.emit(&Visibility::Hidden);
        }
        if plan.show_at == Some(second) {
            visibility.emit(&Visibility::Visible);
        }

        let second_start = start + Duration::from_secs(u64::from(second));
        let interval = Duration::from_secs(1) / fps;
        for frame in 1..=fps {
            frames.emit(&FrameTick::new(second_start + interval * frame));
        }

        samples.push(Sample {
            second: second + 1,
            fps,
            mode: controller.mode(),
            budget: controller.budget(),
        });
    }

    controller.dispose();
    Ok(samples)
}

pub fn run(config: &VitrineConfig, args: &SimulateArgs) -> Result<()> {
    let samples = simulate(
        &config.effects,
        args.caps.provider(),
        args.reduce_motion,
        &args.fps,
        args.seconds,
        VisibilityPlan {
            hide_at: args.hide_at,
            show_at: args.show_at,
        },
    )?;

    if args.json {
        let json = serde_json::to_string_pretty(&samples).context("Failed to encode samples")?;
        println!("{json}");
        return Ok(());
    }

    println!("{:>6}  {:>4}  {:<8}  {:>6}", "second", "fps", "mode", "budget");
    for sample in &samples {
        println!(
            "{:>6}  {:>4}  {:<8}  {:>6}",
            sample.second,
            sample.fps,
            sample.mode.to_string(),
            sample.budget
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use vitrine_core::StaticCapabilities;

    fn desktop() -> Arc<dyn CapabilityProvider> {
        Arc::new(StaticCapabilities::desktop())
    }

    #[test]
    fn test_slow_device_reaches_floor() {
        let samples = simulate(
            &EffectsConfig::default(),
            desktop(),
            false,
            &[20],
            10,
            VisibilityPlan::default(),
        )
        .unwrap();

        assert_eq!(samples.len(), 10);
        assert!(samples.windows(2).all(|w| w[1].budget <= w[0].budget));
        assert_eq!(samples.last().map(|s| s.budget), Some(20));
    }

    #[test]
    fn test_fast_device_holds_baseline() {
        let samples = simulate(
            &EffectsConfig::default(),
            desktop(),
            false,
            &[50],
            5,
            VisibilityPlan::default(),
        )
        .unwrap();
        assert!(samples.iter().all(|s| s.budget == 100));
    }

    #[test]
    fn test_hide_and_show() {
        let samples = simulate(
            &EffectsConfig::default(),
            desktop(),
            false,
            &[20],
            8,
            VisibilityPlan {
                hide_at: Some(3),
                show_at: Some(5),
            },
        )
        .unwrap();

        assert_eq!(samples[3].mode, EffectsMode::Hidden);
        assert_eq!(samples[3].budget, 10);
        assert_eq!(samples[4].budget, 10);
        assert_eq!(samples[5].mode, EffectsMode::Active);
        assert!(samples[5].budget >= 90);
    }

    #[test]
    fn test_zero_fps_is_rejected() {
        let result = simulate(
            &EffectsConfig::default(),
            desktop(),
            false,
            &[0],
            1,
            VisibilityPlan::default(),
        );
        assert!(result.is_err());
    }
}
