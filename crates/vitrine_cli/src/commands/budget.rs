//! `vitrine budget`

use super::CapsArgs;
use crate::config::VitrineConfig;
use anyhow::{Context, Result};
use clap::Args;
use vitrine_effects::{EffectsController, EffectsSnapshot};

/// Viewport widths reported alongside the budget
const VIEWPORTS: [u32; 3] = [375, 800, 1920];

#[derive(Args, Debug)]
pub struct BudgetArgs {
    #[command(flatten)]
    pub caps: CapsArgs,

    /// The user asked for reduced motion
    #[arg(long)]
    pub reduce_motion: bool,

    /// Print the snapshot as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn snapshot(config: &VitrineConfig, args: &BudgetArgs) -> Result<EffectsSnapshot> {
    let controller =
        EffectsController::new(config.effects.clone(), args.caps.provider(), args.reduce_motion)?;
    let snapshot = controller.snapshot();
    controller.dispose();
    Ok(snapshot)
}

pub fn run(config: &VitrineConfig, args: &BudgetArgs) -> Result<()> {
    let snapshot = snapshot(config, args)?;

    if args.json {
        let json = serde_json::to_string_pretty(&snapshot).context("Failed to encode snapshot")?;
        println!("{json}");
        return Ok(());
    }

    println!("tier:     {}", snapshot.baseline.tier);
    println!("baseline: {}", snapshot.baseline.budget);
    println!("mode:     {}", snapshot.mode);
    println!("budget:   {}", snapshot.budget);
    if let Some(options) = snapshot.particle_options() {
        let counts: Vec<String> = VIEWPORTS
            .iter()
            .map(|width| format!("{}px={}", width, options.count_for_viewport(*width)))
            .collect();
        println!("particles: {}", counts.join(", "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_effects::{EffectsMode, PerformanceTier};

    fn args(caps: CapsArgs, reduce_motion: bool) -> BudgetArgs {
        BudgetArgs {
            caps,
            reduce_motion,
            json: false,
        }
    }

    #[test]
    fn test_unknown_desktop_is_low_core() {
        let snapshot = snapshot(&VitrineConfig::default(), &args(CapsArgs::default(), false)).unwrap();
        assert_eq!(snapshot.baseline.tier, PerformanceTier::LowCore);
        assert_eq!(snapshot.budget, 60);
    }

    #[test]
    fn test_reduced_motion_everywhere_disables() {
        let caps = CapsArgs {
            system_reduced_motion: true,
            ..Default::default()
        };
        let snapshot = snapshot(&VitrineConfig::default(), &args(caps, true)).unwrap();
        assert_eq!(snapshot.mode, EffectsMode::Disabled);
        assert_eq!(snapshot.budget, 0);
    }

    #[test]
    fn test_snapshot_serializes() {
        let caps = CapsArgs {
            memory: Some(16.0),
            cores: Some(8),
            ..Default::default()
        };
        let snapshot = snapshot(&VitrineConfig::default(), &args(caps, false)).unwrap();
        let json = serde_json::to_value(snapshot).unwrap();
        assert_eq!(json["budget"], 100);
        assert_eq!(json["mode"], "active");
        assert_eq!(json["baseline"]["tier"], "full");
    }
}
