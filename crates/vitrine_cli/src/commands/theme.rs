//! `vitrine theme`

use crate::config::VitrineConfig;
use anyhow::{Context, Result};
use clap::{Subcommand, ValueEnum};
use std::path::Path;
use std::sync::Arc;
use vitrine_core::{KeyValueStore, SystemCapabilities};
use vitrine_theme::ThemeEngine;

#[derive(Subcommand, Debug, Clone)]
pub enum ThemeAction {
    /// Print the stored preference and what it resolves to
    Show {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Store a preference: light, dark, auto or system
    Set { preference: String },
    /// Show or change the high-contrast flag
    Contrast { state: Option<Switch> },
    /// Show or change the reduce-motion flag
    Motion { state: Option<Switch> },
    /// Show the active preset, or apply one by id
    Preset { name: Option<String> },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Switch {
    On,
    Off,
    Toggle,
}

impl Switch {
    fn apply(self, current: bool) -> bool {
        match self {
            Switch::On => true,
            Switch::Off => false,
            Switch::Toggle => !current,
        }
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}

/// Run `action` against `engine` and return what to print
pub fn execute(engine: &ThemeEngine, action: &ThemeAction) -> Result<String> {
    match action {
        ThemeAction::Show { json: true } => {
            serde_json::to_string_pretty(&engine.snapshot()).context("Failed to encode snapshot")
        }
        ThemeAction::Show { json: false } => {
            let snapshot = engine.snapshot();
            Ok(format!(
                "preference:    {}\nresolved:      {}\nhigh contrast: {}\nreduce motion: {}\npreset:        {}",
                snapshot.preference,
                snapshot.resolved,
                on_off(snapshot.accessibility.high_contrast),
                on_off(snapshot.accessibility.reduce_motion),
                snapshot.preset.id(),
            ))
        }
        ThemeAction::Set { preference } => {
            engine.set_preference_str(preference)?;
            Ok(format!(
                "{} (resolves to {})",
                engine.preference(),
                engine.resolved()
            ))
        }
        ThemeAction::Contrast { state } => {
            if let Some(switch) = state {
                let current = engine.accessibility().high_contrast;
                engine.set_high_contrast(switch.apply(current));
            }
            Ok(on_off(engine.accessibility().high_contrast).to_string())
        }
        ThemeAction::Motion { state } => {
            if let Some(switch) = state {
                let current = engine.accessibility().reduce_motion;
                engine.set_reduce_motion(switch.apply(current));
            }
            Ok(on_off(engine.accessibility().reduce_motion).to_string())
        }
        ThemeAction::Preset { name: Some(name) } => {
            let preset = engine.apply_color_preset_named(name)?;
            Ok(preset.id().to_string())
        }
        ThemeAction::Preset { name: None } => {
            let active = engine.color_preset();
            let lines: Vec<String> = engine
                .presets()
                .iter()
                .map(|preset| {
                    let marker = if *preset == active { "*" } else { " " };
                    format!("{} {:<10} {}", marker, preset.id(), preset.display_name())
                })
                .collect();
            Ok(lines.join("\n"))
        }
    }
}

pub fn run(config: &VitrineConfig, store_path: Option<&Path>, action: &ThemeAction) -> Result<()> {
    let store = config.open_store(store_path)?;
    tracing::debug!(path = %store.path().display(), "Using settings store");

    let engine = ThemeEngine::builder()
        .config(config.theme.clone())
        .store(Arc::new(store) as Arc<dyn KeyValueStore>)
        .capabilities(Arc::new(SystemCapabilities::new()))
        .init()?;

    let result = execute(&engine, action);
    engine.dispose();
    println!("{}", result?);
    Ok(())
}
