//! `vitrine init`

use crate::config::{VitrineConfig, CONFIG_FILE};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Write a default vitrine.toml into `path` (a directory or a file path)
pub fn run(path: &Path, force: bool) -> Result<PathBuf> {
    let target = if path.extension().is_some_and(|ext| ext == "toml") {
        path.to_path_buf()
    } else {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        path.join(CONFIG_FILE)
    };

    if target.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            target.display()
        );
    }

    let content = VitrineConfig::default().to_toml()?;
    fs::write(&target, content)
        .with_context(|| format!("Failed to write {}", target.display()))?;

    tracing::info!("wrote {}", target.display());
    Ok(target)
}
