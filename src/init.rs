use crate::config::Config;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;
use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Creates the data, voice and video directories named in `cfg`.
pub async fn ensure_directories(cfg: &Config) -> Result<()> {
    let mut dirs = vec![cfg.voices_dir.as_path(), cfg.videos_dir.as_path()];
    for file in [&cfg.output_path, &cfg.summaries_path] {
        if let Some(parent) = file.parent() {
            dirs.push(parent);
        }
    }

    for dir in dirs {
        if dir.as_os_str().is_empty() || Path::new(dir).exists() {
            continue;
        }
        fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        tracing::info!("Created directory: {}", dir.display());
    }
    Ok(())
}

pub async fn check_ffmpeg() -> bool {
    match tokio::process::Command::new("ffmpeg")
        .arg("-version")
        .output()
        .await
    {
        Ok(output) => output.status.success(),
        Err(_) => false,
    }
}
