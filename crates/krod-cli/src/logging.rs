//! Tracing setup
//!
//! `render` logs to stderr so stdout stays clean. The full-screen viewer
//! owns the terminal, so it logs to `~/.krod/logs/krod.log` instead.

use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use krod_core::KrodConfig;

fn filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

pub fn init_stderr(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter(level))
        .init();
}

pub fn init_file(verbose: bool) -> Result<()> {
    let dir = KrodConfig::config_dir()
        .context("no home directory for log file")?
        .join("logs");
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;

    let path = dir.join("krod.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(filter(level))
        .init();
    Ok(())
}
