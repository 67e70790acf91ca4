// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! File-backed `tracing` setup. The terminal belongs to the UI, so log
//! lines never go to stdout or stderr while the roster is running.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{Level, Subscriber};
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Overrides the configured level with a full filter directive.
pub const LOG_ENV_VAR: &str = "ROSTER_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: Level,
    pub log_file: PathBuf,
}

pub fn init_logging(config: &LogConfig) -> Result<()> {
    if let Some(parent) = config.log_file.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)
        .with_context(|| {
            format!(
                "open log file {} -- set [log].file to a writable path",
                config.log_file.display()
            )
        })?;
    subscriber(config.level, SharedFileWriter::new(file))
        .try_init()
        .context("install tracing subscriber")
}

fn subscriber<W>(level: Level, writer: W) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true);
    tracing_subscriber::registry()
        .with(build_env_filter(level))
        .with(layer)
}

fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| {
        let level = level.as_str().to_lowercase();
        EnvFilter::new(format!(
            "warn,roster={level},roster_app={level},roster_tui={level},roster_cli={level}"
        ))
    })
}

#[derive(Clone)]
struct SharedFileWriter {
    file: Arc<Mutex<File>>,
}

impl SharedFileWriter {
    fn new(file: File) -> Self {
        Self {
            file: Arc::new(Mutex::new(file)),
        }
    }
}

struct SharedFileGuard {
    file: Arc<Mutex<File>>,
}

impl Write for SharedFileGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .file
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;
        guard.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut guard = self
            .file
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;
        guard.flush()
    }
}

impl<'a> MakeWriter<'a> for SharedFileWriter {
    type Writer = SharedFileGuard;

    fn make_writer(&'a self) -> Self::Writer {
        SharedFileGuard {
            file: Arc::clone(&self.file),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{SharedFileWriter, subscriber};
    use anyhow::Result;
    use std::fs::OpenOptions;
    use tracing::Level;

    #[test]
    fn events_land_in_the_log_file_at_or_above_level() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("roster.log");
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        tracing::subscriber::with_default(
            subscriber(Level::INFO, SharedFileWriter::new(file)),
            || {
                tracing::info!(target: "roster_app::state", clients = 3, "bulk action confirmed");
                tracing::debug!(target: "roster_app::state", "sort changed");
            },
        );

        let written = std::fs::read_to_string(&path)?;
        assert!(written.contains("bulk action confirmed"));
        assert!(written.contains("clients=3"));
        assert!(!written.contains("sort changed"));
        Ok(())
    }
}
