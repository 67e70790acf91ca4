// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use roster_app::ViewMode;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::Level;

pub const APP_NAME: &str = "client-roster";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_SEED: u64 = 42;
const DEFAULT_CLIENT_COUNT: usize = 60;
const MAX_CLIENT_COUNT: usize = 10_000;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub demo: Demo,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            ui: Ui::default(),
            demo: Demo::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ui {
    pub default_view: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Demo {
    pub seed: Option<u64>,
    pub client_count: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Log {
    pub level: Option<String>,
    pub file: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("ROSTER_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set ROSTER_CONFIG_PATH to the config file")
        })?;
        Ok(config_root.join(APP_NAME).join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} has no version. Add `version = 1` and put values under [ui], [demo], and [log]",
                    path.display()
                )
            })?;
        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(view) = &self.ui.default_view
            && ViewMode::parse(view).is_none()
        {
            bail!(
                "ui.default_view in {} must be one of card, list, table; got {view:?}",
                path.display()
            );
        }

        if let Some(count) = self.demo.client_count
            && !(1..=MAX_CLIENT_COUNT).contains(&count)
        {
            bail!(
                "demo.client_count in {} must be between 1 and {MAX_CLIENT_COUNT}, got {count}",
                path.display()
            );
        }

        if let Some(level) = &self.log.level {
            parse_level(level).with_context(|| format!("invalid log.level in {}", path.display()))?;
        }

        if let Some(file) = &self.log.file
            && file.trim().is_empty()
        {
            bail!(
                "log.file in {} is blank; remove it to use the default log path",
                path.display()
            );
        }
        Ok(())
    }

    pub fn default_view(&self) -> ViewMode {
        self.ui
            .default_view
            .as_deref()
            .and_then(ViewMode::parse)
            .unwrap_or_default()
    }

    pub fn seed(&self) -> u64 {
        self.demo.seed.unwrap_or(DEFAULT_SEED)
    }

    pub fn client_count(&self) -> usize {
        self.demo.client_count.unwrap_or(DEFAULT_CLIENT_COUNT)
    }

    pub fn log_level(&self) -> Level {
        self.log
            .level
            .as_deref()
            .and_then(|level| parse_level(level).ok())
            .unwrap_or(Level::INFO)
    }

    pub fn log_file(&self) -> Result<PathBuf> {
        if let Some(file) = &self.log.file {
            return Ok(PathBuf::from(file));
        }
        let state_root = dirs::state_dir()
            .or_else(dirs::cache_dir)
            .ok_or_else(|| anyhow!("cannot resolve a log directory; set [log].file in the config"))?;
        Ok(state_root.join(APP_NAME).join("roster.log"))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# client roster config\n# Place this file at: {}\n\nversion = 1\n\n[ui]\n# card, list, or table\ndefault_view = \"card\"\n\n[demo]\nseed = {DEFAULT_SEED}\nclient_count = {DEFAULT_CLIENT_COUNT}\n\n[log]\n# error, warn, info, debug, or trace; ROSTER_LOG overrides it\nlevel = \"info\"\n# file = \"/absolute/path/to/roster.log\"\n",
            path.display(),
        )
    }
}

fn parse_level(raw: &str) -> Result<Level> {
    raw.parse::<Level>().map_err(|_| {
        anyhow!("unknown log level {raw:?}; use one of error, warn, info, debug, trace")
    })
}
