//! Configuration loading from TOML.
//!
//! Reads `config.toml` (or the file named by `EDGEWISE_CONFIG`) into
//! strongly-typed structs. Every field has a default, so a partial file or
//! no file at all yields a working configuration.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::indicators::volatility::DEFAULT_LOOKBACK;
use crate::strategy::quality::DEFAULT_BASE_INTERVAL_MINUTES;
use crate::strategy::robust::RobustConfig;
use crate::types::EdgewiseError;

/// Config file used when `EDGEWISE_CONFIG` is not set.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub robust: RobustConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of 1-minute returns used for realized volatility.
    pub lookback_minutes: usize,
    /// Full market window in minutes.
    pub base_interval_minutes: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lookback_minutes: DEFAULT_LOOKBACK,
            base_interval_minutes: DEFAULT_BASE_INTERVAL_MINUTES,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence.
    pub filter: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "edgewise=info".into(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Config path from `EDGEWISE_CONFIG`, falling back to `config.toml`.
    pub fn path_from_env() -> String {
        std::env::var("EDGEWISE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string())
    }

    /// Load and validate configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config = Self::parse(&contents)
            .with_context(|| format!("Invalid config file: {path}"))?;
        Ok(config)
    }

    /// Like [`AppConfig::load`], but a missing file is `Ok(None)`.
    pub fn load_optional(path: &str) -> Result<Option<Self>> {
        if !Path::new(path).exists() {
            return Ok(None);
        }
        Self::load(path).map(Some)
    }

    /// Parse and validate TOML text.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents).context("Failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EdgewiseError> {
        if self.engine.lookback_minutes < 2 {
            return Err(EdgewiseError::Config(format!(
                "engine.lookback_minutes must be at least 2, got {}",
                self.engine.lookback_minutes
            )));
        }
        let base = self.engine.base_interval_minutes;
        if !base.is_finite() || base <= 0.0 {
            return Err(EdgewiseError::Config(format!(
                "engine.base_interval_minutes must be positive, got {base}"
            )));
        }
        self.robust.validate()
    }
}
