//! gexlab configuration management
//!
//! Settings come from `gexlab.toml`, `GEXLAB_*` environment variables and
//! command-line flags.
//!
//! Priority (highest to lowest):
//! 1. CLI arguments
//! 2. Environment variables
//! 3. Config file
//! 4. Default values

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use gex_analytics::filter::DEFAULT_STRIKE_RADIUS;
use gex_analytics::levels::{StrikeStep, DEFAULT_CAGE_WIDTH, DEFAULT_STRIKE_STEP, DEFAULT_TOP_N};
use gex_analytics::quant_power::{DEFAULT_RISK_FREE_RATE, DEFAULT_VANNA_WEIGHT};
use gex_analytics::AnalyticsParams;
use gex_core::types::Date;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Config file read from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "gexlab.toml";

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid {name}: {value} ({reason})")]
    InvalidValue {
        name: String,
        value: String,
        reason: &'static str,
    },

    #[error("Configuration file error: {0}")]
    FileError(String),

    #[error("Environment variable error: {0}")]
    EnvError(String),
}

/// Log levels accepted by the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl LogLevel {
    /// Convert log level to tracing filter string
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

fn deserialize_log_level<'de, D>(deserializer: D) -> Result<LogLevel, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    LogLevel::from_str(&s).map_err(serde::de::Error::custom)
}

/// `[analytics]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Risk-free rate for recomputed Greeks
    pub risk_free_rate: f64,
    /// Vanna weight in the quant power blend, in [0, 1]
    pub vanna_weight: f64,
    /// Gamma cage half-width in strike steps
    pub cage_width: u32,
    /// Number of power zones
    pub top_n: usize,
    /// Strikes kept each side of ATM by the strike-window filter
    pub strike_radius: usize,
    /// Nominal strike spacing
    pub strike_step: f64,
    /// Derive strike spacing from the chain, falling back to `strike_step`
    pub infer_strike_step: bool,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            vanna_weight: DEFAULT_VANNA_WEIGHT,
            cage_width: DEFAULT_CAGE_WIDTH,
            top_n: DEFAULT_TOP_N,
            strike_radius: DEFAULT_STRIKE_RADIUS,
            strike_step: DEFAULT_STRIKE_STEP,
            infer_strike_step: true,
        }
    }
}

impl AnalyticsConfig {
    /// Analytics parameters valued at `valuation_date`.
    pub fn params(&self, valuation_date: Date) -> AnalyticsParams {
        let strike_step = if self.infer_strike_step {
            StrikeStep::Observed {
                fallback: self.strike_step,
            }
        } else {
            StrikeStep::Fixed(self.strike_step)
        };
        AnalyticsParams {
            risk_free_rate: self.risk_free_rate,
            vanna_weight: self.vanna_weight,
            cage_width: self.cage_width,
            top_n: self.top_n,
            strike_radius: self.strike_radius,
            strike_step,
            valuation_date,
        }
    }
}

/// `[indices.<NAME>]` entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Contracts per lot
    pub lot_size: u32,
}

fn default_indices() -> BTreeMap<String, IndexConfig> {
    [("Nifty", 75), ("BankNifty", 25), ("Sensex", 10)]
        .into_iter()
        .map(|(name, lot_size)| (name.to_string(), IndexConfig { lot_size }))
        .collect()
}

/// Full gexlab configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GexlabConfig {
    /// Log level used when `RUST_LOG` is unset
    #[serde(deserialize_with = "deserialize_log_level")]
    pub log_level: LogLevel,
    /// Root of the `<INDEX>/<EXPIRY>/<stamp>.csv` capture tree
    pub data_dir: PathBuf,
    /// Analytics settings
    pub analytics: AnalyticsConfig,
    /// Lot sizes by index name
    pub indices: BTreeMap<String, IndexConfig>,
}

impl Default for GexlabConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            data_dir: PathBuf::from("data"),
            analytics: AnalyticsConfig::default(),
            indices: default_indices(),
        }
    }
}

impl GexlabConfig {
    /// Parse TOML text. Built-in indices stay registered unless the text
    /// overrides them.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut config: GexlabConfig = toml::from_str(content)
            .map_err(|e| ConfigError::FileError(format!("Failed to parse TOML: {}", e)))?;
        for (name, index) in default_indices() {
            config.indices.entry(name).or_insert(index);
        }
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::FileError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Apply `GEXLAB_*` overrides read through `lookup`.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup("GEXLAB_LOG_LEVEL") {
            self.log_level = LogLevel::from_str(&level)?;
        }
        if let Some(dir) = lookup("GEXLAB_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(rate) = lookup("GEXLAB_RISK_FREE_RATE") {
            self.analytics.risk_free_rate = parse_env("GEXLAB_RISK_FREE_RATE", &rate)?;
        }
        if let Some(weight) = lookup("GEXLAB_VANNA_WEIGHT") {
            self.analytics.vanna_weight = parse_env("GEXLAB_VANNA_WEIGHT", &weight)?;
        }
        Ok(())
    }

    /// Merge with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli: &CliArgs) {
        if let Some(level) = cli.log_level {
            self.log_level = level;
        }
        if let Some(dir) = &cli.data_dir {
            self.data_dir = dir.clone();
        }
        if let Some(rate) = cli.risk_free_rate {
            self.analytics.risk_free_rate = rate;
        }
        if let Some(weight) = cli.vanna_weight {
            self.analytics.vanna_weight = weight;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let a = &self.analytics;
        if !a.risk_free_rate.is_finite() {
            return Err(invalid("risk_free_rate", a.risk_free_rate, "must be finite"));
        }
        if !(0.0..=1.0).contains(&a.vanna_weight) {
            return Err(invalid("vanna_weight", a.vanna_weight, "must be in [0, 1]"));
        }
        if !(a.strike_step.is_finite() && a.strike_step > 0.0) {
            return Err(invalid("strike_step", a.strike_step, "must be positive"));
        }
        if a.strike_radius == 0 {
            return Err(invalid("strike_radius", 0, "must be at least 1"));
        }
        if let Some((name, _)) = self.indices.iter().find(|(_, index)| index.lot_size == 0) {
            return Err(invalid(format!("lot_size for {name}"), 0, "must be positive"));
        }
        Ok(())
    }

    /// Lot size registered for `index`, matched case-insensitively.
    pub fn lot_size(&self, index: &str) -> Option<u32> {
        self.indices
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(index))
            .map(|(_, config)| config.lot_size)
    }
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::EnvError(format!("{key}={value} is not a number")))
}

fn invalid(name: impl Into<String>, value: impl ToString, reason: &'static str) -> ConfigError {
    ConfigError::InvalidValue {
        name: name.into(),
        value: value.to_string(),
        reason,
    }
}

/// Configuration overrides taken from the command line
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Config file path
    pub config_file: Option<PathBuf>,
    /// Log level override
    pub log_level: Option<LogLevel>,
    /// Data directory override
    pub data_dir: Option<PathBuf>,
    /// Risk-free rate override
    pub risk_free_rate: Option<f64>,
    /// Vanna weight override
    pub vanna_weight: Option<f64>,
}

/// Build configuration from all sources
///
/// An explicit `--config` must exist; otherwise [`DEFAULT_CONFIG_FILE`] is
/// read when present.
pub fn build_config(cli: &CliArgs) -> Result<GexlabConfig, ConfigError> {
    build_config_with(cli, |key| std::env::var(key).ok())
}

/// [`build_config`] with an injectable environment.
pub fn build_config_with<F>(cli: &CliArgs, env: F) -> Result<GexlabConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let default_path = Path::new(DEFAULT_CONFIG_FILE);
    let mut config = match &cli.config_file {
        Some(path) => GexlabConfig::from_file(path)?,
        None if default_path.is_file() => GexlabConfig::from_file(default_path)?,
        None => GexlabConfig::default(),
    };

    config.apply_env_with(env)?;
    config.merge_with_cli(cli);
    config.validate()?;

    Ok(config)
}
