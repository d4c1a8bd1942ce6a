//! Configuration resolution and path discovery.
//!
//! Resolution order for each parameter, highest first:
//! CLI overrides → environment variables → config file → built-in defaults.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::eval::{DoyRange, EvalConfig, MetricScope};
use crate::snapshot::{hash_bytes, ConfigSnapshot};
use crate::validate::{validate_config, ValidationError};

/// Environment variable names.
pub const ENV_CONFIG_PATH: &str = "MOWING_EVAL_CONFIG";
pub const ENV_TOLERANCE: &str = "MOWING_TOLERANCE";
pub const ENV_VALID_RANGE: &str = "MOWING_VALID_RANGE";
pub const ENV_EVENT_MIN_DIFFERENCE: &str = "MOWING_EVENT_MIN_DIFFERENCE";
pub const ENV_METRIC_SCOPE: &str = "MOWING_METRIC_SCOPE";

/// Standard config file name.
const CONFIG_FILENAME: &str = "config.toml";

/// Application name for XDG directories.
const APP_NAME: &str = "mowing-eval";

/// Errors that can occur during config loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("Invalid TOML in config file {}: {source}", .path.display())]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("I/O error reading {}: {source}", .path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid value in {variable}: {message}")]
    InvalidOverride { variable: String, message: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Where the config file was found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided via CLI argument.
    CliArgument,

    /// Set via environment variable.
    Environment,

    /// Found in XDG config directory.
    XdgConfig,

    /// Using built-in defaults.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// Individual parameter overrides. `None` leaves the lower layer in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub tolerance: Option<u32>,
    pub valid_range: Option<DoyRange>,
    pub event_min_difference: Option<u32>,
    pub metric_scope: Option<MetricScope>,
}

impl ConfigOverrides {
    /// Read overrides from environment variables through `lookup`.
    ///
    /// A set but unparseable variable is an error, not a silent fallback.
    pub fn from_env_with<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(ConfigOverrides {
            tolerance: parse_env(&lookup, ENV_TOLERANCE)?,
            valid_range: parse_env(&lookup, ENV_VALID_RANGE)?,
            event_min_difference: parse_env(&lookup, ENV_EVENT_MIN_DIFFERENCE)?,
            metric_scope: parse_env(&lookup, ENV_METRIC_SCOPE)?,
        })
    }

    /// Apply onto `config`, recording the names of overridden parameters.
    fn apply(&self, config: &mut EvalConfig, applied: &mut Vec<String>) {
        if let Some(v) = self.tolerance {
            config.tolerance = v;
            applied.push("tolerance".to_string());
        }
        if let Some(v) = self.valid_range {
            config.valid_range = v;
            applied.push("valid_range".to_string());
        }
        if let Some(v) = self.event_min_difference {
            config.event_min_difference = v;
            applied.push("event_min_difference".to_string());
        }
        if let Some(v) = self.metric_scope {
            config.metric_scope = v;
            applied.push("metric_scope".to_string());
        }
    }
}

fn parse_env<T, F>(lookup: &F, variable: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(variable) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidOverride {
                variable: variable.to_string(),
                message: e.to_string(),
            }),
    }
}

/// Configuration resolution options.
#[derive(Debug, Clone, Default)]
pub struct ConfigOptions {
    /// Explicit config file path (highest priority for the file layer).
    pub config_path: Option<PathBuf>,
    /// Explicit XDG config home, mainly for tests.
    pub config_home: Option<PathBuf>,
    /// Overrides from CLI flags.
    pub cli: ConfigOverrides,
}

/// Resolved configuration with provenance information.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: EvalConfig,
    pub path: Option<PathBuf>,
    pub hash: Option<String>,
    pub source: ConfigSource,
    pub overrides: Vec<String>,
}

impl ResolvedConfig {
    /// Create a config snapshot for report metadata.
    pub fn snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot {
            config: self.config.clone(),
            config_path: self.path.clone(),
            config_hash: self.hash.clone(),
            source: self.source.to_string(),
            overrides: self.overrides.clone(),
        }
    }
}

/// Load configuration from the process environment.
pub fn load_config(options: &ConfigOptions) -> Result<ResolvedConfig, ConfigError> {
    load_config_with(options, |name| std::env::var(name).ok())
}

/// Load configuration with an explicit environment lookup.
pub fn load_config_with<F>(options: &ConfigOptions, lookup: F) -> Result<ResolvedConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let (path, source) = resolve_config_path(options, &lookup)?;

    let (mut config, hash) = match &path {
        Some(p) => {
            let (config, hash) = read_config_file(p)?;
            (config, Some(hash))
        }
        None => (EvalConfig::default(), None),
    };

    let mut overrides = Vec::new();
    ConfigOverrides::from_env_with(&lookup)?.apply(&mut config, &mut overrides);
    options.cli.apply(&mut config, &mut overrides);

    validate_config(&config)?;

    Ok(ResolvedConfig {
        config,
        path,
        hash,
        source,
        overrides,
    })
}

/// Resolve the config file path.
///
/// 1. Explicit CLI path (must exist)
/// 2. MOWING_EVAL_CONFIG (must exist)
/// 3. $XDG_CONFIG_HOME/mowing-eval/config.toml (if present)
/// 4. Built-in defaults (None)
fn resolve_config_path<F>(
    options: &ConfigOptions,
    lookup: &F,
) -> Result<(Option<PathBuf>, ConfigSource), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = &options.config_path {
        if !path.exists() {
            return Err(ConfigError::NotFound { path: path.clone() });
        }
        return Ok((Some(path.clone()), ConfigSource::CliArgument));
    }

    if let Some(env_path) = lookup(ENV_CONFIG_PATH).filter(|v| !v.trim().is_empty()) {
        let path = PathBuf::from(env_path);
        if !path.exists() {
            return Err(ConfigError::NotFound { path });
        }
        return Ok((Some(path), ConfigSource::Environment));
    }

    let config_home = options
        .config_home
        .clone()
        .or_else(|| lookup("XDG_CONFIG_HOME").map(PathBuf::from))
        .or_else(dirs::config_dir);
    if let Some(home) = config_home {
        let candidate = home.join(APP_NAME).join(CONFIG_FILENAME);
        if candidate.is_file() {
            return Ok((Some(candidate), ConfigSource::XdgConfig));
        }
    }

    Ok((None, ConfigSource::BuiltinDefault))
}

fn read_config_file(path: &Path) -> Result<(EvalConfig, String), ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let config: EvalConfig = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok((config, hash_bytes(content.as_bytes())))
}
