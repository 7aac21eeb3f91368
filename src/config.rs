//! Configuration module.
//!
//! Handles loading, validating, and merging the `sapa-iiif.toml` file. Stock
//! defaults are the base layer; a user file only needs the keys it wants to
//! override.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [manifest]
//! languages = ["en", "de", "fr", "it"]  # Languages plain text is expanded into
//! rights = "http://creativecommons.org/licenses/by-sa/4.0/"
//! # copyright = "© SAPA"              # Adds a requiredStatement when set
//!
//! [resolver]
//! timeout_secs = 30          # Per-request timeout for info.json lookups
//! # user_agent = "sapa-iiif"  # Defaults to sapa-iiif/<version>
//! max_retries = 5            # Retries on 429/500/502/503/504 and connect errors
//! min_delay_ms = 1000        # First backoff delay, doubled per retry
//! max_delay_ms = 30000       # Backoff ceiling
//!
//! [storage]
//! endpoint = "https://os.zhdk.cloud.switch.ch"
//! region = "zhdk"
//! default_bucket = "performing-arts-iiif-source"
//!
//! [processing]
//! max_processes = 4          # Max parallel lookups (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early. Storage credentials are
//! never read from this file; they come from the command line or environment.

use crate::multilingual::Languages;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `sapa-iiif.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Organization-wide manifest settings.
    pub manifest: ManifestConfig,
    /// `info.json` lookup settings.
    pub resolver: ResolverConfig,
    /// Object storage location.
    pub storage: StorageConfig,
    /// Parallel lookup settings.
    pub processing: ProcessingConfig,
}

impl Config {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.manifest.languages.is_empty() {
            return Err(ConfigError::Validation(
                "manifest.languages must not be empty".into(),
            ));
        }
        if self.manifest.rights.trim().is_empty() {
            return Err(ConfigError::Validation(
                "manifest.rights must not be empty".into(),
            ));
        }
        if self.resolver.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "resolver.timeout_secs must be non-zero".into(),
            ));
        }
        if self.resolver.min_delay_ms > self.resolver.max_delay_ms {
            return Err(ConfigError::Validation(
                "resolver.min_delay_ms must not exceed resolver.max_delay_ms".into(),
            ));
        }
        if self.storage.default_bucket.is_empty() {
            return Err(ConfigError::Validation(
                "storage.default_bucket must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Organization-wide values merged into every manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManifestConfig {
    /// Language codes plain text is repeated under.
    pub languages: Languages,
    /// Rights URI for the `rights` property.
    pub rights: String,
    /// Copyright line. When set, manifests carry a `requiredStatement`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            languages: Languages::default(),
            rights: "http://creativecommons.org/licenses/by-sa/4.0/".to_string(),
            copyright: None,
        }
    }
}

/// Retry and transport settings for dimension lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Retries after the first attempt, transient failures only.
    pub max_retries: usize,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl ResolverConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn min_delay(&self) -> Duration {
        Duration::from_millis(self.min_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!("sapa-iiif/", env!("CARGO_PKG_VERSION")).to_string(),
            max_retries: 5,
            min_delay_ms: 1000,
            max_delay_ms: 30_000,
        }
    }
}

/// S3-compatible object storage location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    pub endpoint: String,
    pub region: String,
    pub default_bucket: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://os.zhdk.cloud.switch.ch".to_string(),
            region: "zhdk".to_string(),
            default_bucket: "performing-arts-iiif-source".to_string(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Upper bound on concurrent `info.json` lookups. Unset means one per
    /// core; larger values are capped at the core count.
    pub max_processes: Option<usize>,
}

/// Size of the lookup pool: `max_processes` clamped to `1..=cores`.
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Layering: stock defaults ← user file
// =============================================================================

/// `Config::default()` as a TOML table, the bottom layer.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(Config::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Deep-merge two TOML values. Tables merge per key; any other overlay value
/// replaces the base outright.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Apply the user layer (if any), deserialize, validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<Config, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: Config = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the given file, falling back to stock defaults when the
/// file does not exist.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Documented stock config, printed by `gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# sapa-iiif Configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.
#
# Storage credentials are not configured here. Pass --access-key and
# --secret-key, or set SAPA_IIIF_ACCESS_KEY and SAPA_IIIF_SECRET_KEY.

# ---------------------------------------------------------------------------
# Manifest
# ---------------------------------------------------------------------------
[manifest]
# Languages that plain-text labels and metadata values are repeated under.
languages = ["en", "de", "fr", "it"]

# Rights URI emitted as the manifest "rights" property.
rights = "http://creativecommons.org/licenses/by-sa/4.0/"

# Copyright line. When set, every manifest carries a requiredStatement.
# copyright = "Stiftung SAPA"

# ---------------------------------------------------------------------------
# Dimension lookups (GET {image}/info.json)
# ---------------------------------------------------------------------------
[resolver]
timeout_secs = 30
# Defaults to "sapa-iiif/<version>".
# user_agent = "sapa-iiif"

# Retries on HTTP 429/500/502/503/504 and connection failures.
# A 404 is never retried.
max_retries = 5

# Exponential backoff bounds in milliseconds.
min_delay_ms = 1000
max_delay_ms = 30000

# ---------------------------------------------------------------------------
# Object storage (S3-compatible)
# ---------------------------------------------------------------------------
[storage]
endpoint = "https://os.zhdk.cloud.switch.ch"
region = "zhdk"
default_bucket = "performing-arts-iiif-source"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel dimension lookups.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
