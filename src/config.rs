//! Tool and pipeline configuration.
//!
//! Handles loading, validating, and merging `image-wrangler.toml`. Stock
//! defaults are the base layer; a user file overrides only the keys it sets.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [tools]
//! convert = "convert"       # Raster tool binary
//! identify = "identify"     # Inspection binary
//! timeout_secs = 10         # Per-invocation timeout
//! quiet_warnings = true     # Pass -quiet to identify
//!
//! [transform]
//! cascade = false           # Variant N+1 reads variant N's output
//! parallel = false          # Render independent variants on a thread pool
//! # scratch_dir = "/tmp"    # Where generated output paths are placed
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "image-wrangler.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `image-wrangler.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WranglerConfig {
    /// External tool locations and invocation settings.
    pub tools: ToolsConfig,
    /// Transform pipeline defaults.
    pub transform: TransformConfig,
}

impl WranglerConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tools.convert.trim().is_empty() {
            return Err(ConfigError::Validation(
                "tools.convert must not be empty".into(),
            ));
        }
        if self.tools.identify.trim().is_empty() {
            return Err(ConfigError::Validation(
                "tools.identify must not be empty".into(),
            ));
        }
        if self.tools.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "tools.timeout_secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsConfig {
    pub convert: String,
    pub identify: String,
    /// Seconds before a running tool is killed.
    pub timeout_secs: u64,
    /// Suppress non-fatal warnings from `identify`.
    pub quiet_warnings: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            convert: "convert".to_string(),
            identify: "identify".to_string(),
            timeout_secs: 10,
            quiet_warnings: true,
        }
    }
}

impl ToolsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransformConfig {
    /// Each variant after the first reads the previous variant's output.
    pub cascade: bool,
    /// Render variants concurrently. Ignored when cascading.
    pub parallel: bool,
    /// Directory for generated output paths. Falls back to the system temp dir.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scratch_dir: Option<PathBuf>,
}

/// [`WranglerConfig::default`] as a TOML table, the layer `image-wrangler.toml` overrides.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(WranglerConfig::default())?)
}

/// Overlay `overlay` onto `base`. A `[tools]` section that sets only
/// `timeout_secs` keeps the stock `convert` and `identify` paths.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                let value = match base_table.remove(&key) {
                    Some(stock) => merge_toml(stock, value),
                    None => value,
                };
                base_table.insert(key, value);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Parse `image-wrangler.toml` without applying defaults. A missing file is
/// `Ok(None)`; running without a config file is normal.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(path)?;
    Ok(Some(toml::from_str(&text)?))
}

/// Build the effective [`WranglerConfig`] and reject unusable values such as
/// a zero timeout.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<WranglerConfig, ConfigError> {
    let config: WranglerConfig = match overlay {
        Some(user) => merge_toml(base, user),
        None => base,
    }
    .try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the file at `path`, falling back to stock defaults.
pub fn load_config(path: &Path) -> Result<WranglerConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `image-wrangler.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Image Wrangler Configuration
# ============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# External tools
# ---------------------------------------------------------------------------
[tools]
# ImageMagick binary used to render variants.
convert = "convert"

# ImageMagick binary used to inspect source and rendered files.
identify = "identify"

# Seconds a single tool invocation may run before it is killed.
timeout_secs = 10

# Pass -quiet to identify so harmless warnings do not pollute its output.
quiet_warnings = true

# ---------------------------------------------------------------------------
# Transform pipeline
# ---------------------------------------------------------------------------
[transform]
# Each variant after the first reads the previous variant's output instead of
# the original source. Order variants from largest to smallest.
cascade = false

# Render variants on a thread pool. Has no effect when cascading.
parallel = false

# Directory for outputs of variants that do not name a filepath.
# Omit to use the system temp directory.
# scratch_dir = "/tmp"
"##
}
