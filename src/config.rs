//! Tool configuration.
//!
//! Handles loading, validating, and merging `microsite.toml`. The file is
//! sparse: stock defaults are the base layer and the file overrides only the
//! keys it names.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [brand]
//! name = "The Hartford"       # Insurer shown in the tagline and copyright
//! logo = "/placeholder.svg?height=30&width=120&text=The+Hartford"
//! heading = "During Annual Enrollment you can enroll"
//!
//! [placeholders]
//! images = ["/placeholder.svg?height=200&width=300&text=Benefit+1", ...]
//!
//! [upload]
//! accepted_suffixes = [".xlsx", ".csv"]
//! delay_ms = 2000            # Simulated processing time
//!
//! [publish]
//! host = "build.nayya.com"   # Published URL: https://{host}/employer-{token}
//! delay_ms = 3000            # Simulated publish time
//! ```
//!
//! Unknown keys are rejected to catch typos early.

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

/// Tool configuration loaded from `microsite.toml`.
///
/// All fields have defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Insurer branding around the employer's content.
    pub brand: BrandConfig,
    /// Images used for empty logo, hero and tile slots.
    pub placeholders: PlaceholderConfig,
    /// Spreadsheet upload settings.
    pub upload: UploadConfig,
    /// Publish target settings.
    pub publish: PublishConfig,
}

impl Config {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.brand.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "brand.name must not be empty".into(),
            ));
        }
        if self.placeholders.images.is_empty() {
            return Err(ConfigError::Validation(
                "placeholders.images must not be empty".into(),
            ));
        }
        if self.placeholders.images.iter().any(|i| i.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "placeholders.images entries must not be empty".into(),
            ));
        }
        if self.upload.accepted_suffixes.is_empty() {
            return Err(ConfigError::Validation(
                "upload.accepted_suffixes must not be empty".into(),
            ));
        }
        if let Some(bad) = self
            .upload
            .accepted_suffixes
            .iter()
            .find(|s| !s.starts_with('.') || s.len() < 2)
        {
            return Err(ConfigError::Validation(format!(
                "upload.accepted_suffixes entry {bad:?} must look like \".xlsx\""
            )));
        }
        let host = &self.publish.host;
        if host.is_empty() || host.contains("://") || host.contains('/') {
            return Err(ConfigError::Validation(
                "publish.host must be a bare host name like \"example.com\"".into(),
            ));
        }
        Ok(())
    }
}

/// Insurer branding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrandConfig {
    /// Insurer name, e.g. in "Your benefits provided by X from {name}".
    pub name: String,
    /// Insurer logo shown before the employer logo.
    pub logo: String,
    /// Headline above the enrollment dates.
    pub heading: String,
}

impl Default for BrandConfig {
    fn default() -> Self {
        Self {
            name: "The Hartford".to_string(),
            logo: "/placeholder.svg?height=30&width=120&text=The+Hartford".to_string(),
            heading: "During Annual Enrollment you can enroll".to_string(),
        }
    }
}

/// The placeholder media library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlaceholderConfig {
    pub images: Vec<String>,
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        Self {
            images: (1..=6)
                .map(|n| format!("/placeholder.svg?height=200&width=300&text=Benefit+{n}"))
                .collect(),
        }
    }
}

/// Spreadsheet upload settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadConfig {
    /// File name suffixes accepted for upload, including the dot.
    pub accepted_suffixes: Vec<String>,
    /// Simulated processing delay in milliseconds.
    pub delay_ms: u64,
}

impl UploadConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            accepted_suffixes: vec![".xlsx".to_string(), ".csv".to_string()],
            delay_ms: 2000,
        }
    }
}

/// Publish target settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PublishConfig {
    /// Host of published microsites.
    pub host: String,
    /// Simulated publish delay in milliseconds.
    pub delay_ms: u64,
}

impl PublishConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            host: "build.nayya.com".to_string(),
            delay_ms: 3000,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(Config::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
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
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
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

/// Load config from a file, falling back to stock defaults when it is absent.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let overlay = load_raw_config(path)?;
    if overlay.is_some() {
        tracing::debug!(path = %path.display(), "loaded config file");
    }
    resolve_config(stock_defaults_value(), overlay)
}

/// Returns a fully-commented stock `microsite.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Microsite Configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Insurer branding
# ---------------------------------------------------------------------------
[brand]
# Insurer name, used in the tagline and the footer copyright line.
name = "The Hartford"

# Insurer logo, shown before the employer logo in the header.
logo = "/placeholder.svg?height=30&width=120&text=The+Hartford"

# Headline above the enrollment dates.
heading = "During Annual Enrollment you can enroll"

# ---------------------------------------------------------------------------
# Placeholder media library
# ---------------------------------------------------------------------------
[placeholders]
# Empty logo, hero and tile image slots get one of these, picked at random
# on every render.
images = [
    "/placeholder.svg?height=200&width=300&text=Benefit+1",
    "/placeholder.svg?height=200&width=300&text=Benefit+2",
    "/placeholder.svg?height=200&width=300&text=Benefit+3",
    "/placeholder.svg?height=200&width=300&text=Benefit+4",
    "/placeholder.svg?height=200&width=300&text=Benefit+5",
    "/placeholder.svg?height=200&width=300&text=Benefit+6",
]

# ---------------------------------------------------------------------------
# Spreadsheet upload
# ---------------------------------------------------------------------------
[upload]
# File name suffixes accepted for upload.
accepted_suffixes = [".xlsx", ".csv"]

# Simulated processing time in milliseconds.
delay_ms = 2000

# ---------------------------------------------------------------------------
# Publishing
# ---------------------------------------------------------------------------
[publish]
# Published sites live at https://{host}/employer-{token}.
host = "build.nayya.com"

# Simulated publish time in milliseconds.
delay_ms = 3000
"##
}
