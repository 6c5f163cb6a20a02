//! TOML-based engine configuration.
//!
//! Stores:
//! - Tick period and warning window of the rest countdown
//! - Default rest length offered by the host
//! - Haptic feedback switches, minimum pulse spacing and cue patterns
//!
//! Configuration is stored at `~/.config/restwise/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::haptics::CuePatterns;
use crate::timer::{DEFAULT_TICK_PERIOD_MS, DEFAULT_WARNING_THRESHOLD_SECS};

/// Timer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "default_tick_period_ms")]
    pub tick_period_ms: u64,
    #[serde(default = "default_warning_threshold_secs")]
    pub warning_threshold_secs: u64,
    #[serde(default = "default_rest_secs")]
    pub default_rest_secs: u64,
}

/// Haptic feedback configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HapticsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Pulses closer together than this are dropped.
    #[serde(default = "default_min_spacing_ms")]
    pub min_spacing_ms: u64,
    #[serde(default)]
    pub patterns: CuePatterns,
}

/// Engine configuration.
///
/// Serialized to/from TOML at `~/.config/restwise/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub haptics: HapticsConfig,
}

fn default_tick_period_ms() -> u64 {
    DEFAULT_TICK_PERIOD_MS
}
fn default_warning_threshold_secs() -> u64 {
    DEFAULT_WARNING_THRESHOLD_SECS
}
fn default_rest_secs() -> u64 {
    60
}
fn default_true() -> bool {
    true
}
fn default_min_spacing_ms() -> u64 {
    300
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: default_tick_period_ms(),
            warning_threshold_secs: default_warning_threshold_secs(),
            default_rest_secs: default_rest_secs(),
        }
    }
}

impl Default for HapticsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_spacing_ms: default_min_spacing_ms(),
            patterns: CuePatterns::default(),
        }
    }
}

/// Returns `~/.config/restwise[-dev]/` based on RESTWISE_ENV.
///
/// Set RESTWISE_ENV=dev to use the development directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("RESTWISE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("restwise-dev")
    } else {
        base_dir.join("restwise")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DirUnavailable(e.to_string()))?;
    Ok(dir)
}

impl EngineConfig {
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(config_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults there if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed, or if the
    /// default config cannot be written.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            let cfg = Self::default();
            cfg.save_to(&path)?;
            Ok(cfg)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let cfg: EngineConfig = toml::from_str(&content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// # Errors
    ///
    /// Rejects a zero tick period, which would spin the tick loop, and a
    /// zero default rest, which no countdown accepts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timing.tick_period_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timing.tick_period_ms".into(),
                message: "must be greater than zero".into(),
            });
        }
        if self.timing.default_rest_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timing.default_rest_secs".into(),
                message: "must be at least 1 second".into(),
            });
        }
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key. The value is parsed to the
    /// type of the existing entry.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown keys, unparsable values, or a result
    /// that fails validation. `self` is unchanged on error.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self)
            .map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        set_json_value_by_path(&mut json, key, value)?;
        let updated: EngineConfig =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }
}

fn get_json_value_by_path<'a>(root: &'a serde_json::Value, key: &str) -> Option<&'a serde_json::Value> {
    if key.is_empty() {
        return None;
    }

    let mut current = root;
    for part in key.split('.') {
        current = current.get(part)?;
    }
    Some(current)
}

fn set_json_value_by_path(
    root: &mut serde_json::Value,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    let unknown = || ConfigError::UnknownKey(key.to_string());
    let invalid = |message: String| ConfigError::InvalidValue {
        key: key.to_string(),
        message,
    };

    let mut parts = key.split('.').peekable();
    if key.is_empty() {
        return Err(unknown());
    }

    let mut current = root;
    while let Some(part) = parts.next() {
        if parts.peek().is_some() {
            current = current.get_mut(part).ok_or_else(unknown)?;
            continue;
        }

        let obj = current.as_object_mut().ok_or_else(unknown)?;
        let existing = obj.get(part).ok_or_else(unknown)?;
        let new_value = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
            ),
            serde_json::Value::Number(_) => serde_json::Value::Number(
                value
                    .parse::<u64>()
                    .map_err(|_| invalid(format!("cannot parse '{value}' as integer")))?
                    .into(),
            ),
            serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
            }
            _ => serde_json::Value::String(value.into()),
        };
        obj.insert(part.to_string(), new_value);
        return Ok(());
    }

    Err(unknown())
}
