//! Error types for restwise-core.
//!
//! Only a handful of conditions are surfaced as errors. Redundant commands,
//! ticks after teardown and missing haptic hardware are absorbed where they
//! happen and never reach this module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by timer commands.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimingError {
    /// A countdown was started with a non-positive duration.
    #[error("Invalid rest duration: {seconds}s (must be at least 1 second)")]
    InvalidDuration { seconds: i64 },

    /// The session task has already ended and cannot accept commands.
    #[error("Workout session is closed")]
    SessionClosed,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Home/config directory could not be prepared
    #[error("Configuration directory unavailable: {0}")]
    DirUnavailable(String),
}

/// Errors reported by a haptic driver. The dispatcher swallows these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HapticError {
    /// The platform has no vibration actuator.
    #[error("Haptic feedback is not supported on this device")]
    Unsupported,

    /// The actuator rejected the pattern.
    #[error("Haptic device error: {0}")]
    Device(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}
