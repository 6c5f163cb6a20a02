//! Vibration feedback dispatch.
//!
//! Timers speak in named cues; the dispatcher turns a cue into a vibration
//! pattern and hands it to a platform [`HapticDriver`]. Pulses closer
//! together than `min_spacing_ms` are dropped (not queued), so a burst of
//! transitions cannot saturate the actuator.

use std::fmt;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::clock::SharedTimeSource;
use crate::config::HapticsConfig;
use crate::error::HapticError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cue {
    Start,
    Warning,
    CompletionShort,
    CompletionLong,
}

impl Cue {
    pub fn name(self) -> &'static str {
        match self {
            Cue::Start => "start",
            Cue::Warning => "warning",
            Cue::CompletionShort => "completion-short",
            Cue::CompletionLong => "completion-long",
        }
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Alternating on/off durations in milliseconds, starting with "on".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VibrationPattern(pub Vec<u64>);

impl VibrationPattern {
    pub fn new(durations_ms: impl Into<Vec<u64>>) -> Self {
        Self(durations_ms.into())
    }

    pub fn durations_ms(&self) -> &[u64] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&d| d == 0)
    }
}

/// Pattern table, one entry per cue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CuePatterns {
    #[serde(default = "default_start")]
    pub start: VibrationPattern,
    #[serde(default = "default_warning")]
    pub warning: VibrationPattern,
    #[serde(default = "default_completion_short")]
    pub completion_short: VibrationPattern,
    #[serde(default = "default_completion_long")]
    pub completion_long: VibrationPattern,
}

fn default_start() -> VibrationPattern {
    VibrationPattern::new([120])
}
fn default_warning() -> VibrationPattern {
    VibrationPattern::new([60])
}
fn default_completion_short() -> VibrationPattern {
    VibrationPattern::new([250])
}
fn default_completion_long() -> VibrationPattern {
    VibrationPattern::new([400, 150, 400])
}

impl Default for CuePatterns {
    fn default() -> Self {
        Self {
            start: default_start(),
            warning: default_warning(),
            completion_short: default_completion_short(),
            completion_long: default_completion_long(),
        }
    }
}

impl CuePatterns {
    pub fn get(&self, cue: Cue) -> &VibrationPattern {
        match cue {
            Cue::Start => &self.start,
            Cue::Warning => &self.warning,
            Cue::CompletionShort => &self.completion_short,
            Cue::CompletionLong => &self.completion_long,
        }
    }

    /// Reverse lookup, for drivers and tests that only see patterns.
    pub fn cue_for(&self, pattern: &VibrationPattern) -> Option<Cue> {
        [Cue::Start, Cue::Warning, Cue::CompletionShort, Cue::CompletionLong]
            .into_iter()
            .find(|&cue| self.get(cue) == pattern)
    }
}

/// Platform vibration capability.
pub trait HapticDriver: Send + fmt::Debug {
    fn is_supported(&self) -> bool {
        true
    }

    /// Play `pattern`. Should return promptly; playback may continue after.
    fn vibrate(&mut self, pattern: &VibrationPattern) -> Result<(), HapticError>;
}

/// Driver for devices without an actuator.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDriver;

impl HapticDriver for NoopDriver {
    fn is_supported(&self) -> bool {
        false
    }

    fn vibrate(&mut self, _pattern: &VibrationPattern) -> Result<(), HapticError> {
        Err(HapticError::Unsupported)
    }
}

/// Keeps every pattern it is asked to play. Clones share the log.
#[derive(Debug, Clone, Default)]
pub struct RecordingDriver {
    played: Arc<Mutex<Vec<VibrationPattern>>>,
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn played(&self) -> Vec<VibrationPattern> {
        self.played.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl HapticDriver for RecordingDriver {
    fn vibrate(&mut self, pattern: &VibrationPattern) -> Result<(), HapticError> {
        if let Ok(mut played) = self.played.lock() {
            played.push(pattern.clone());
        }
        Ok(())
    }
}

/// Rate-limited cue sink shared by both timers of a session.
#[derive(Debug)]
pub struct HapticDispatcher {
    driver: Box<dyn HapticDriver>,
    clock: SharedTimeSource,
    patterns: CuePatterns,
    enabled: bool,
    min_spacing_ms: u64,
    last_pulse_ms: Option<u64>,
}

impl HapticDispatcher {
    pub fn new(driver: Box<dyn HapticDriver>, clock: SharedTimeSource) -> Self {
        Self::from_config(&HapticsConfig::default(), driver, clock)
    }

    pub fn from_config(
        config: &HapticsConfig,
        driver: Box<dyn HapticDriver>,
        clock: SharedTimeSource,
    ) -> Self {
        Self {
            driver,
            clock,
            patterns: config.patterns.clone(),
            enabled: config.enabled,
            min_spacing_ms: config.min_spacing_ms,
            last_pulse_ms: None,
        }
    }

    pub fn patterns(&self) -> &CuePatterns {
        &self.patterns
    }

    pub fn min_spacing_ms(&self) -> u64 {
        self.min_spacing_ms
    }

    /// Emit the pattern for `cue`. Returns whether a pulse was sent.
    ///
    /// Never fails: missing hardware, disabled haptics, rate limiting and
    /// driver errors all just drop the cue.
    pub fn dispatch(&mut self, cue: Cue) -> bool {
        if !self.enabled || !self.driver.is_supported() {
            return false;
        }
        let pattern = self.patterns.get(cue);
        if pattern.is_empty() {
            return false;
        }

        let now = self.clock.now_ms();
        if let Some(last) = self.last_pulse_ms {
            if now.saturating_sub(last) < self.min_spacing_ms {
                trace!(%cue, since_last_ms = now.saturating_sub(last), "haptic cue dropped");
                return false;
            }
        }

        match self.driver.vibrate(pattern) {
            Ok(()) => {
                self.last_pulse_ms = Some(now);
                debug!(%cue, "haptic cue dispatched");
                true
            }
            Err(HapticError::Unsupported) => false,
            Err(e) => {
                warn!(%cue, error = %e, "haptic driver failed");
                false
            }
        }
    }
}
