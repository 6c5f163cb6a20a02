//! Terminal stand-in for a vibration motor.

use std::io::{IsTerminal, Write};

use restwise_core::{HapticDriver, HapticError, VibrationPattern};

/// Rings the terminal bell once per "on" segment of a pattern.
#[derive(Debug, Default)]
pub struct TerminalBell;

impl HapticDriver for TerminalBell {
    fn is_supported(&self) -> bool {
        std::io::stderr().is_terminal()
    }

    fn vibrate(&mut self, pattern: &VibrationPattern) -> Result<(), HapticError> {
        let pulses = pattern.durations_ms().len().div_ceil(2);
        let mut err = std::io::stderr();
        err.write_all("\x07".repeat(pulses).as_bytes())
            .and_then(|()| err.flush())
            .map_err(|e| HapticError::Device(e.to_string()))
    }
}
