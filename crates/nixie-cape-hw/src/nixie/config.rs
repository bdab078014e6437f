//! Nixie tube supply configuration.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Boost converter PWM frequency used when none is configured.
pub const DEFAULT_PWM_FREQUENCY_HZ: u32 = 9250;

/// Boost converter duty cycle used when none is configured.
pub const DEFAULT_PWM_DUTY_CYCLE: u32 = 35;

/// PWM settings of the tube's boost supply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NixieConfig {
    /// PWM frequency in Hz.
    #[serde(default)]
    pub pwm_frequency: Option<u32>,

    /// Duty cycle in percent.
    #[serde(default)]
    pub pwm_duty_cycle: Option<u32>,
}

impl NixieConfig {
    /// Returns the PWM frequency, warning when falling back to the default.
    pub fn frequency_hz(&self) -> u32 {
        self.pwm_frequency.unwrap_or_else(|| {
            warn!(
                "could not read pwm-frequency, using default {}",
                DEFAULT_PWM_FREQUENCY_HZ
            );
            DEFAULT_PWM_FREQUENCY_HZ
        })
    }

    /// Returns the duty cycle, warning when falling back to the default.
    pub fn duty_percent(&self) -> u32 {
        self.pwm_duty_cycle.unwrap_or_else(|| {
            warn!(
                "could not read pwm-duty-cycle, using default {}",
                DEFAULT_PWM_DUTY_CYCLE
            );
            DEFAULT_PWM_DUTY_CYCLE
        })
    }
}
