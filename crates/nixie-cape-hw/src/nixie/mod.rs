//! Nixie tube module.
//!
//! Provides control over the tube's high-voltage boost supply via PWM.

mod config;
mod supply;
mod sysfs;

pub use config::{NixieConfig, DEFAULT_PWM_DUTY_CYCLE, DEFAULT_PWM_FREQUENCY_HZ};
pub use supply::{parse_c_integer, NixieSupply, PwmOutput, PwmTiming, RunIndicator};
pub use sysfs::{SysfsLed, SysfsPwm};
