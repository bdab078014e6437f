//! Configuration management.

use anyhow::{Context, Result};
use nixie_cape_hw::{NixieConfig, VfdConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// VFD configuration
    #[serde(default)]
    pub vfd: VfdSection,

    /// Nixie tube configuration
    #[serde(default)]
    pub nixie: NixieSection,

    /// D-Bus configuration
    #[serde(default)]
    pub dbus: DbusConfig,
}

/// VFD device and wiring.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct VfdSection {
    /// spidev node the segment driver is attached to
    #[serde(default = "default_vfd_device")]
    pub device: String,

    /// SPI clock in Hz
    #[serde(default = "default_spi_speed")]
    pub spi_speed: u32,

    /// Digit and segment wiring
    #[serde(flatten)]
    pub wiring: VfdConfig,
}

impl Default for VfdSection {
    fn default() -> Self {
        Self {
            device: default_vfd_device(),
            spi_speed: default_spi_speed(),
            wiring: VfdConfig::default(),
        }
    }
}

/// Nixie tube supply.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NixieSection {
    /// Whether to drive the tube supply at all
    #[serde(default = "default_nixie_enable")]
    pub enable: bool,

    /// Exported PWM channel directory
    #[serde(default = "default_pwm_path")]
    pub pwm: PathBuf,

    /// LED class directory lit while the tube runs
    #[serde(default)]
    pub run_led: Option<PathBuf>,

    /// Power the tube as soon as the daemon starts
    #[serde(default)]
    pub autostart: bool,

    /// PWM frequency and duty cycle
    #[serde(flatten)]
    pub pwm_settings: NixieConfig,
}

impl Default for NixieSection {
    fn default() -> Self {
        Self {
            enable: default_nixie_enable(),
            pwm: default_pwm_path(),
            run_led: None,
            autostart: false,
            pwm_settings: NixieConfig::default(),
        }
    }
}

/// D-Bus bus selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbusBusType {
    /// Try the session bus first, fall back to the system bus
    #[default]
    Auto,
    Session,
    System,
}

/// D-Bus configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DbusConfig {
    #[serde(default)]
    pub bus: DbusBusType,
}

fn default_vfd_device() -> String {
    "/dev/spidev1.0".to_string()
}

fn default_spi_speed() -> u32 {
    1_000_000
}

fn default_nixie_enable() -> bool {
    true
}

fn default_pwm_path() -> PathBuf {
    PathBuf::from("/sys/class/pwm/pwmchip0/pwm0")
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read configuration file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse configuration")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config() {
        let config: Config = toml::from_str(
            r#"
            [vfd]
            device = "/dev/spidev2.0"
            spi-speed = 500000
            digits-idx = [0, 1, 2, 3]
            segments-idx = [4, 5, 6, 7, 8, 9, 10, 11]
            digits-mask = [255, 255, 255, 255]
            refresh-rate = 20

            [nixie]
            enable = true
            pwm = "/sys/class/pwm/pwmchip3/pwm1"
            run-led = "/sys/class/leds/nixie-run"
            autostart = true
            pwm-frequency = 12000
            pwm-duty-cycle = 40

            [dbus]
            bus = "system"
            "#,
        )
        .unwrap();

        assert_eq!(config.vfd.device, "/dev/spidev2.0");
        assert_eq!(config.vfd.spi_speed, 500_000);
        assert_eq!(config.vfd.wiring.digits_idx, Some(vec![0, 1, 2, 3]));
        assert_eq!(config.vfd.wiring.refresh_rate, Some(20));

        assert!(config.nixie.autostart);
        assert_eq!(
            config.nixie.run_led,
            Some(PathBuf::from("/sys/class/leds/nixie-run"))
        );
        assert_eq!(config.nixie.pwm_settings.pwm_frequency, Some(12000));
        assert_eq!(config.nixie.pwm_settings.pwm_duty_cycle, Some(40));

        assert_eq!(config.dbus.bus, DbusBusType::System);
    }

    #[test]
    fn test_defaults() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config.vfd.device, "/dev/spidev1.0");
        assert_eq!(config.vfd.spi_speed, 1_000_000);
        assert_eq!(config.vfd.wiring.digits_idx, None);
        assert!(config.nixie.enable);
        assert!(!config.nixie.autostart);
        assert_eq!(config.nixie.run_led, None);
        assert_eq!(config.nixie.pwm_settings, NixieConfig::default());
        assert_eq!(config.dbus.bus, DbusBusType::Auto);
    }

    #[test]
    fn test_bundled_config_parses() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/default.toml");
        let config = Config::load(path).unwrap();
        assert!(nixie_cape_hw::PinMap::from_config(&config.vfd.wiring).is_ok());
    }

    #[test]
    fn test_rejects_unknown_bus() {
        assert!(toml::from_str::<Config>("[dbus]\nbus = \"tcp\"").is_err());
    }
}
