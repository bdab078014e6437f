//! Application state management.

use anyhow::{bail, Context, Result};
use nixie_cape_hw::{NixieSupply, PinMap, SpidevVfd, SysfsLed, SysfsPwm};
use std::sync::Mutex;
use tracing::{info, warn};

use crate::config::{Config, NixieSection};

/// Nixie supply as wired on the cape.
pub type Nixie = NixieSupply<SysfsPwm, Option<SysfsLed>>;

/// Shared application state.
pub struct AppState {
    /// VFD, `None` when running headless or after shutdown
    vfd: Mutex<Option<SpidevVfd>>,

    /// Nixie tube supply, `None` when disabled or unavailable
    nixie: Option<Mutex<Nixie>>,
}

impl AppState {
    /// Creates a new application state.
    ///
    /// Invalid VFD wiring is fatal; a missing SPI node or PWM channel only
    /// leaves that display unavailable.
    pub fn new(config: &Config) -> Result<Self> {
        PinMap::from_config(&config.vfd.wiring).context("Invalid VFD configuration")?;

        let vfd = match SpidevVfd::open(
            &config.vfd.device,
            config.vfd.spi_speed,
            &config.vfd.wiring,
        ) {
            Ok(device) => {
                info!("VFD device opened successfully");
                Some(device)
            }
            Err(e) => {
                warn!("VFD device not available: {}. Running in headless mode.", e);
                None
            }
        };

        let nixie = if config.nixie.enable {
            Self::open_nixie(&config.nixie)
        } else {
            info!("Nixie tube disabled");
            None
        };

        let state = Self::from_parts(vfd, nixie);

        if config.nixie.autostart {
            if let Err(e) = state.set_run("1") {
                warn!("Failed to autostart nixie tube: {:#}", e);
            }
        }

        Ok(state)
    }

    fn from_parts(vfd: Option<SpidevVfd>, nixie: Option<Nixie>) -> Self {
        Self {
            vfd: Mutex::new(vfd),
            nixie: nixie.map(Mutex::new),
        }
    }

    fn open_nixie(section: &NixieSection) -> Option<Nixie> {
        let pwm = match SysfsPwm::open(&section.pwm) {
            Ok(pwm) => pwm,
            Err(e) => {
                warn!("Nixie PWM channel not available: {}. Tube disabled.", e);
                return None;
            }
        };

        let led = section
            .run_led
            .as_ref()
            .and_then(|path| match SysfsLed::open(path) {
                Ok(led) => Some(led),
                Err(e) => {
                    warn!("Run LED not available: {}", e);
                    None
                }
            });

        Some(NixieSupply::new(&section.pwm_settings, pwm, led))
    }

    /// Returns true if the VFD is attached.
    pub fn is_vfd_connected(&self) -> bool {
        self.vfd.lock().unwrap().is_some()
    }

    /// Returns true if the nixie supply is attached.
    pub fn is_nixie_connected(&self) -> bool {
        self.nixie.is_some()
    }

    /// Replaces the VFD text, returning the number of bytes consumed.
    pub fn write_display(&self, text: &str) -> Result<usize> {
        let vfd = self.vfd.lock().unwrap();
        match vfd.as_ref() {
            Some(vfd) => Ok(vfd.write_display(text)?),
            None => bail!("VFD not connected"),
        }
    }

    /// Returns the VFD text.
    pub fn read_display(&self) -> Result<String> {
        let vfd = self.vfd.lock().unwrap();
        match vfd.as_ref() {
            Some(vfd) => Ok(vfd.read_display()),
            None => bail!("VFD not connected"),
        }
    }

    /// Starts or stops the nixie tube from a textual integer.
    pub fn set_run(&self, value: &str) -> Result<()> {
        let Some(nixie) = &self.nixie else {
            bail!("Nixie tube not connected");
        };
        nixie.lock().unwrap().set_run(value)?;
        Ok(())
    }

    /// Returns true if the nixie tube is powered.
    pub fn is_running(&self) -> bool {
        self.nixie
            .as_ref()
            .is_some_and(|nixie| nixie.lock().unwrap().is_running())
    }

    /// Releases the VFD and powers down the nixie tube.
    pub async fn shutdown(&self) {
        let vfd = self.vfd.lock().unwrap().take();
        if let Some(vfd) = vfd {
            vfd.shutdown().await;
        }

        if let Some(nixie) = &self.nixie {
            if let Err(e) = nixie.lock().unwrap().stop() {
                warn!("Failed to stop nixie tube: {}", e);
            }
        }
        info!("Hardware released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nixie_cape_hw::NixieConfig;
    use std::path::{Path, PathBuf};

    fn scratch_pwm(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("nixiecaped-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        for attr in ["period", "duty_cycle", "enable"] {
            std::fs::write(dir.join(attr), "0").unwrap();
        }
        dir
    }

    fn nixie_on(dir: &Path) -> Nixie {
        NixieSupply::new(&NixieConfig::default(), SysfsPwm::open(dir).unwrap(), None)
    }

    fn read(dir: &Path, name: &str) -> String {
        std::fs::read_to_string(dir.join(name)).unwrap()
    }

    #[test]
    fn test_headless() {
        let state = AppState::from_parts(None, None);

        assert!(!state.is_vfd_connected());
        assert!(!state.is_nixie_connected());
        assert!(!state.is_running());
        assert!(state.write_display("12").is_err());
        assert!(state.read_display().is_err());
        assert!(state.set_run("1").is_err());
    }

    #[test]
    fn test_invalid_wiring_is_fatal() {
        let err = AppState::new(&Config::default()).err().unwrap();
        assert_eq!(
            err.downcast_ref::<nixie_cape_hw::ConfigError>(),
            Some(&nixie_cape_hw::ConfigError::MissingProperty("digits-idx"))
        );
    }

    #[test]
    fn test_set_run() {
        let dir = scratch_pwm("run");
        let state = AppState::from_parts(None, Some(nixie_on(&dir)));

        state.set_run("1").unwrap();
        assert!(state.is_running());
        assert_eq!(read(&dir, "enable"), "1");

        state.set_run("0").unwrap();
        assert!(!state.is_running());
        assert_eq!(read(&dir, "enable"), "0");

        let err = state.set_run("maybe").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<nixie_cape_hw::Error>(),
            Some(nixie_cape_hw::Error::InvalidRunValue(_))
        ));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_stops_tube() {
        let dir = scratch_pwm("shutdown");
        let state = AppState::from_parts(None, Some(nixie_on(&dir)));

        state.set_run("1").unwrap();
        state.shutdown().await;

        assert!(!state.is_running());
        assert_eq!(read(&dir, "enable"), "0");
        assert_eq!(read(&dir, "duty_cycle"), "0");

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
