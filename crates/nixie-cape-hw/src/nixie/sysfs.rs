//! Linux sysfs backends for the PWM channel and the run LED.

use crate::Result;
use std::fmt::Display;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::supply::{PwmOutput, PwmTiming, RunIndicator};

fn write_attr(dir: &Path, name: &str, value: impl Display) -> Result<()> {
    let path = dir.join(name);
    debug!("Writing {} to {:?}", value, path);
    std::fs::write(&path, value.to_string())?;
    Ok(())
}

fn require_attr(dir: &Path, name: &str) -> Result<()> {
    if dir.join(name).exists() {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} has no '{}' attribute", dir.display(), name),
        )
        .into())
    }
}

/// PWM channel exported under `/sys/class/pwm/pwmchipN/pwmM`.
pub struct SysfsPwm {
    dir: PathBuf,
}

impl SysfsPwm {
    /// Opens an exported PWM channel directory.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        require_attr(&dir, "period")?;
        info!("PWM channel opened at {:?}", dir);
        Ok(Self { dir })
    }

    /// Returns the channel directory.
    pub fn path(&self) -> &Path {
        &self.dir
    }
}

impl PwmOutput for SysfsPwm {
    fn configure(&mut self, timing: PwmTiming) -> Result<()> {
        // The kernel rejects a duty cycle longer than the period, so park
        // duty at zero while the period changes.
        write_attr(&self.dir, "duty_cycle", 0)?;
        write_attr(&self.dir, "period", timing.period_ns)?;
        write_attr(&self.dir, "duty_cycle", timing.duty_ns)
    }

    fn enable(&mut self) -> Result<()> {
        write_attr(&self.dir, "enable", 1)
    }

    fn disable(&mut self) -> Result<()> {
        write_attr(&self.dir, "enable", 0)
    }
}

/// LED under `/sys/class/leds/<name>`.
pub struct SysfsLed {
    dir: PathBuf,
}

impl SysfsLed {
    /// Brightness written when the LED is on.
    pub const FULL: u32 = 255;

    /// Opens an LED class directory.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        require_attr(&dir, "brightness")?;
        Ok(Self { dir })
    }
}

impl RunIndicator for SysfsLed {
    fn set(&mut self, on: bool) -> Result<()> {
        write_attr(&self.dir, "brightness", if on { Self::FULL } else { 0 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn scratch_dir(name: &str, attrs: &[&str]) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("nixie-cape-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        for attr in attrs {
            std::fs::write(dir.join(attr), "0").unwrap();
        }
        dir
    }

    fn read(dir: &Path, name: &str) -> String {
        std::fs::read_to_string(dir.join(name)).unwrap()
    }

    #[test]
    fn test_pwm_writes_attributes() {
        let dir = scratch_dir("pwm", &["period", "duty_cycle", "enable"]);
        let mut pwm = SysfsPwm::open(&dir).unwrap();

        pwm.configure(PwmTiming::compute(9250, 35).unwrap()).unwrap();
        pwm.enable().unwrap();
        assert_eq!(read(&dir, "period"), "108108");
        assert_eq!(read(&dir, "duty_cycle"), "37837");
        assert_eq!(read(&dir, "enable"), "1");

        pwm.disable().unwrap();
        assert_eq!(read(&dir, "enable"), "0");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_led_brightness() {
        let dir = scratch_dir("led", &["brightness"]);
        let mut led = SysfsLed::open(&dir).unwrap();

        led.set(true).unwrap();
        assert_eq!(read(&dir, "brightness"), "255");
        led.set(false).unwrap();
        assert_eq!(read(&dir, "brightness"), "0");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_open_missing_channel() {
        let dir = scratch_dir("empty", &[]);
        assert!(matches!(SysfsPwm::open(&dir), Err(Error::Io(_))));
        assert!(SysfsLed::open(&dir).is_err());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
