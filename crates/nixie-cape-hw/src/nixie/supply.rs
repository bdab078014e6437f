//! Nixie tube boost supply control.

use crate::{Error, Result};
use tracing::{info, warn};

use super::config::NixieConfig;

/// PWM period and duty time in nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PwmTiming {
    pub period_ns: u64,
    pub duty_ns: u64,
}

impl PwmTiming {
    /// Lowest frequency the boost converter is run at.
    pub const MIN_FREQUENCY_HZ: u32 = 1000;
    /// Highest frequency the boost converter is run at.
    pub const MAX_FREQUENCY_HZ: u32 = 50_000;
    /// Duty cycles above this risk overdriving the tube.
    pub const MAX_DUTY_PERCENT: u32 = 80;

    /// Output parked at 0% duty and 20 kHz.
    pub const OFF: PwmTiming = PwmTiming {
        period_ns: 50_000,
        duty_ns: 0,
    };

    /// Converts frequency and duty cycle into PWM timing.
    pub fn compute(frequency_hz: u32, duty_percent: u32) -> Result<Self> {
        if !(Self::MIN_FREQUENCY_HZ..=Self::MAX_FREQUENCY_HZ).contains(&frequency_hz) {
            return Err(Error::InvalidFrequency(frequency_hz));
        }
        if duty_percent > Self::MAX_DUTY_PERCENT {
            return Err(Error::InvalidDutyCycle(duty_percent));
        }

        let period_ns = 1_000_000_000 / frequency_hz as u64;
        let duty_ns = period_ns * duty_percent as u64 / 100;
        Ok(Self { period_ns, duty_ns })
    }
}

/// A PWM channel.
pub trait PwmOutput {
    /// Sets period and duty time.
    fn configure(&mut self, timing: PwmTiming) -> Result<()>;

    /// Starts driving the output.
    fn enable(&mut self) -> Result<()>;

    /// Stops driving the output.
    fn disable(&mut self) -> Result<()>;
}

/// An indicator showing whether the tube is powered.
pub trait RunIndicator {
    fn set(&mut self, on: bool) -> Result<()>;
}

impl<T: RunIndicator> RunIndicator for Option<T> {
    fn set(&mut self, on: bool) -> Result<()> {
        match self {
            Some(indicator) => indicator.set(on),
            None => Ok(()),
        }
    }
}

/// Controller for the tube's high-voltage supply.
///
/// The supply is stopped when dropped.
pub struct NixieSupply<P: PwmOutput, L: RunIndicator> {
    pwm: P,
    indicator: L,
    frequency_hz: u32,
    duty_percent: u32,
    running: bool,
}

impl<P: PwmOutput, L: RunIndicator> NixieSupply<P, L> {
    /// Creates a stopped supply.
    pub fn new(config: &NixieConfig, pwm: P, mut indicator: L) -> Self {
        if let Err(e) = indicator.set(false) {
            warn!("Failed to reset run indicator: {}", e);
        }

        Self {
            pwm,
            indicator,
            frequency_hz: config.frequency_hz(),
            duty_percent: config.duty_percent(),
            running: false,
        }
    }

    /// Returns true if the supply is powering the tube.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Returns the configured PWM frequency in Hz.
    pub fn frequency_hz(&self) -> u32 {
        self.frequency_hz
    }

    /// Returns the configured duty cycle in percent.
    pub fn duty_percent(&self) -> u32 {
        self.duty_percent
    }

    /// Powers the tube. Does nothing if already running.
    pub fn start(&mut self) -> Result<()> {
        if self.running {
            return Ok(());
        }

        let timing = PwmTiming::compute(self.frequency_hz, self.duty_percent)?;
        info!(
            "starting nixie tube with duty={}ns period={}ns",
            timing.duty_ns, timing.period_ns
        );

        self.pwm.configure(timing)?;
        self.pwm.enable()?;
        self.running = true;

        if let Err(e) = self.indicator.set(true) {
            warn!("Failed to set run indicator: {}", e);
        }
        Ok(())
    }

    /// Removes power from the tube. Does nothing if already stopped.
    pub fn stop(&mut self) -> Result<()> {
        if !self.running {
            return Ok(());
        }

        info!("disabling nixie tube");
        self.pwm.configure(PwmTiming::OFF)?;
        self.pwm.disable()?;
        self.running = false;

        if let Err(e) = self.indicator.set(false) {
            warn!("Failed to clear run indicator: {}", e);
        }
        Ok(())
    }

    /// Starts on a non-zero integer, stops on zero.
    pub fn set_run(&mut self, value: &str) -> Result<()> {
        let run =
            parse_c_integer(value).ok_or_else(|| Error::InvalidRunValue(value.to_string()))?;
        if run != 0 {
            self.start()
        } else {
            self.stop()
        }
    }
}

impl<P: PwmOutput, L: RunIndicator> Drop for NixieSupply<P, L> {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("Failed to stop nixie supply: {}", e);
        }
    }
}

/// Parses a leading integer the way C's `%i` conversion does.
///
/// Accepts surrounding whitespace, an optional sign, `0x` hex and
/// leading-zero octal. Trailing garbage after the number is ignored.
pub fn parse_c_integer(input: &str) -> Option<i64> {
    let s = input.trim_start();
    let (negative, s) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let (radix, digits) = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => (16, hex),
        None if s.starts_with('0') => (8, s),
        None => (10, s),
    };

    let end = digits
        .find(|c: char| !c.is_digit(radix))
        .unwrap_or(digits.len());
    if end == 0 {
        // "0x" with nothing after it still reads the zero
        return (radix == 16).then_some(0);
    }

    let value = i64::from_str_radix(&digits[..end], radix).ok()?;
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum PwmCall {
        Configure(PwmTiming),
        Enable,
        Disable,
    }

    #[derive(Default)]
    struct FakePwm {
        calls: Vec<PwmCall>,
    }

    impl PwmOutput for FakePwm {
        fn configure(&mut self, timing: PwmTiming) -> Result<()> {
            self.calls.push(PwmCall::Configure(timing));
            Ok(())
        }

        fn enable(&mut self) -> Result<()> {
            self.calls.push(PwmCall::Enable);
            Ok(())
        }

        fn disable(&mut self) -> Result<()> {
            self.calls.push(PwmCall::Disable);
            Ok(())
        }
    }

    struct SharedPwm(std::sync::Arc<std::sync::Mutex<Vec<PwmCall>>>);

    impl PwmOutput for SharedPwm {
        fn configure(&mut self, timing: PwmTiming) -> Result<()> {
            self.0.lock().unwrap().push(PwmCall::Configure(timing));
            Ok(())
        }

        fn enable(&mut self) -> Result<()> {
            self.0.lock().unwrap().push(PwmCall::Enable);
            Ok(())
        }

        fn disable(&mut self) -> Result<()> {
            self.0.lock().unwrap().push(PwmCall::Disable);
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeLed {
        states: Vec<bool>,
    }

    impl RunIndicator for FakeLed {
        fn set(&mut self, on: bool) -> Result<()> {
            self.states.push(on);
            Ok(())
        }
    }

    fn config(frequency: u32, duty: u32) -> NixieConfig {
        NixieConfig {
            pwm_frequency: Some(frequency),
            pwm_duty_cycle: Some(duty),
        }
    }

    #[test]
    fn test_compute_timing() {
        let timing = PwmTiming::compute(9250, 35).unwrap();
        assert_eq!(timing.period_ns, 108_108);
        assert_eq!(timing.duty_ns, 37_837);

        let timing = PwmTiming::compute(50_000, 80).unwrap();
        assert_eq!(timing.period_ns, 20_000);
        assert_eq!(timing.duty_ns, 16_000);
    }

    #[test]
    fn test_compute_rejects_unsafe_settings() {
        assert!(matches!(
            PwmTiming::compute(999, 35),
            Err(Error::InvalidFrequency(999))
        ));
        assert!(matches!(
            PwmTiming::compute(50_001, 35),
            Err(Error::InvalidFrequency(50_001))
        ));
        assert!(matches!(
            PwmTiming::compute(9250, 81),
            Err(Error::InvalidDutyCycle(81))
        ));
    }

    #[test]
    fn test_defaults() {
        let supply = NixieSupply::new(&NixieConfig::default(), FakePwm::default(), None::<FakeLed>);
        assert_eq!(supply.frequency_hz(), 9250);
        assert_eq!(supply.duty_percent(), 35);
        assert!(!supply.is_running());
    }

    #[test]
    fn test_start_and_stop() {
        let mut supply = NixieSupply::new(&config(10_000, 50), FakePwm::default(), FakeLed::default());

        supply.start().unwrap();
        supply.start().unwrap();
        assert!(supply.is_running());

        supply.stop().unwrap();
        supply.stop().unwrap();
        assert!(!supply.is_running());

        assert_eq!(
            supply.pwm.calls,
            vec![
                PwmCall::Configure(PwmTiming {
                    period_ns: 100_000,
                    duty_ns: 50_000
                }),
                PwmCall::Enable,
                PwmCall::Configure(PwmTiming::OFF),
                PwmCall::Disable,
            ]
        );
        assert_eq!(supply.indicator.states, vec![false, true, false]);
    }

    #[test]
    fn test_drop_stops_supply() {
        let pwm = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        {
            let mut supply =
                NixieSupply::new(&config(9250, 35), SharedPwm(pwm.clone()), None::<FakeLed>);
            supply.start().unwrap();
        }
        assert_eq!(pwm.lock().unwrap().last(), Some(&PwmCall::Disable));
    }

    #[test]
    fn test_start_refuses_bad_config() {
        let mut supply = NixieSupply::new(&config(9250, 90), FakePwm::default(), FakeLed::default());
        assert!(supply.start().is_err());
        assert!(!supply.is_running());
        assert!(supply.pwm.calls.is_empty());
    }

    #[test]
    fn test_set_run() {
        let mut supply = NixieSupply::new(&config(9250, 35), FakePwm::default(), FakeLed::default());

        supply.set_run("1\n").unwrap();
        assert!(supply.is_running());
        supply.set_run("0").unwrap();
        assert!(!supply.is_running());
        supply.set_run("0x10").unwrap();
        assert!(supply.is_running());

        assert!(matches!(
            supply.set_run("on"),
            Err(Error::InvalidRunValue(_))
        ));
        assert!(supply.is_running());
    }

    #[test]
    fn test_parse_c_integer() {
        assert_eq!(parse_c_integer("42"), Some(42));
        assert_eq!(parse_c_integer("  -7\n"), Some(-7));
        assert_eq!(parse_c_integer("+3"), Some(3));
        assert_eq!(parse_c_integer("0x1F"), Some(31));
        assert_eq!(parse_c_integer("010"), Some(8));
        assert_eq!(parse_c_integer("0"), Some(0));
        assert_eq!(parse_c_integer("0x"), Some(0));
        assert_eq!(parse_c_integer("12abc"), Some(12));
        assert_eq!(parse_c_integer(""), None);
        assert_eq!(parse_c_integer("yes"), None);
        assert_eq!(parse_c_integer("-"), None);
    }
}
