//! VFD hardware description.
//!
//! Property names follow the cape's device-tree binding so a board description
//! can be carried over verbatim into TOML.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// Refresh interval used when `refresh-rate` is not supplied.
pub const DEFAULT_REFRESH_RATE_MS: u32 = 150;

/// Pin mapping and refresh rate of a VFD.
///
/// The mapping tables are optional here only so that a missing property is
/// reported as a [`ConfigError`](crate::ConfigError) when the configuration is
/// turned into a [`PinMap`](super::PinMap).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct VfdConfig {
    /// Physical bit driving each logical digit, rightmost digit first.
    #[serde(default)]
    pub digits_idx: Option<Vec<u32>>,

    /// Physical bit driving each logical segment A..H.
    #[serde(default)]
    pub segments_idx: Option<Vec<u32>>,

    /// Segments each digit is actually wired for.
    #[serde(default)]
    pub digits_mask: Option<Vec<u32>>,

    /// Refresh interval in milliseconds.
    #[serde(default)]
    pub refresh_rate: Option<u32>,
}

impl VfdConfig {
    /// Creates a configuration from explicit tables.
    pub fn new(digits_idx: Vec<u32>, segments_idx: Vec<u32>, digits_mask: Vec<u32>) -> Self {
        Self {
            digits_idx: Some(digits_idx),
            segments_idx: Some(segments_idx),
            digits_mask: Some(digits_mask),
            refresh_rate: None,
        }
    }

    /// Sets the refresh interval in milliseconds.
    pub fn with_refresh_rate(mut self, ms: u32) -> Self {
        self.refresh_rate = Some(ms);
        self
    }

    /// Returns the refresh interval, falling back to the default with a warning.
    pub fn refresh_interval(&self) -> Duration {
        let ms = self.refresh_rate.unwrap_or_else(|| {
            warn!(
                "no refresh-rate set, defaulting to '{}'",
                DEFAULT_REFRESH_RATE_MS
            );
            DEFAULT_REFRESH_RATE_MS
        });
        Duration::from_millis(ms as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_toml() {
        let config: VfdConfig = toml::from_str(
            r#"
            digits-idx = [8, 9, 10, 11]
            segments-idx = [0, 1, 2, 3, 4, 5, 6, 7]
            digits-mask = [0xFF, 0xFF, 0xFF, 0x7F]
            refresh-rate = 200
            "#,
        )
        .unwrap();

        assert_eq!(config.digits_idx, Some(vec![8, 9, 10, 11]));
        assert_eq!(config.digits_mask, Some(vec![0xFF, 0xFF, 0xFF, 0x7F]));
        assert_eq!(config.refresh_interval(), Duration::from_millis(200));
    }

    #[test]
    fn test_missing_refresh_rate_defaults() {
        let config: VfdConfig = toml::from_str(
            r#"
            digits-idx = [8]
            segments-idx = [0, 1, 2, 3, 4, 5, 6, 7]
            digits-mask = [0xFF]
            "#,
        )
        .unwrap();

        assert_eq!(config.refresh_rate, None);
        assert_eq!(config.refresh_interval(), Duration::from_millis(150));
    }
}
