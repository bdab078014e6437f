//! Nixie Cape Hardware Library
//!
//! Provides control over the two displays on the nixie cape: the
//! vacuum-fluorescent multi-digit display driven over SPI through a
//! segment-driver chip, and the PWM boost supply powering the nixie tube.

pub mod error;
pub mod nixie;
pub mod vfd;

pub use error::{ConfigError, Error, Result};
pub use nixie::{NixieConfig, NixieSupply, PwmOutput, PwmTiming, RunIndicator, SysfsLed, SysfsPwm};
pub use vfd::{FrameBuffer, PinMap, SpidevVfd, VfdConfig, VfdDevice};

/// Number of logical segments per digit (A..G plus the decimal point).
pub const SEGMENT_COUNT: usize = 8;

/// Width in bits of one frame word sent to the segment driver.
pub const WORD_BITS: u32 = 32;
