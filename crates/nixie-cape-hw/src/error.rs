//! Error types for the nixie cape hardware library.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Problems with the hardware description supplied at initialization.
///
/// Any of these is fatal: the display is never created.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required mapping property was not supplied.
    #[error("missing required property '{0}'")]
    MissingProperty(&'static str),

    /// The segment table must name exactly one pin per segment.
    #[error("invalid number of segments defined: expected {expected}, got {actual}")]
    SegmentCount { expected: usize, actual: usize },

    /// The per-digit mask table must be as long as the digit table.
    #[error("digits mask has {actual} entries but {expected} digits are defined")]
    DigitMaskLength { expected: usize, actual: usize },

    /// A display needs at least one digit.
    #[error("no digits defined")]
    NoDigits,

    /// A physical bit position that cannot be expressed in a frame word.
    #[error("{property} entry {index} is bit {bit}, frame words are 32 bits wide")]
    PinOutOfRange {
        property: &'static str,
        index: usize,
        bit: u32,
    },
}

/// Errors that can occur when interacting with the hardware.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid hardware description.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Logical digit index outside the configured display.
    #[error("digit index {index} out of range (display has {count} digits)")]
    DigitOutOfRange { index: usize, count: usize },

    /// Logical segment index outside A..H.
    #[error("segment index {0} out of range")]
    SegmentOutOfRange(usize),

    /// Text needs more digit positions than the display has.
    #[error("text needs {needed} digits but the display only has {available}")]
    Overflow { needed: usize, available: usize },

    /// SPI transfer to the segment driver failed.
    #[error("SPI bus error: {0}")]
    Bus(String),

    /// Sysfs or device node I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// PWM frequency outside the supported range.
    #[error("refusing to use a PWM frequency of {0} Hz (must be 1000-50000)")]
    InvalidFrequency(u32),

    /// PWM duty cycle above the safe limit for the tube supply.
    #[error("refusing to use a PWM duty cycle of {0}% (must be at most 80)")]
    InvalidDutyCycle(u32),

    /// Run request that is not an integer.
    #[error("invalid run value: {0:?}")]
    InvalidRunValue(String),
}
