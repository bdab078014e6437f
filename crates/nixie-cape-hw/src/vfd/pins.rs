//! Pin mapper.
//!
//! Translates logical digits and segments into the physical output bits of
//! the segment driver. The tables are validated once and never change.

use crate::{ConfigError, Error, Result, SEGMENT_COUNT, WORD_BITS};

use super::config::VfdConfig;
use super::glyph::DECIMAL_POINT;

/// Immutable digit/segment to physical bit mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinMap {
    digit_pins: Vec<u8>,
    segment_pins: [u8; SEGMENT_COUNT],
    digit_mask: Vec<u8>,
}

impl PinMap {
    /// Validates a hardware description and builds the mapping tables.
    pub fn from_config(config: &VfdConfig) -> std::result::Result<Self, ConfigError> {
        let digits = config
            .digits_idx
            .as_deref()
            .ok_or(ConfigError::MissingProperty("digits-idx"))?;
        let segments = config
            .segments_idx
            .as_deref()
            .ok_or(ConfigError::MissingProperty("segments-idx"))?;
        let masks = config
            .digits_mask
            .as_deref()
            .ok_or(ConfigError::MissingProperty("digits-mask"))?;

        if digits.is_empty() {
            return Err(ConfigError::NoDigits);
        }
        if segments.len() != SEGMENT_COUNT {
            return Err(ConfigError::SegmentCount {
                expected: SEGMENT_COUNT,
                actual: segments.len(),
            });
        }
        if masks.len() != digits.len() {
            return Err(ConfigError::DigitMaskLength {
                expected: digits.len(),
                actual: masks.len(),
            });
        }

        let digit_pins = to_bits("digits-idx", digits)?;
        let mut segment_pins = [0u8; SEGMENT_COUNT];
        segment_pins.copy_from_slice(&to_bits("segments-idx", segments)?);
        // Only A..H exist, higher mask bits have nothing to drive.
        let digit_mask = masks.iter().map(|&mask| (mask & 0xFF) as u8).collect();

        Ok(Self {
            digit_pins,
            segment_pins,
            digit_mask,
        })
    }

    /// Number of logical digits on the display.
    pub fn digit_count(&self) -> usize {
        self.digit_pins.len()
    }

    /// Physical bit of the digit-select strobe for a logical digit.
    pub fn digit_to_physical_bit(&self, digit: usize) -> Result<u8> {
        self.digit_pins
            .get(digit)
            .copied()
            .ok_or(Error::DigitOutOfRange {
                index: digit,
                count: self.digit_count(),
            })
    }

    /// Physical bit driving a logical segment.
    pub fn segment_to_physical_bit(&self, segment: usize) -> Result<u8> {
        self.segment_pins
            .get(segment)
            .copied()
            .ok_or(Error::SegmentOutOfRange(segment))
    }

    /// Segments the hardware supports for a digit.
    pub fn digit_mask(&self, digit: usize) -> Result<u8> {
        self.digit_mask
            .get(digit)
            .copied()
            .ok_or(Error::DigitOutOfRange {
                index: digit,
                count: self.digit_count(),
            })
    }

    /// Builds the frame word for one digit.
    ///
    /// Segments the digit is not wired for are dropped silently. The
    /// digit-select strobe is always set, so a composed word is never zero.
    pub fn compose_digit_word(&self, digit: usize, glyph_mask: u8, period: bool) -> Result<u32> {
        let mut mask = glyph_mask;
        if period {
            mask |= DECIMAL_POINT;
        }
        mask &= self.digit_mask(digit)?;

        let mut word = 0u32;
        for segment in 0..SEGMENT_COUNT {
            if mask & (1 << segment) != 0 {
                word |= 1 << self.segment_pins[segment];
            }
        }
        word |= 1 << self.digit_to_physical_bit(digit)?;

        Ok(word)
    }

    /// Recovers the logical segment mask from a frame word.
    pub fn decompose_digit_word(&self, word: u32) -> u8 {
        self.segment_pins
            .iter()
            .enumerate()
            .filter(|&(_, &bit)| word & (1 << bit) != 0)
            .fold(0u8, |mask, (segment, _)| mask | (1 << segment))
    }
}

fn to_bits(property: &'static str, pins: &[u32]) -> std::result::Result<Vec<u8>, ConfigError> {
    pins.iter()
        .enumerate()
        .map(|(index, &bit)| {
            if bit < WORD_BITS {
                Ok(bit as u8)
            } else {
                Err(ConfigError::PinOutOfRange {
                    property,
                    index,
                    bit,
                })
            }
        })
        .collect()
}
