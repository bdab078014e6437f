//! Frame buffer of per-digit physical-bit words.

use crate::{Error, Result};

use super::protocol::{build_refresh_cycle, FRAME_SIZE};

/// One frame word per logical digit, rightmost digit at index 0.
///
/// Each word already includes the digit-select strobe. A zero word marks a
/// digit that has not been written since the last clear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    words: Vec<u32>,
}

impl FrameBuffer {
    /// Creates a blank frame buffer for `size` digits.
    pub fn new(size: usize) -> Self {
        Self {
            words: vec![0; size],
        }
    }

    /// Returns the number of digits.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns true if the buffer holds no digits.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Returns the raw words.
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// Zeroes every word.
    pub fn clear(&mut self) {
        self.words.fill(0);
    }

    /// Stores the word for a digit.
    pub fn set(&mut self, index: usize, word: u32) -> Result<()> {
        let count = self.words.len();
        let slot = self
            .words
            .get_mut(index)
            .ok_or(Error::DigitOutOfRange { index, count })?;
        *slot = word;
        Ok(())
    }

    /// Gets the word for a digit.
    pub fn get(&self, index: usize) -> Result<u32> {
        self.words.get(index).copied().ok_or(Error::DigitOutOfRange {
            index,
            count: self.words.len(),
        })
    }

    /// Encodes the current contents as the frames of one refresh cycle.
    pub fn snapshot_for_transmit(&self) -> Vec<[u8; FRAME_SIZE]> {
        build_refresh_cycle(&self.words)
    }
}
