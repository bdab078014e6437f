//! Text to frame encoding and frame to text decoding.

use crate::{Error, Result};

use super::framebuffer::FrameBuffer;
use super::glyph::{glyph_to_mask, mask_to_glyph};
use super::pins::PinMap;

/// One resolved digit position: its glyph mask and whether a period follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cell {
    mask: u8,
    period: bool,
}

/// Resolves text into digit cells, rightmost character first.
///
/// Periods ornament the character to their left. Characters outside the
/// glyph alphabet are skipped without consuming a digit. A period with no
/// character to its left gets a digit of its own.
fn layout(text: &str) -> Vec<Cell> {
    let mut cells = Vec::new();
    let mut period = false;

    for c in text.chars().rev() {
        if c == '.' {
            period = true;
            continue;
        }

        let Some(mask) = glyph_to_mask(c) else {
            continue;
        };

        cells.push(Cell { mask, period });
        period = false;
    }

    if period {
        if let Some(mask) = glyph_to_mask('.') {
            cells.push(Cell {
                mask,
                period: false,
            });
        }
    }

    cells
}

/// Encodes `text` into the frame buffer.
///
/// The rightmost character lands in digit 0. Text that needs more digits
/// than the buffer holds is rejected before the buffer is touched.
/// Returns the number of digits written.
pub fn encode_text(text: &str, pins: &PinMap, frame: &mut FrameBuffer) -> Result<usize> {
    let cells = layout(text);
    let available = frame.len().min(pins.digit_count());
    if cells.len() > available {
        return Err(Error::Overflow {
            needed: cells.len(),
            available,
        });
    }

    let words = cells
        .iter()
        .enumerate()
        .map(|(digit, cell)| pins.compose_digit_word(digit, cell.mask, cell.period))
        .collect::<Result<Vec<_>>>()?;

    frame.clear();
    for (digit, word) in words.into_iter().enumerate() {
        frame.set(digit, word)?;
    }

    Ok(cells.len())
}

/// Decodes the frame buffer back into text, leftmost digit first.
///
/// Unwritten digits and words that match no glyph are skipped. The result
/// always ends with a newline.
pub fn decode_text(pins: &PinMap, frame: &FrameBuffer) -> String {
    let mut out = String::with_capacity(frame.len() * 2 + 1);

    for &word in frame.words().iter().rev() {
        if word == 0 {
            continue;
        }
        if let Some(glyph) = mask_to_glyph(pins.decompose_digit_word(word)) {
            glyph.push_to(&mut out);
        }
    }

    out.push('\n');
    out
}
