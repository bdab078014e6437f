//! Segment codec.
//!
//! Translates between displayable characters and logical segment masks,
//! independent of how the segments are wired to the driver chip.

/// Logical segment bits. `H` is always the decimal point.
pub mod segment {
    pub const A: u8 = 1 << 0;
    pub const B: u8 = 1 << 1;
    pub const C: u8 = 1 << 2;
    pub const D: u8 = 1 << 3;
    pub const E: u8 = 1 << 4;
    pub const F: u8 = 1 << 5;
    pub const G: u8 = 1 << 6;
    pub const H: u8 = 1 << 7;
}

use segment::{A, B, C, D, E, F, G, H};

/// Segment flag used for the decimal point.
pub const DECIMAL_POINT: u8 = H;

/// Character to segment mask table.
///
/// Digit masks never include the decimal point; it is OR'd in separately.
pub const GLYPHS: [(char, u8); 13] = [
    ('0', A | B | C | D | E | F),
    ('1', B | C),
    ('2', A | B | D | E | G),
    ('3', A | B | C | D | G),
    ('4', B | C | F | G),
    ('5', A | C | D | F | G),
    ('6', A | C | D | E | F | G),
    ('7', A | B | C),
    ('8', A | B | C | D | E | F | G),
    ('9', A | B | C | D | F | G),
    ('-', G),
    ('.', H),
    (' ', 0),
];

/// Looks up the segment mask for a character.
///
/// Returns `None` for anything outside the 13-character alphabet.
pub fn glyph_to_mask(c: char) -> Option<u8> {
    GLYPHS
        .iter()
        .find(|(glyph, _)| *glyph == c)
        .map(|(_, mask)| *mask)
}

/// Character recovered from a segment mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedGlyph {
    /// The base character, `None` when only the decimal point is lit.
    pub symbol: Option<char>,
    /// Whether a period follows the symbol.
    pub period: bool,
}

impl DecodedGlyph {
    /// Appends the rendered glyph to `out`.
    pub fn push_to(&self, out: &mut String) {
        if let Some(symbol) = self.symbol {
            out.push(symbol);
        }
        if self.period {
            out.push('.');
        }
    }
}

/// Reverse lookup of a segment mask.
///
/// The decimal point is ignored when matching. A blank digit with the decimal
/// point lit decodes to a lone period rather than a space followed by one.
/// Returns `None` when no glyph matches the remaining segments.
pub fn mask_to_glyph(mask: u8) -> Option<DecodedGlyph> {
    let base = mask & !DECIMAL_POINT;
    let period = mask & DECIMAL_POINT != 0;

    let (symbol, _) = GLYPHS
        .iter()
        .find(|(_, glyph_mask)| *glyph_mask == base)?;

    let symbol = if *symbol == ' ' && period {
        None
    } else {
        Some(*symbol)
    };

    Some(DecodedGlyph { symbol, period })
}
