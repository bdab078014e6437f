//! Segment driver wire format.
//!
//! Protocol structure:
//! - One 4-byte frame per digit, most significant byte first
//! - Frames sent in logical digit order, rightmost digit first
//! - One all-zero blanking frame closes every refresh cycle

/// Size of one frame on the wire.
pub const FRAME_SIZE: usize = 4;

/// Frame that resets the driver latch after the digit frames.
pub const BLANKING_FRAME: [u8; FRAME_SIZE] = [0; FRAME_SIZE];

/// Encodes one frame word.
#[inline]
pub fn encode_word(word: u32) -> [u8; FRAME_SIZE] {
    word.to_be_bytes()
}

/// Builds the frames of one refresh cycle.
pub fn build_refresh_cycle(words: &[u32]) -> Vec<[u8; FRAME_SIZE]> {
    let mut frames = Vec::with_capacity(words.len() + 1);
    frames.extend(words.iter().map(|&word| encode_word(word)));
    frames.push(BLANKING_FRAME);
    frames
}
