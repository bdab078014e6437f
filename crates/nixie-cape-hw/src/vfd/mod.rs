//! VFD display module.
//!
//! Renders text onto a multi-digit vacuum-fluorescent display driven over SPI
//! through a MAX6921-style segment driver, with runtime-configured wiring.

mod config;
mod device;
mod pins;

pub mod framebuffer;
pub mod glyph;
pub mod protocol;
pub mod text;

pub use config::{VfdConfig, DEFAULT_REFRESH_RATE_MS};
pub use device::{SpidevVfd, VfdDevice};
pub use framebuffer::FrameBuffer;
pub use glyph::{glyph_to_mask, mask_to_glyph, DecodedGlyph, DECIMAL_POINT};
pub use pins::PinMap;
pub use protocol::{BLANKING_FRAME, FRAME_SIZE};
pub use text::{decode_text, encode_text};
