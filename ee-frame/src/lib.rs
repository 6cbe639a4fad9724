//! Frame-oriented decompression for Evolution Engine cache payloads.
//!
//! Compressed entries in a `.cache` blob are stored as a sequence of
//! self-describing frames. Two frame generations coexist in shipped data:
//! the new format (a 64-bit packed header selecting a codec by id) and the
//! legacy format (two 16-bit sizes followed by a custom LZ77-variant
//! stream). This crate walks the frame sequence, dispatches each block to
//! the right codec, and reassembles the original bytes.
//!
//! The only codec defined for new-format frames is a native decompressor
//! resolved at runtime from a shared library; it is reached through the
//! [`Codec`] trait so the framing logic can be tested without the library
//! being present.

pub mod codec;
pub mod decompress;
pub mod error;
pub mod header;
pub mod lzf;
pub mod oodle;

pub use codec::Codec;
pub use decompress::decompress;
pub use error::{Error, Result};
pub use header::FrameHeader;
pub use oodle::OodleCodec;

/// Codec id carried by new-format frame headers for the native codec.
pub const CODEC_OODLE: u8 = 1;

/// Largest decompressed size a single new-format block may declare.
pub const MAX_BLOCK_SIZE: usize = 0x40000;
