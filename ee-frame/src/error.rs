//! Error types for frame parsing and decompression

use thiserror::Error;

/// Result type for frame operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A frame header or block extends past the end of the compressed span
    #[error("Truncated frame data: expected {expected} bytes, got {actual}")]
    TruncatedFrame { expected: usize, actual: usize },

    /// The native codec library could not be resolved
    #[error("Native codec library is not available")]
    CodecUnavailable,

    /// A new-format frame names a codec this crate does not know
    #[error("Unknown codec id: {0:#04x}")]
    UnknownCodec(u8),

    /// A new-format frame declares a block larger than the format allows
    #[error("Block decompressed size {0:#x} exceeds the per-block maximum")]
    OversizedBlock(u32),

    /// A codec produced a different number of bytes than the frame declared
    #[error("Codec produced {actual} bytes, expected {expected}")]
    Decode { expected: usize, actual: usize },

    /// The assembled output does not match the entry's decompressed size
    #[error("Frame assembly produced {actual} bytes, expected {expected}")]
    FrameAssembly { expected: usize, actual: usize },

    /// The legacy LZ stream is structurally invalid
    #[error("Malformed legacy LZ stream: {0}")]
    MalformedLz(String),
}
