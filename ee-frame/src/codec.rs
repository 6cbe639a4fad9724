//! Codec seam between the frame walker and block decompressors.

use crate::Result;

/// A block decompressor.
///
/// Implementations fill `output` from `input` and return the number of
/// bytes written; the caller is responsible for checking that the count
/// matches the frame's declared decompressed size.
pub trait Codec: Send + Sync {
    fn decompress(&self, input: &[u8], output: &mut [u8]) -> Result<usize>;
}
