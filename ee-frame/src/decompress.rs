//! Frame-sequence reassembly.

use byteorder::{BigEndian, ByteOrder};
use tracing::trace;

use crate::{CODEC_OODLE, Codec, Error, FrameHeader, MAX_BLOCK_SIZE, Result, lzf};

/// Decompress one entry's compressed span.
///
/// `data` is the complete stored payload of a compressed entry;
/// `expected_size` is the entry's declared decompressed size. Frames are
/// consumed until the span is exhausted, and the assembled output must
/// match `expected_size` exactly.
///
/// Raw (uncompressed) entries never get here: their stored and declared
/// sizes are equal and the caller returns the span unchanged.
pub fn decompress(
    data: &[u8],
    expected_size: usize,
    codec: &dyn Codec,
) -> Result<Vec<u8>> {
    let mut output = Vec::with_capacity(expected_size);
    let mut pos = 0;

    while pos < data.len() {
        if data[pos] >> 7 == 1 {
            pos = new_format_frame(data, pos, &mut output, codec)?;
        } else {
            pos = legacy_frame(data, pos, &mut output)?;
        }
    }

    if output.len() != expected_size {
        return Err(Error::FrameAssembly {
            expected: expected_size,
            actual: output.len(),
        });
    }

    Ok(output)
}

/// One new-format frame: an 8-byte packed header, then the block bytes.
fn new_format_frame(
    data: &[u8],
    pos: usize,
    output: &mut Vec<u8>,
    codec: &dyn Codec,
) -> Result<usize> {
    let raw = data.get(pos..pos + 8).ok_or(Error::TruncatedFrame {
        expected: pos + 8,
        actual: data.len(),
    })?;
    let header = FrameHeader::unpack(BigEndian::read_u64(raw));
    let pos = pos + 8;

    trace!(
        "New-format frame: codec {}, {} -> {} bytes",
        header.codec, header.compressed_size, header.decompressed_size
    );

    if header.decompressed_size as usize > MAX_BLOCK_SIZE {
        return Err(Error::OversizedBlock(header.decompressed_size));
    }

    let compressed = header.compressed_size as usize;
    let block = data
        .get(pos..pos + compressed)
        .ok_or(Error::TruncatedFrame {
            expected: pos + compressed,
            actual: data.len(),
        })?;

    if !header.is_compressed() {
        output.extend_from_slice(block);
        return Ok(pos + compressed);
    }

    if header.codec != CODEC_OODLE {
        return Err(Error::UnknownCodec(header.codec));
    }

    let decompressed = header.decompressed_size as usize;
    let start = output.len();
    output.resize(start + decompressed, 0);
    let written = codec.decompress(block, &mut output[start..])?;
    if written != decompressed {
        return Err(Error::Decode {
            expected: decompressed,
            actual: written,
        });
    }

    Ok(pos + compressed)
}

/// One legacy frame: two big-endian 16-bit sizes, then the block bytes.
fn legacy_frame(data: &[u8], pos: usize, output: &mut Vec<u8>) -> Result<usize> {
    let sizes = data.get(pos..pos + 4).ok_or(Error::TruncatedFrame {
        expected: pos + 4,
        actual: data.len(),
    })?;
    let compressed = BigEndian::read_u16(&sizes[..2]) as usize;
    let decompressed = BigEndian::read_u16(&sizes[2..]) as usize;
    let pos = pos + 4;

    trace!("Legacy frame: {compressed} -> {decompressed} bytes");

    let block = data
        .get(pos..pos + compressed)
        .ok_or(Error::TruncatedFrame {
            expected: pos + compressed,
            actual: data.len(),
        })?;

    if compressed == decompressed {
        output.extend_from_slice(block);
        return Ok(pos + compressed);
    }

    let start = output.len();
    output.resize(start + decompressed, 0);
    let written = lzf::decompress(block, &mut output[start..])?;
    if written != decompressed {
        return Err(Error::Decode {
            expected: decompressed,
            actual: written,
        });
    }

    Ok(pos + compressed)
}
