//! End-to-end frame assembly through the public API.

use ee_frame::{CODEC_OODLE, Codec, Error, FrameHeader, Result, decompress};
use pretty_assertions::assert_eq;

/// Deterministic stand-in for the native codec: repeats the input to fill
/// the requested output.
struct CyclingCodec;

impl Codec for CyclingCodec {
    fn decompress(&self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        for (i, byte) in output.iter_mut().enumerate() {
            *byte = input[i % input.len()];
        }
        Ok(output.len())
    }
}

fn new_format_frame(codec: u8, block: &[u8], decompressed: u32) -> Vec<u8> {
    let header = FrameHeader {
        codec,
        decompressed_size: decompressed,
        compressed_size: block.len() as u32,
        new_format: true,
    };
    let mut data = header.pack().to_be_bytes().to_vec();
    data.extend_from_slice(block);
    data
}

fn legacy_frame(block: &[u8], decompressed: u16) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&(block.len() as u16).to_be_bytes());
    data.extend_from_slice(&decompressed.to_be_bytes());
    data.extend_from_slice(block);
    data
}

#[test]
fn mixed_generations_assemble_in_order() {
    // A store block in each generation, a codec block, and a legacy LZ
    // block, all in one entry.
    let mut data = new_format_frame(CODEC_OODLE, b"head", 4);
    data.extend(legacy_frame(b"-mid-", 5));
    data.extend(new_format_frame(CODEC_OODLE, b"xy", 6));
    // Literal "ab" followed by a distance-1 overlap copy of 3.
    data.extend(legacy_frame(&[0x01, b'a', b'b', 0x20, 0x01], 5));

    let output = decompress(&data, 20, &CyclingCodec).unwrap();
    assert_eq!(output, b"head-mid-xyxyxyababa");
}

#[test]
fn unavailable_native_codec_fails_per_entry() {
    let dir = tempfile::tempdir().unwrap();
    let codec = ee_frame::OodleCodec::with_search_dir(dir.path());

    // A compressed new-format frame needs the native codec...
    let data = new_format_frame(CODEC_OODLE, b"zz", 8);
    let err = decompress(&data, 8, &codec).unwrap_err();
    assert!(matches!(err, Error::CodecUnavailable));

    // ...but store blocks and legacy frames decode without it.
    let data = legacy_frame(b"still works", 11);
    let output = decompress(&data, 11, &codec).unwrap();
    assert_eq!(output, b"still works");
}
