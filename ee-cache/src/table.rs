//! One parsed TOC plus its backing blob.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use ee_frame::Codec;
use ee_toc::Toc;

use crate::blob::BlobReader;
use crate::error::{CacheError, Result};

/// An immutable content table: the parsed TOC of one archive segment and
/// the blob its entries point into.
pub struct ContentTable {
    toc: Toc,
    blob: BlobReader,
}

impl ContentTable {
    /// Parse `toc_path` and open its sibling blob.
    pub fn open(toc_path: &Path, blob_path: &Path) -> Result<Self> {
        let mut reader = BufReader::new(File::open(toc_path)?);
        let toc = Toc::parse(&mut reader)?;
        let blob = BlobReader::open(blob_path)?;
        Ok(Self { toc, blob })
    }

    pub fn toc(&self) -> &Toc {
        &self.toc
    }

    /// Read and decompress the payload of entry `index`.
    ///
    /// Directory entries yield an empty buffer. Every call re-reads and
    /// re-decompresses; results are never cached.
    pub fn read(&self, index: usize, codec: &dyn Codec) -> Result<Vec<u8>> {
        let entry = self
            .toc
            .entries
            .get(index)
            .ok_or(CacheError::EntryOutOfRange(index))?;

        if entry.is_directory() {
            return Ok(Vec::new());
        }

        let raw = self
            .blob
            .read_at(entry.offset as u64, entry.compressed_size as usize)?;

        if !entry.is_compressed() {
            return Ok(raw);
        }

        Ok(ee_frame::decompress(&raw, entry.size as usize, codec)?)
    }
}
