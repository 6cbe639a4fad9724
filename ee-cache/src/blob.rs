//! Positioned reads over a `.cache` blob file.
//!
//! Blobs are memory-mapped when possible. Larger (or unmappable) files
//! fall back to a buffered reader whose seek+read pairs are serialized
//! behind a mutex, so concurrent readers cannot corrupt each other's
//! position.

use memmap2::{Mmap, MmapOptions};
use parking_lot::Mutex;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use tracing::debug;

use crate::error::{CacheError, Result};

/// Limit mmap to 2GB files.
const MMAP_LIMIT: u64 = 2_147_483_648;

pub struct BlobReader {
    /// Memory-mapped file (if available)
    mmap: Option<Mmap>,
    /// Serialized file reader (fallback)
    file: Option<Mutex<BufReader<File>>>,
    /// Size of the blob
    size: u64,
}

impl BlobReader {
    /// Open a blob file for reading.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let size = file.metadata()?.len();

        debug!("Opening blob: {} (size: {size} bytes)", path.display());

        let mmap = if size > 0 && size < MMAP_LIMIT {
            match unsafe { MmapOptions::new().map(&file) } {
                Ok(mmap) => Some(mmap),
                Err(e) => {
                    debug!("Failed to memory-map blob, using file reader: {e}");
                    None
                }
            }
        } else {
            None
        };

        let file = if mmap.is_none() {
            Some(Mutex::new(BufReader::new(file)))
        } else {
            None
        };

        Ok(Self { mmap, file, size })
    }

    /// Read `length` bytes at `offset` into a fresh buffer.
    pub fn read_at(&self, offset: u64, length: usize) -> Result<Vec<u8>> {
        if offset.checked_add(length as u64).is_none_or(|end| end > self.size) {
            return Err(CacheError::OutOfBounds {
                offset,
                length,
                size: self.size,
            });
        }

        if let Some(ref mmap) = self.mmap {
            let data = &mmap[offset as usize..offset as usize + length];
            Ok(data.to_vec())
        } else if let Some(ref file) = self.file {
            let mut file = file.lock();
            file.seek(SeekFrom::Start(offset))?;
            let mut buffer = vec![0u8; length];
            file.read_exact(&mut buffer)?;
            Ok(buffer)
        } else {
            // No backing handle; the bounds check only lets an empty read
            // get this far.
            Ok(Vec::new())
        }
    }

    /// Size of the blob in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Whether the fast path is active.
    pub fn is_memory_mapped(&self) -> bool {
        self.mmap.is_some()
    }
}
