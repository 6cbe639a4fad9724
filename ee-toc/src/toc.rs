//! TOC stream decoding and path reconstruction.

use byteorder::{LittleEndian, ReadBytesExt};
use std::collections::HashMap;
use std::io::Read;
use tracing::{debug, trace};

use crate::{ENTRY_LENGTH, Error, NAME_LENGTH, Result, TOC_MAGIC, TOC_VERSION};

/// One decoded TOC record.
///
/// Records describe both files and directories; directories are marked by a
/// `-1` offset or a non-positive size and carry no payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    /// Byte offset of the payload inside the sibling blob file. `-1` for
    /// directories.
    pub offset: i64,

    /// Windows file-time timestamp (100 ns ticks since 1601-01-01 UTC).
    pub time: i64,

    /// Stored payload length in the blob file.
    pub compressed_size: i32,

    /// Payload length after decompression.
    pub size: i32,

    pub flags: i32,

    /// 1-based ordinal of the parent directory, in the order directories
    /// appear in the record stream. `0` means the root.
    pub parent: i32,

    /// Entry name, trimmed at the first NUL of the fixed-width field.
    pub name: String,
}

impl TocEntry {
    /// Decode one fixed-size record.
    fn parse<R: Read>(f: &mut R) -> Result<Self> {
        let offset = f.read_i64::<LittleEndian>()?;
        let time = f.read_i64::<LittleEndian>()?;
        let compressed_size = f.read_i32::<LittleEndian>()?;
        let size = f.read_i32::<LittleEndian>()?;
        let flags = f.read_i32::<LittleEndian>()?;
        let parent = f.read_i32::<LittleEndian>()?;

        let mut raw_name = [0u8; NAME_LENGTH];
        f.read_exact(&mut raw_name)?;
        let end = raw_name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(NAME_LENGTH);
        let name = String::from_utf8_lossy(&raw_name[..end]).into_owned();

        Ok(Self {
            offset,
            time,
            compressed_size,
            size,
            flags,
            parent,
            name,
        })
    }

    /// Whether this record describes a directory rather than a file.
    pub fn is_directory(&self) -> bool {
        self.offset == -1 || self.size <= 0
    }

    /// Whether the payload is stored as a frame sequence rather than raw
    /// bytes.
    pub fn is_compressed(&self) -> bool {
        self.compressed_size != self.size
    }
}

/// A fully parsed TOC: the flat entry array, the reconstructed full path of
/// every entry, and a deduplicated map from normalized file paths to entry
/// indices.
#[derive(Debug, Default)]
pub struct Toc {
    pub entries: Vec<TocEntry>,
    pub paths: Vec<String>,
    files: HashMap<String, usize>,
}

impl Toc {
    /// Parse a complete TOC stream.
    ///
    /// The stream is an 8-byte header followed by fixed-size records until
    /// the end of the stream. Trailing bytes that do not make up a whole
    /// record are ignored.
    pub fn parse<R: Read>(f: &mut R) -> Result<Self> {
        let magic = f.read_u32::<LittleEndian>()?;
        if magic != TOC_MAGIC {
            return Err(Error::InvalidMagic(magic));
        }

        let version = f.read_u32::<LittleEndian>()?;
        if version != TOC_VERSION {
            return Err(Error::UnsupportedVersion(version));
        }

        let mut body = Vec::new();
        f.read_to_end(&mut body)?;

        let count = body.len() / ENTRY_LENGTH;
        let mut cursor = &body[..count * ENTRY_LENGTH];

        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            entries.push(TocEntry::parse(&mut cursor)?);
        }

        let mut toc = Self {
            entries,
            paths: Vec::with_capacity(count),
            files: HashMap::new(),
        };
        toc.reconstruct_paths()?;
        Ok(toc)
    }

    /// Rebuild full paths from the flat parent-indexed records and fill the
    /// file map.
    ///
    /// Directories are assigned sequential ordinals in record order as they
    /// are encountered; parent references always point at an ordinal that
    /// was assigned by an earlier record.
    fn reconstruct_paths(&mut self) -> Result<()> {
        // Ordinal -> entry index, in directory encounter order.
        let mut directories: Vec<usize> = Vec::new();

        for index in 0..self.entries.len() {
            let entry = &self.entries[index];

            let parent_path = if entry.parent > 0 {
                let ordinal = (entry.parent - 1) as usize;
                let parent_index =
                    *directories.get(ordinal).ok_or(Error::InvalidParent {
                        entry: index,
                        parent: entry.parent,
                    })?;
                self.paths[parent_index].as_str()
            } else {
                ""
            };

            let path = format!("{parent_path}/{}", entry.name);

            if entry.is_directory() {
                directories.push(index);
            } else {
                trace!("Found TOC entry {path}");
                let key = path.to_ascii_lowercase();
                let replace = match self.files.get(&key) {
                    // A duplicate path only takes over when it is strictly
                    // newer; ties keep the first-parsed entry.
                    Some(&previous) => entry.time > self.entries[previous].time,
                    None => true,
                };
                if replace {
                    self.files.insert(key, index);
                } else {
                    debug!("Skipping stale duplicate for {path}");
                }
            }

            self.paths.push(path);
        }

        Ok(())
    }

    /// Look up a file entry index by path, case-insensitively.
    ///
    /// Directories are not present in the map.
    pub fn file_index(&self, path: &str) -> Option<usize> {
        self.files.get(&path.to_ascii_lowercase()).copied()
    }

    /// Iterate over the live (deduplicated) file entries as
    /// `(original-case path, entry index)` pairs.
    pub fn files(&self) -> impl Iterator<Item = (&str, usize)> {
        self.files
            .values()
            .map(|&index| (self.paths[index].as_str(), index))
    }

    /// Number of records in the TOC, directories included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
