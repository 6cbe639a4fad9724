//! Parser for Evolution Engine cache table-of-contents (`.toc`) files.
//!
//! A TOC stream lists every file and directory of one archive segment as a
//! flat array of fixed-size records. Each record points at its parent
//! directory by ordinal, so full paths have to be reconstructed while
//! walking the records in order. The payload bytes live in a sibling
//! `.cache` blob file addressed by each record's offset.

pub mod error;
pub mod toc;

pub use error::{Error, Result};
pub use toc::{Toc, TocEntry};

/// Magic word at the start of every TOC stream.
pub const TOC_MAGIC: u32 = 0x1867_C64E;

/// The only TOC format revision this crate understands.
pub const TOC_VERSION: u32 = 0x14;

/// Size of one on-disk entry record.
pub const ENTRY_LENGTH: usize = 0x60;

/// Capacity of the fixed-width name field inside a record.
pub const NAME_LENGTH: usize = 0x40;
