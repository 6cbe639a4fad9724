//! Content-cache engine for Evolution Engine archives.
//!
//! An installation ships its assets as paired `.toc` / `.cache` files, one
//! pair per content variant (header, base, full) and locale. This crate
//! aggregates any number of parsed tables into one composite key space
//! over `(variant, locale, path)` and serves per-file reads with locale
//! fallback, decompressing payloads on demand through [`ee_frame`].
//!
//! All tables must be loaded before reads begin; afterwards every read
//! operation takes `&self` and is safe to call concurrently.

pub mod blob;
pub mod error;
pub mod manager;
pub mod table;
pub mod types;

pub use error::{CacheError, Result};
pub use manager::CacheManager;
pub use table::ContentTable;
pub use types::{CacheEntry, ContentKey, Locale, Variant};

/// Extension of the blob file that accompanies every TOC.
pub const BLOB_EXTENSION: &str = "cache";
