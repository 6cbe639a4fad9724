//! The cache manager: many content tables, one key space.

use std::collections::HashMap;
use std::path::Path;

use ee_frame::{Codec, OodleCodec};
use tracing::{debug, info};

use crate::error::{CacheError, Result};
use crate::table::ContentTable;
use crate::types::{CacheEntry, ContentKey, Locale, Variant};
use crate::BLOB_EXTENSION;

/// Where a registered key resolves to: a loaded table and an entry index
/// inside it.
#[derive(Debug, Clone)]
struct EntryRef {
    table: String,
    index: usize,
}

struct LoadedTable {
    variant: Variant,
    locale: Locale,
    table: ContentTable,
}

/// Aggregates content tables across variants and locales and serves reads
/// against the composite `(variant, locale, path)` key space.
///
/// Load every table first, from one thread; afterwards all read operations
/// take `&self` and may run concurrently. Dropping the manager closes every
/// backing blob.
pub struct CacheManager {
    /// TOC filename stem -> loaded table.
    tables: HashMap<String, LoadedTable>,
    /// Composite key -> table + entry index. Later loads overwrite earlier
    /// registrations for identical keys.
    entries: HashMap<ContentKey, EntryRef>,
    codec: Box<dyn Codec>,
}

impl CacheManager {
    /// Manager using the native codec, resolved lazily from the current
    /// working directory.
    pub fn new() -> Self {
        Self::with_codec(Box::new(OodleCodec::new()))
    }

    /// Manager with an injected codec for new-format frames.
    pub fn with_codec(codec: Box<dyn Codec>) -> Self {
        Self {
            tables: HashMap::new(),
            entries: HashMap::new(),
            codec,
        }
    }

    /// Load one TOC and register its file entries.
    ///
    /// The filename stem encodes the table's identity:
    /// `{VariantChar}.{Name}[_{LocaleSuffix}].toc`, with the sibling blob at
    /// the same stem and the `.cache` extension. A malformed stem or a
    /// structural TOC error fails this load only; tables loaded earlier
    /// stay intact.
    pub fn load_table(&mut self, toc_path: impl AsRef<Path>) -> Result<()> {
        let toc_path = toc_path.as_ref();
        let stem = toc_path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| {
                CacheError::InvalidTableName(toc_path.display().to_string())
            })?;

        let (variant, name, locale) = parse_stem(stem)?;
        info!("Loading cache TOC {name} (variant: {variant}, locale: {locale})");

        let blob_path = toc_path.with_extension(BLOB_EXTENSION);
        let table = ContentTable::open(toc_path, &blob_path)?;

        for (path, index) in table.toc().files() {
            self.entries.insert(
                ContentKey::new(variant, locale, path),
                EntryRef {
                    table: stem.to_string(),
                    index,
                },
            );
        }

        debug!(
            "Registered {} entries from {stem}",
            table.toc().files().count()
        );
        self.tables.insert(
            stem.to_string(),
            LoadedTable {
                variant,
                locale,
                table,
            },
        );

        Ok(())
    }

    /// Read the header rendition of `path`.
    ///
    /// A miss against `Global` retries once as `English`; `Ok(None)` means
    /// neither locale has the path.
    pub fn read_header(
        &self,
        path: &str,
        locale: Locale,
    ) -> Result<Option<CacheEntry>> {
        match self.read_file(&ContentKey::new(Variant::Header, locale, path))? {
            None if locale == Locale::Global => self.read_file(&ContentKey::new(
                Variant::Header,
                Locale::English,
                path,
            )),
            result => Ok(result),
        }
    }

    /// Read the body of `path`, preferring the full-resolution variant.
    ///
    /// Tries `Full` then `Base`; a miss against `Global` retries the same
    /// two-step lookup as `English`. The returned entry's `variant` field
    /// says which rendition resolved.
    pub fn read_data(
        &self,
        path: &str,
        locale: Locale,
    ) -> Result<Option<CacheEntry>> {
        match self.read_data_at(path, locale)? {
            None if locale == Locale::Global => {
                self.read_data_at(path, Locale::English)
            }
            result => Ok(result),
        }
    }

    fn read_data_at(
        &self,
        path: &str,
        locale: Locale,
    ) -> Result<Option<CacheEntry>> {
        match self.read_file(&ContentKey::new(Variant::Full, locale, path))? {
            None => {
                self.read_file(&ContentKey::new(Variant::Base, locale, path))
            }
            hit => Ok(hit),
        }
    }

    /// Read one registered key, decompressing into a fresh buffer.
    pub fn read_file(&self, key: &ContentKey) -> Result<Option<CacheEntry>> {
        let Some(entry_ref) = self.entries.get(key) else {
            return Ok(None);
        };
        let Some(loaded) = self.tables.get(&entry_ref.table) else {
            return Ok(None);
        };
        let Some(entry) = loaded.table.toc().entries.get(entry_ref.index) else {
            return Ok(None);
        };
        if entry.is_directory() {
            return Ok(None);
        }

        let data = loaded.table.read(entry_ref.index, self.codec.as_ref())?;

        Ok(Some(CacheEntry {
            path: loaded.table.toc().paths[entry_ref.index].clone(),
            variant: loaded.variant,
            locale: loaded.locale,
            entry: entry.clone(),
            data,
        }))
    }

    /// Resolve a key to its table entry without reading the payload.
    ///
    /// Returns the archive's original-case path alongside the raw record.
    pub fn stat(&self, key: &ContentKey) -> Option<(&str, &ee_toc::TocEntry)> {
        let entry_ref = self.entries.get(key)?;
        let loaded = self.tables.get(&entry_ref.table)?;
        let entry = loaded.table.toc().entries.get(entry_ref.index)?;
        Some((loaded.table.toc().paths[entry_ref.index].as_str(), entry))
    }

    /// All registered keys.
    pub fn keys(&self) -> impl Iterator<Item = &ContentKey> {
        self.entries.keys()
    }

    /// All registered paths (original casing).
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|key| key.path.as_str())
    }

    /// Every registered key with its decompressed content.
    ///
    /// Each item decompresses eagerly and nothing is cached, so a full
    /// drain costs time proportional to the whole archive. Intended for
    /// extraction workloads.
    pub fn entries(
        &self,
    ) -> impl Iterator<Item = Result<CacheEntry>> + '_ {
        self.entries
            .keys()
            .filter_map(|key| self.read_file(key).transpose())
    }

    /// Number of registered keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CacheManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Split a TOC filename stem into variant tag, logical name, and locale.
fn parse_stem(stem: &str) -> Result<(Variant, String, Locale)> {
    let (base, locale) = match stem.split_once('_') {
        Some((base, suffix)) => (
            base,
            Locale::from_suffix(suffix)
                .ok_or_else(|| CacheError::UnknownLocale(suffix.to_string()))?,
        ),
        None => (stem, Locale::Global),
    };

    let mut chars = base.chars();
    let tag = chars
        .next()
        .ok_or_else(|| CacheError::InvalidTableName(stem.to_string()))?;
    let variant =
        Variant::from_tag(tag).ok_or(CacheError::UnknownVariant(tag))?;

    if chars.next() != Some('.') {
        return Err(CacheError::InvalidTableName(stem.to_string()));
    }

    let name: String = chars.collect();
    if name.is_empty() {
        return Err(CacheError::InvalidTableName(stem.to_string()));
    }

    Ok((variant, name, locale))
}
