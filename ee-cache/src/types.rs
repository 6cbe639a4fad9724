//! Common types for the cache key space.

use std::fmt;
use std::hash::{Hash, Hasher};

use ee_toc::TocEntry;

/// Which rendition of a file a table carries, encoded as the first
/// character of the TOC filename stem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Header-only metadata (`H`).
    Header,
    /// Base-resolution body (`B`).
    Base,
    /// Full-resolution body (`F`).
    Full,
}

impl Variant {
    pub fn from_tag(tag: char) -> Option<Self> {
        match tag {
            'B' => Some(Self::Base),
            'F' => Some(Self::Full),
            'H' => Some(Self::Header),
            _ => None,
        }
    }

    pub fn tag(self) -> char {
        match self {
            Self::Base => 'B',
            Self::Full => 'F',
            Self::Header => 'H',
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Header => "Header",
            Self::Base => "Base",
            Self::Full => "Full",
        };
        write!(f, "{name}")
    }
}

/// Language/region tag selecting among regional table variants.
///
/// Tables without a locale suffix in their filename are `Global`; reads
/// against `Global` fall back to `English` on a miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locale {
    Global,
    English,
    German,
    Spanish,
    French,
    Italian,
    Japanese,
    Korean,
    Polish,
    Portuguese,
    Russian,
    TraditionalChinese,
    Thai,
    Turkish,
    Ukrainian,
    SimplifiedChinese,
    Unspecified,
}

impl Locale {
    /// Decode a TOC filename suffix. A leading underscore is tolerated.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        let suffix = suffix.trim_start_matches('_').to_ascii_lowercase();
        match suffix.as_str() {
            "" | "global" => Some(Self::Global),
            "en" => Some(Self::English),
            "de" => Some(Self::German),
            "es" => Some(Self::Spanish),
            "fr" => Some(Self::French),
            "it" => Some(Self::Italian),
            "ja" => Some(Self::Japanese),
            "ko" => Some(Self::Korean),
            "pl" => Some(Self::Polish),
            "pt" => Some(Self::Portuguese),
            "ru" => Some(Self::Russian),
            "tc" => Some(Self::TraditionalChinese),
            "th" => Some(Self::Thai),
            "tr" => Some(Self::Turkish),
            "uk" => Some(Self::Ukrainian),
            "zh" => Some(Self::SimplifiedChinese),
            "xx" => Some(Self::Unspecified),
            _ => None,
        }
    }

    /// The filename suffix form of this locale.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::English => "en",
            Self::German => "de",
            Self::Spanish => "es",
            Self::French => "fr",
            Self::Italian => "it",
            Self::Japanese => "ja",
            Self::Korean => "ko",
            Self::Polish => "pl",
            Self::Portuguese => "pt",
            Self::Russian => "ru",
            Self::TraditionalChinese => "tc",
            Self::Thai => "th",
            Self::Turkish => "tr",
            Self::Ukrainian => "uk",
            Self::SimplifiedChinese => "zh",
            Self::Unspecified => "xx",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Composite index into the cache manager's key space.
///
/// Paths compare and hash ASCII-case-insensitively but keep their original
/// casing for display.
#[derive(Debug, Clone)]
pub struct ContentKey {
    pub variant: Variant,
    pub locale: Locale,
    pub path: String,
}

impl ContentKey {
    pub fn new(variant: Variant, locale: Locale, path: impl Into<String>) -> Self {
        Self {
            variant,
            locale,
            path: path.into(),
        }
    }
}

impl PartialEq for ContentKey {
    fn eq(&self, other: &Self) -> bool {
        self.variant == other.variant
            && self.locale == other.locale
            && self.path.eq_ignore_ascii_case(&other.path)
    }
}

impl Eq for ContentKey {}

impl Hash for ContentKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.variant.hash(state);
        self.locale.hash(state);
        for byte in self.path.bytes() {
            byte.to_ascii_lowercase().hash(state);
        }
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}{}", self.variant, self.locale, self.path)
    }
}

/// One resolved read: the entry's metadata plus its decompressed payload.
///
/// Owned by the caller; nothing is cached behind it.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Full path with original casing.
    pub path: String,
    pub variant: Variant,
    pub locale: Locale,
    /// The raw TOC record the read resolved to.
    pub entry: TocEntry,
    /// Decompressed payload.
    pub data: Vec<u8>,
}

impl CacheEntry {
    /// Whether the full-resolution variant is what resolved.
    pub fn is_full(&self) -> bool {
        self.variant == Variant::Full
    }
}
