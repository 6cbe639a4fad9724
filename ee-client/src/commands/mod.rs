pub mod extract;
pub mod list;

use std::path::Path;

use anyhow::Context;
use ee_cache::CacheManager;
use ee_frame::OodleCodec;
use tracing::{info, warn};

/// Build a manager and load every `*.toc` in `cache_dir`.
///
/// Tables that fail to load are skipped with a warning so one corrupt
/// segment does not hide the rest of the installation.
pub fn load_cache(
    cache_dir: &Path,
    codec_dir: Option<&Path>,
) -> anyhow::Result<CacheManager> {
    let codec = match codec_dir {
        Some(dir) => OodleCodec::with_search_dir(dir),
        None => OodleCodec::with_search_dir(cache_dir),
    };
    let mut manager = CacheManager::with_codec(Box::new(codec));

    let mut toc_paths: Vec<_> = std::fs::read_dir(cache_dir)
        .with_context(|| format!("reading cache directory {}", cache_dir.display()))?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("toc"))
        .collect();
    toc_paths.sort();

    if toc_paths.is_empty() {
        anyhow::bail!("no .toc files in {}", cache_dir.display());
    }

    for path in toc_paths {
        if let Err(e) = manager.load_table(&path) {
            warn!("Skipping {}: {e}", path.display());
        }
    }

    info!("Loaded {} keys", manager.len());
    Ok(manager)
}
