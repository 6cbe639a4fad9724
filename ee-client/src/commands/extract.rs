use std::fs;
use std::path::Path;

use anyhow::Context;
use filetime::FileTime;
use tracing::{debug, info, warn};

use super::load_cache;

/// Windows file-time epoch (1601-01-01) to Unix epoch, in seconds.
const FILETIME_EPOCH_DIFF: i64 = 11_644_473_600;

pub fn handle(
    cache_dir: &Path,
    output_dir: &Path,
    filter: Option<&str>,
    codec_dir: Option<&Path>,
) -> anyhow::Result<()> {
    let manager = load_cache(cache_dir, codec_dir)?;
    let filter = filter.map(str::to_ascii_lowercase);

    fs::create_dir_all(output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;

    let mut written = 0usize;
    let mut failed = 0usize;

    for entry in manager.entries() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                // One bad entry must not end the run.
                warn!("Skipping entry: {e}");
                failed += 1;
                continue;
            }
        };

        if let Some(ref needle) = filter {
            if !entry.path.to_ascii_lowercase().contains(needle) {
                continue;
            }
        }

        let relative = entry.path.trim_start_matches('/');
        let target = output_dir
            .join(entry.variant.to_string())
            .join(entry.locale.to_string())
            .join(relative);

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        fs::write(&target, &entry.data)
            .with_context(|| format!("writing {}", target.display()))?;

        if let Some(mtime) = filetime_to_unix(entry.entry.time) {
            if let Err(e) = filetime::set_file_mtime(&target, mtime) {
                debug!("Could not set mtime on {}: {e}", target.display());
            }
        }

        info!("{}", entry.path);
        written += 1;
    }

    info!("Extracted {written} files ({failed} failed)");
    Ok(())
}

/// Convert a Windows file-time (100 ns ticks since 1601) to a [`FileTime`].
fn filetime_to_unix(ticks: i64) -> Option<FileTime> {
    if ticks <= 0 {
        return None;
    }
    let secs = ticks / 10_000_000 - FILETIME_EPOCH_DIFF;
    let nanos = (ticks % 10_000_000) * 100;
    Some(FileTime::from_unix_time(secs, nanos as u32))
}
