use std::path::Path;

use super::load_cache;

pub fn handle(cache_dir: &Path, codec_dir: Option<&Path>) -> anyhow::Result<()> {
    let manager = load_cache(cache_dir, codec_dir)?;

    let mut rows: Vec<String> = manager
        .keys()
        .filter_map(|key| {
            let (path, entry) = manager.stat(key)?;
            Some(format!(
                "{}\t{}\t{}\t{path}",
                key.variant, key.locale, entry.size
            ))
        })
        .collect();
    rows.sort();

    for row in rows {
        println!("{row}");
    }

    Ok(())
}
