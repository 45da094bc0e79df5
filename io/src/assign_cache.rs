//! The palette-assignment cache: a `key=value` text file pairing each tile's color set with the
//! hardware palette index it was assigned last run, so a re-compile that doesn't change any colors
//! can skip the search entirely (SPEC_FULL.md §4.12, `CompilerConfig::cache_assign`).

use std::collections::HashMap;
use std::path::Path;

use gbatiles_core::colorset::ColorSet;
use gbatiles_core::diagnostics::{ErrorsAndWarnings, WarningKind};

use crate::error::{IoError, IoResult};

fn key_of(set: &ColorSet) -> String {
    set.words().iter().map(|w| format!("{w:016x}")).collect::<Vec<_>>().join("")
}

fn set_of(key: &str) -> Option<ColorSet> {
    let word_len = 16;
    if key.len() != word_len * ColorSet::word_count() {
        return None;
    }
    let words: Option<Vec<u64>> = (0..ColorSet::word_count())
        .map(|i| u64::from_str_radix(&key[i * word_len..(i + 1) * word_len], 16).ok())
        .collect();
    ColorSet::from_words(&words?)
}

/// Loads an assignment cache. A missing file is not an error: callers see an empty map and the
/// caller-level `missing-assign-cache` warning (distinct from a file that exists but is corrupt,
/// which is `invalid-assign-cache`).
pub fn load(path: &Path, errors: &mut ErrorsAndWarnings) -> IoResult<HashMap<ColorSet, usize>> {
    let Ok(contents) = std::fs::read_to_string(path) else {
        errors.push_warning(WarningKind::MissingAssignCache, None, format!("no assignment cache at {}", path.display()));
        return Ok(HashMap::new());
    };

    let mut cache = HashMap::new();
    for (lineno, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            errors.push_warning(
                WarningKind::InvalidAssignCache,
                None,
                format!("{}:{}: missing '=' in assignment cache entry", path.display(), lineno + 1),
            );
            continue;
        };

        let (Some(set), Ok(palette_index)) = (set_of(key), value.trim().parse::<usize>()) else {
            errors.push_warning(
                WarningKind::InvalidAssignCache,
                None,
                format!("{}:{}: unreadable assignment cache entry", path.display(), lineno + 1),
            );
            continue;
        };

        cache.insert(set, palette_index);
    }

    Ok(cache)
}

/// Writes `cache` back out, one `key=value` line per entry, in a stable order (sorted by key) so
/// repeated compiles with the same inputs produce byte-identical cache files.
pub fn save(path: &Path, cache: &HashMap<ColorSet, usize>) -> IoResult<()> {
    let mut lines: Vec<String> = cache.iter().map(|(set, idx)| format!("{}={idx}", key_of(set))).collect();
    lines.sort();
    lines.push(String::new());

    std::fs::write(path, lines.join("\n")).map_err(|source| IoError::Write { path: path.to_path_buf(), source })
}

/// Checks a freshly computed assignment against the cache: if a tile's color set was cached at a
/// *different* palette index than the fresh search produced, the cache is stale for that entry and
/// `assign-cache-override` is warned (the fresh result always wins).
pub fn check_overrides(
    fresh: &HashMap<ColorSet, usize>,
    cached: &HashMap<ColorSet, usize>,
    errors: &mut ErrorsAndWarnings,
) {
    for (set, &fresh_index) in fresh {
        if let Some(&cached_index) = cached.get(set) {
            if cached_index != fresh_index {
                errors.push_warning(
                    WarningKind::AssignCacheOverride,
                    None,
                    format!("cached palette index {cached_index} for a tile's color set no longer matches; using {fresh_index}"),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_save_and_load() {
        let mut set = ColorSet::empty();
        set.set(3);
        set.set(100);

        let mut cache = HashMap::new();
        cache.insert(set, 2usize);

        let path = std::env::temp_dir().join("gbatiles_io_test_cache.txt");
        save(&path, &cache).unwrap();

        let mut errors = ErrorsAndWarnings::new(HashMap::new());
        let loaded = load(&path, &mut errors).unwrap();
        assert_eq!(loaded.get(&set), Some(&2));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_file_warns_but_does_not_error() {
        let path = std::env::temp_dir().join("gbatiles_io_test_cache_missing_definitely.txt");
        let mut errors = ErrorsAndWarnings::new(HashMap::new());
        let cache = load(&path, &mut errors).unwrap();
        assert!(cache.is_empty());
        assert_eq!(errors.diagnostics().len(), 1);
    }
}
