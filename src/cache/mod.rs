//! Freshness cache
//!
//! Tracks content hashes of every loaded document plus a config
//! fingerprint. When nothing changed since the last build, the whole
//! generation step is skipped; any change triggers a full rebuild.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Cache file path relative to the site base dir
const CACHE_FILE: &str = ".inkpress-cache/db.json";

/// Cache database for change detection between builds
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CacheDb {
    /// Version of the cache format
    pub version: u32,
    /// Fingerprint of site.yml and the generator itself
    pub config_hash: u64,
    /// Content hash per document, keyed by source path
    pub documents: HashMap<String, u64>,
}

impl CacheDb {
    /// Current cache format version
    const VERSION: u32 = 1;

    /// Load the cache from disk, or return an empty one
    pub fn load(base_dir: &Path) -> Self {
        let cache_path = base_dir.join(CACHE_FILE);
        if let Ok(content) = fs::read_to_string(&cache_path) {
            if let Ok(cache) = serde_json::from_str::<CacheDb>(&content) {
                if cache.version == Self::VERSION {
                    return cache;
                }
                tracing::info!("Cache version mismatch, rebuilding");
            }
        }
        Self::default()
    }

    /// Snapshot the current state for persisting after a build
    pub fn snapshot(config_hash: u64, documents: HashMap<String, u64>) -> Self {
        Self {
            version: Self::VERSION,
            config_hash,
            documents,
        }
    }

    /// Save the cache to disk
    pub fn save(&self, base_dir: &Path) -> Result<()> {
        let cache_path = base_dir.join(CACHE_FILE);
        if let Some(parent) = cache_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(cache_path, content)?;
        Ok(())
    }

    /// True when the current state matches this cache exactly: same config
    /// fingerprint, same document set, same hashes.
    pub fn is_fresh(&self, config_hash: u64, documents: &HashMap<String, u64>) -> bool {
        self.version == Self::VERSION
            && self.config_hash == config_hash
            && self.documents == *documents
    }
}

/// Calculate a hash for file content
pub fn hash_content(content: &str) -> u64 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    hasher.finish()
}

/// Fingerprint of the site config plus the generator version, so a config
/// edit or an upgraded binary invalidates the previous build.
pub fn config_fingerprint(config_path: &Path) -> u64 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    env!("CARGO_PKG_VERSION").hash(&mut hasher);
    if let Ok(content) = fs::read_to_string(config_path) {
        content.hash(&mut hasher);
    }
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn documents() -> HashMap<String, u64> {
        let mut docs = HashMap::new();
        docs.insert("posts/a.md".to_string(), hash_content("aaa"));
        docs.insert("about/index.md".to_string(), hash_content("bbb"));
        docs
    }

    #[test]
    fn test_fresh_when_unchanged() {
        let cache = CacheDb::snapshot(42, documents());
        assert!(cache.is_fresh(42, &documents()));
    }

    #[test]
    fn test_stale_on_config_change() {
        let cache = CacheDb::snapshot(42, documents());
        assert!(!cache.is_fresh(43, &documents()));
    }

    #[test]
    fn test_stale_on_content_change() {
        let cache = CacheDb::snapshot(42, documents());
        let mut changed = documents();
        changed.insert("posts/a.md".to_string(), hash_content("edited"));
        assert!(!cache.is_fresh(42, &changed));
    }

    #[test]
    fn test_stale_on_added_or_removed_document() {
        let cache = CacheDb::snapshot(42, documents());

        let mut added = documents();
        added.insert("posts/new.md".to_string(), hash_content("new"));
        assert!(!cache.is_fresh(42, &added));

        let mut removed = documents();
        removed.remove("posts/a.md");
        assert!(!cache.is_fresh(42, &removed));
    }

    #[test]
    fn test_roundtrip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheDb::snapshot(7, documents());
        cache.save(dir.path()).unwrap();

        let loaded = CacheDb::load(dir.path());
        assert!(loaded.is_fresh(7, &documents()));
    }

    #[test]
    fn test_empty_cache_is_stale() {
        let loaded = CacheDb::load(Path::new("/nonexistent"));
        assert!(!loaded.is_fresh(0, &HashMap::new()));
    }
}
