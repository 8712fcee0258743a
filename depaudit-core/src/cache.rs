//! Audit result cache using SHA-256 over the snapshot input.
//!
//! The snapshot fully determines an audit, so rendered results are cached
//! in `.depaudit/cache.json` next to the snapshot, keyed by a hash over
//! the snapshot bytes and the report-shaping options. Any load problem —
//! missing file, corrupt JSON, oversized file, incompatible version —
//! degrades to a cache miss, never an error.
//!
//! # Cache Versioning
//!
//! The cache includes version metadata so it is invalidated when:
//! - The depaudit version changes (classification logic may differ)
//! - The cache format changes

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Maximum cache file size (10MB) - prevents unbounded cache growth
const MAX_CACHE_SIZE_BYTES: usize = 10_000_000;

/// Current cache format version. Increment when cache format changes.
const CACHE_VERSION: u32 = 1;

/// Depaudit version for cache compatibility checking.
const DEPAUDIT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Cache metadata for version checking.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct CacheMetadata {
    /// Cache format version
    pub cache_version: u32,
    /// Depaudit version that created this cache
    pub depaudit_version: String,
    /// Timestamp when cache was created
    #[serde(default)]
    pub created_at: u64,
}

impl CacheMetadata {
    /// Create metadata for current environment.
    pub fn current() -> Self {
        let created_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        Self {
            cache_version: CACHE_VERSION,
            depaudit_version: DEPAUDIT_VERSION.to_string(),
            created_at,
        }
    }

    /// Check if this cache is compatible with the current version.
    pub fn is_compatible(&self) -> bool {
        if self.cache_version != CACHE_VERSION {
            return false;
        }

        let current_major = DEPAUDIT_VERSION.split('.').next().unwrap_or("0");
        let cached_major = self.depaudit_version.split('.').next().unwrap_or("0");

        current_major == cached_major
    }
}

/// One cached per-project audit result.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CachedAudit {
    /// Input hash this entry was computed from.
    pub input_hash: String,
    /// Rendered text report; empty when clean.
    pub report: String,
    /// Number of flagged artifacts.
    pub problem_count: usize,
}

/// The full cache model, stored as `.depaudit/cache.json`.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct AuditCache {
    /// Cache metadata for version checking
    #[serde(default)]
    pub metadata: CacheMetadata,
    /// Every project path of the snapshot, as of the last run. A
    /// whole-build cache hit requires a current entry for each of these.
    #[serde(default)]
    pub snapshot_projects: Vec<String>,
    /// Maps project path to its cached audit.
    pub projects: HashMap<String, CachedAudit>,
}

impl AuditCache {
    /// A fresh cache with current metadata.
    pub fn new() -> Self {
        Self {
            metadata: CacheMetadata::current(),
            snapshot_projects: Vec::new(),
            projects: HashMap::new(),
        }
    }

    /// Fetch a cached entry if it matches the given input hash.
    pub fn lookup(&self, project: &str, input_hash: &str) -> Option<&CachedAudit> {
        self.projects
            .get(project)
            .filter(|entry| entry.input_hash == input_hash)
    }

    /// Record an entry for a project, replacing any stale one.
    pub fn record(&mut self, project: &str, entry: CachedAudit) {
        self.projects.insert(project.to_string(), entry);
    }
}

/// Compute a hex SHA-256 over the snapshot bytes and audit options.
///
/// The options participate because filters change what a report contains;
/// two runs with different filters must not share a cache entry.
pub fn input_hash(snapshot_bytes: &[u8], include_filters: &[String]) -> String {
    let mut sha = Sha256::new();
    sha.update(snapshot_bytes);
    for filter in include_filters {
        sha.update([0u8]);
        sha.update(filter.as_bytes());
    }
    format!("{:x}", sha.finalize())
}

/// Path of the cache file for a snapshot directory.
fn cache_path(dir: &Path) -> PathBuf {
    dir.join(".depaudit").join("cache.json")
}

/// Load the cache from `.depaudit/cache.json`.
///
/// Returns `None` if the file is missing, oversized, corrupted, or
/// version-incompatible.
pub fn load_cache(dir: &Path) -> Option<AuditCache> {
    let path = cache_path(dir);
    let metadata = fs::metadata(&path).ok()?;
    if metadata.len() as usize > MAX_CACHE_SIZE_BYTES {
        tracing::warn!(path = %path.display(), "cache file too large; ignoring");
        return None;
    }

    let content = fs::read_to_string(&path).ok()?;
    let cache: AuditCache = serde_json::from_str(&content).ok()?;

    if !cache.metadata.is_compatible() {
        tracing::debug!(
            cached = %cache.metadata.depaudit_version,
            "cache version incompatible; ignoring"
        );
        return None;
    }

    Some(cache)
}

/// Save the cache to `.depaudit/cache.json`, creating the directory.
pub fn save_cache(dir: &Path, cache: &AuditCache) -> Result<()> {
    let path = cache_path(dir);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create cache dir {}", parent.display()))?;
    }

    let content = serde_json::to_string(cache).context("Failed to serialize cache")?;
    fs::write(&path, content)
        .with_context(|| format!("Failed to write cache to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("depaudit_cache_{}_{}", name, std::process::id()));
        if dir.exists() {
            fs::remove_dir_all(&dir).ok();
        }
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_input_hash_changes_with_filters() {
        let bytes = b"snapshot";
        let bare = input_hash(bytes, &[]);
        let filtered = input_hash(bytes, &["com.acme".to_string()]);
        assert_ne!(bare, filtered);
        assert_eq!(bare, input_hash(bytes, &[]));
    }

    #[test]
    fn test_cache_roundtrip() {
        let dir = temp_dir("roundtrip");

        let mut cache = AuditCache::new();
        cache.record(
            ":app",
            CachedAudit {
                input_hash: "abc".into(),
                report: String::new(),
                problem_count: 0,
            },
        );
        save_cache(&dir, &cache).unwrap();

        let loaded = load_cache(&dir).unwrap();
        assert!(loaded.lookup(":app", "abc").is_some());
        assert!(loaded.lookup(":app", "other-hash").is_none());
        assert!(loaded.lookup(":lib", "abc").is_none());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_cache_is_none() {
        let dir = temp_dir("missing");
        assert!(load_cache(&dir).is_none());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_corrupt_cache_is_none() {
        let dir = temp_dir("corrupt");
        fs::create_dir_all(dir.join(".depaudit")).unwrap();
        fs::write(dir.join(".depaudit/cache.json"), "not json{{").unwrap();
        assert!(load_cache(&dir).is_none());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_incompatible_version_is_none() {
        let dir = temp_dir("version");
        let mut cache = AuditCache::new();
        cache.metadata.cache_version = CACHE_VERSION + 1;
        save_cache(&dir, &cache).unwrap();
        assert!(load_cache(&dir).is_none());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_metadata_compatibility() {
        assert!(CacheMetadata::current().is_compatible());

        let stale = CacheMetadata {
            cache_version: CACHE_VERSION,
            depaudit_version: "999.0.0".into(),
            created_at: 0,
        };
        assert!(!stale.is_compatible());
    }
}
