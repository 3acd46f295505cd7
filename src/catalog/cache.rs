use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

/// On-disk cache of raw catalog responses, one JSON file per key.
///
/// Owned by the HTTP catalog and passed in at construction; there is no
/// process-wide cache state.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    dir: Option<PathBuf>,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(dir: PathBuf, ttl: Duration) -> Self {
        ResponseCache { dir: Some(dir), ttl }
    }

    /// A cache that never hits and never writes.
    pub fn disabled() -> Self {
        ResponseCache {
            dir: None,
            ttl: Duration::ZERO,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.dir.is_some()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn path_for(dir: &Path, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
            .collect();
        dir.join(format!("{safe}.json"))
    }

    /// Fresh cached value for `key`. Expired entries are removed and count as a miss.
    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        let path = Self::path_for(self.dir.as_deref()?, key);
        let metadata = fs::metadata(&path).ok()?;

        let age = metadata.modified().ok()?.elapsed().unwrap_or(Duration::ZERO);
        if age >= self.ttl {
            let _ = fs::remove_file(&path);
            return None;
        }

        let content = fs::read_to_string(&path).ok()?;
        serde_json::from_str(&content).ok()
    }

    pub fn put(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        let Some(dir) = self.dir.as_deref() else {
            return Ok(());
        };
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create cache dir {}", dir.display()))?;
        let path = Self::path_for(dir, key);
        fs::write(&path, serde_json::to_vec(value)?)
            .with_context(|| format!("Failed to write cache entry {}", path.display()))?;
        Ok(())
    }

    /// Drop a single entry.
    pub fn invalidate(&self, key: &str) -> Result<()> {
        if let Some(dir) = self.dir.as_deref() {
            let path = Self::path_for(dir, key);
            if path.exists() {
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }

    /// Drop every cached entry.
    pub fn clear(&self) -> Result<()> {
        let Some(dir) = self.dir.as_deref() else {
            return Ok(());
        };
        if !dir.exists() {
            return Ok(());
        }
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == "json") {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }
}
