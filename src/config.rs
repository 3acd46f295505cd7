use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::input::columns::{DEFAULT_NAME_COLUMNS, DEFAULT_VERSION_COLUMNS};

/// Root configuration structure, deserialized from `.eol-scanner/config.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Catalog endpoint, caching and request pacing.
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Name resolution thresholds and normalization rules.
    #[serde(default)]
    pub matching: MatchingConfig,
    /// CSV header synonyms.
    #[serde(default)]
    pub columns: ColumnsConfig,
}

/// How and where the lifecycle catalog is fetched.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Base URL of the endoflife.date service; `/api/...` is appended.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request socket timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Minimum pause between two network requests.
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,
    /// Extra attempts after a transient failure.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// First backoff step; doubled on every retry.
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
    /// How long cached catalog responses stay fresh.
    #[serde(default = "default_cache_ttl_hours")]
    pub cache_ttl_hours: u64,
    /// Cache location. Defaults to the user cache dir.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
}

impl CatalogConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_hours * 3600)
    }

    /// Configured cache dir, else `<user cache>/eol-scanner`, else `.cache/eol-scanner`.
    pub fn resolved_cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from(".cache"))
                .join("eol-scanner")
        })
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        CatalogConfig {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            request_delay_ms: default_request_delay_ms(),
            max_retries: default_max_retries(),
            backoff_ms: default_backoff_ms(),
            cache_ttl_hours: default_cache_ttl_hours(),
            cache_dir: None,
        }
    }
}

fn default_base_url() -> String {
    "https://endoflife.date".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_request_delay_ms() -> u64 {
    250
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_ms() -> u64 {
    500
}

fn default_cache_ttl_hours() -> u64 {
    24
}

/// Name resolution policy.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchingConfig {
    /// Minimum similarity a fuzzy candidate must reach.
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: f64,
    /// A runner-up closer than this to the best score makes the match ambiguous.
    #[serde(default = "default_ambiguity_margin")]
    pub ambiguity_margin: f64,
    /// Normalized names shorter than this are never fuzzy matched.
    #[serde(default = "default_fuzzy_min_length")]
    pub fuzzy_min_length: usize,
    /// Leading namespace tokens dropped during normalized matching (`python-requests`).
    #[serde(default = "default_strip_prefixes")]
    pub strip_prefixes: Vec<String>,
    /// Trailing qualifier tokens dropped during normalized matching (`redis-server`).
    #[serde(default = "default_strip_suffixes")]
    pub strip_suffixes: Vec<String>,
    /// Extra aliases, keyed by catalog product id.
    #[serde(default)]
    pub aliases: BTreeMap<String, Vec<String>>,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        MatchingConfig {
            fuzzy_threshold: default_fuzzy_threshold(),
            ambiguity_margin: default_ambiguity_margin(),
            fuzzy_min_length: default_fuzzy_min_length(),
            strip_prefixes: default_strip_prefixes(),
            strip_suffixes: default_strip_suffixes(),
            aliases: BTreeMap::new(),
        }
    }
}

fn default_fuzzy_threshold() -> f64 {
    0.82
}

fn default_ambiguity_margin() -> f64 {
    0.05
}

fn default_fuzzy_min_length() -> usize {
    4
}

fn default_strip_prefixes() -> Vec<String> {
    ["python", "python3", "py", "apache"]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_strip_suffixes() -> Vec<String> {
    [
        "server", "client", "core", "runtime", "lib", "libs", "dev", "devel", "common", "bin",
        "full", "light", "jre", "jdk", "headless", "daemon", "cli",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Header synonyms per logical field, in priority order.
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnsConfig {
    #[serde(default = "default_name_columns")]
    pub name: Vec<String>,
    #[serde(default = "default_version_columns")]
    pub version: Vec<String>,
}

impl Default for ColumnsConfig {
    fn default() -> Self {
        ColumnsConfig {
            name: default_name_columns(),
            version: default_version_columns(),
        }
    }
}

fn default_name_columns() -> Vec<String> {
    DEFAULT_NAME_COLUMNS.iter().map(|s| s.to_string()).collect()
}

fn default_version_columns() -> Vec<String> {
    DEFAULT_VERSION_COLUMNS.iter().map(|s| s.to_string()).collect()
}

impl Config {
    /// Reject values that would make matching meaningless.
    pub fn validate(&self) -> Result<()> {
        let m = &self.matching;
        if !(0.0..=1.0).contains(&m.fuzzy_threshold) {
            bail!("matching.fuzzy_threshold must be within 0.0..=1.0, got {}", m.fuzzy_threshold);
        }
        if !(0.0..=1.0).contains(&m.ambiguity_margin) {
            bail!("matching.ambiguity_margin must be within 0.0..=1.0, got {}", m.ambiguity_margin);
        }
        if self.columns.name.is_empty() {
            bail!("columns.name must list at least one header");
        }
        Ok(())
    }
}

/// Load the configuration, searching in order:
///
/// 1. `config_override`: path passed via `--config`
/// 2. `<cwd>/.eol-scanner/config.toml`
/// 3. `~/.config/eol-scanner/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(base_dir: &Path, config_override: Option<&Path>) -> Result<Config> {
    let config = match find_config(base_dir, config_override) {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Invalid config {}", path.display()))?
        }
        None => Config::default(),
    };
    config.validate()?;
    Ok(config)
}

fn find_config(base_dir: &Path, config_override: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = config_override {
        return Some(path.to_path_buf());
    }

    let local = base_dir.join(".eol-scanner").join("config.toml");
    if local.exists() {
        return Some(local);
    }

    let home_config = dirs::home_dir()?
        .join(".config")
        .join("eol-scanner")
        .join("config.toml");
    home_config.exists().then_some(home_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.catalog.base_url, "https://endoflife.date");
        assert_eq!(cfg.catalog.max_retries, 3);
        assert!((cfg.matching.fuzzy_threshold - 0.82).abs() < f64::EPSILON);
        assert!((cfg.matching.ambiguity_margin - 0.05).abs() < f64::EPSILON);
        assert_eq!(cfg.columns.name[0], "name");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, "[catalog]").unwrap();
        writeln!(f, "request_delay_ms = 0").unwrap();
        writeln!(f, "[matching.aliases]").unwrap();
        writeln!(f, "nodejs = [\"nodejs-lts\"]").unwrap();

        let dir = TempDir::new().unwrap();
        let cfg = load_config(dir.path(), Some(f.path())).unwrap();
        assert_eq!(cfg.catalog.request_delay_ms, 0);
        assert_eq!(cfg.catalog.timeout_secs, 30);
        assert_eq!(cfg.matching.aliases["nodejs"], vec!["nodejs-lts".to_string()]);
        assert!(!cfg.matching.strip_suffixes.is_empty());
    }

    #[test]
    fn test_project_config_discovered() {
        let dir = TempDir::new().unwrap();
        let cfg_dir = dir.path().join(".eol-scanner");
        std::fs::create_dir_all(&cfg_dir).unwrap();
        std::fs::write(
            cfg_dir.join("config.toml"),
            "[columns]\nname = [\"software\"]\n",
        )
        .unwrap();

        let cfg = load_config(dir.path(), None).unwrap();
        assert_eq!(cfg.columns.name, vec!["software".to_string()]);
        assert_eq!(cfg.columns.version[0], "version");
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, "[matching]\nfuzzy_threshold = 1.5").unwrap();
        let dir = TempDir::new().unwrap();
        assert!(load_config(dir.path(), Some(f.path())).is_err());
    }
}
