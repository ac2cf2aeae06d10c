use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_image_base_url")]
    pub image_base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Freshness windows per query family, plus how long an unused entry is kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_search_stale_secs")]
    pub search_stale_secs: u64,
    #[serde(default = "default_list_stale_secs")]
    pub list_stale_secs: u64,
    #[serde(default = "default_detail_stale_secs")]
    pub detail_stale_secs: u64,
    #[serde(default = "default_genre_stale_secs")]
    pub genre_stale_secs: u64,
    #[serde(default = "default_gc_secs")]
    pub gc_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `None` picks JSON when stdout is not a terminal.
    #[serde(default)]
    pub json: Option<bool>,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_base_url() -> String {
    DEFAULT_TMDB_BASE_URL.to_string()
}

fn default_image_base_url() -> String {
    DEFAULT_IMAGE_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_search_stale_secs() -> u64 {
    2 * 60
}

fn default_list_stale_secs() -> u64 {
    5 * 60
}

fn default_detail_stale_secs() -> u64 {
    10 * 60
}

fn default_genre_stale_secs() -> u64 {
    60 * 60 // genres rarely change
}

fn default_gc_secs() -> u64 {
    10 * 60
}

fn default_retries() -> u32 {
    2
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    30_000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            image_base_url: default_image_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl CatalogConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            search_stale_secs: default_search_stale_secs(),
            list_stale_secs: default_list_stale_secs(),
            detail_stale_secs: default_detail_stale_secs(),
            genre_stale_secs: default_genre_stale_secs(),
            gc_secs: default_gc_secs(),
        }
    }
}

impl CacheConfig {
    pub fn search_stale(&self) -> Duration {
        Duration::from_secs(self.search_stale_secs)
    }

    pub fn list_stale(&self) -> Duration {
        Duration::from_secs(self.list_stale_secs)
    }

    pub fn detail_stale(&self) -> Duration {
        Duration::from_secs(self.detail_stale_secs)
    }

    pub fn genre_stale(&self) -> Duration {
        Duration::from_secs(self.genre_stale_secs)
    }

    pub fn gc(&self) -> Duration {
        Duration::from_secs(self.gc_secs)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retries: default_retries(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: None,
            file: None,
        }
    }
}

impl Config {
    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// A missing file is not an error: every setting has a default.
    pub fn load_or_default(path: &PathBuf) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from_file(path)
    }

    pub fn save_to_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, url) in [
            ("catalog.base_url", &self.catalog.base_url),
            ("catalog.image_base_url", &self.catalog.image_base_url),
        ] {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(anyhow::anyhow!("{} must be an http(s) URL, got '{}'", name, url));
            }
            if url.ends_with('/') {
                return Err(anyhow::anyhow!("{} must not end with '/'", name));
            }
        }

        if self.catalog.timeout_secs == 0 {
            return Err(anyhow::anyhow!("catalog.timeout_secs must be greater than zero"));
        }

        if self.retry.retries > 10 {
            return Err(anyhow::anyhow!("retry.retries must be at most 10"));
        }

        if self.retry.base_delay_ms > self.retry.max_delay_ms {
            return Err(anyhow::anyhow!("retry.base_delay_ms must not exceed retry.max_delay_ms"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let mut config = Config::default();
        config.catalog.timeout_secs = 5;
        config.retry.retries = 0;
        config.logging.json = Some(true);

        let path = file.path().to_path_buf();
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.catalog.timeout_secs, 5);
        assert_eq!(loaded.catalog.base_url, DEFAULT_TMDB_BASE_URL);
        assert_eq!(loaded.retry.retries, 0);
        assert_eq!(loaded.logging.json, Some(true));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "[cache]\nsearch_stale_secs = 30\n").unwrap();

        let loaded = Config::load_from_file(&file.path().to_path_buf()).unwrap();
        assert_eq!(loaded.cache.search_stale(), Duration::from_secs(30));
        assert_eq!(loaded.cache.list_stale(), Duration::from_secs(300));
        assert_eq!(loaded.cache.detail_stale(), Duration::from_secs(600));
        assert_eq!(loaded.cache.genre_stale(), Duration::from_secs(3600));
        assert_eq!(loaded.retry.retries, 2);
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let config = Config::load_or_default(&path).unwrap();
        assert_eq!(config.catalog.image_base_url, DEFAULT_IMAGE_BASE_URL);
    }

    #[test]
    fn test_config_validate() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.catalog.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        config.catalog.base_url = format!("{}/", DEFAULT_TMDB_BASE_URL);
        assert!(config.validate().is_err());

        config.catalog.base_url = DEFAULT_TMDB_BASE_URL.to_string();
        config.retry.base_delay_ms = 60_000;
        assert!(config.validate().is_err());
    }
}
