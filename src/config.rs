use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::constants;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub availability: AvailabilityConfig,

    pub tmdb: TmdbConfig,

    pub mood: MoodConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Emit logs as JSON lines instead of the human-readable format.
    pub json_logs: bool,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/moodreel.db".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AvailabilityConfig {
    /// Search endpoint of the streaming-availability API.
    pub search_url: String,

    /// Show endpoint; the show id is appended as a path segment.
    pub show_url: String,

    pub api_key: String,

    pub api_host: String,

    /// Two-letter country code offers are read for.
    pub country: String,

    pub output_language: String,

    pub cache_ttl_days: i64,

    /// Request timeout in seconds (default: 15)
    pub request_timeout_seconds: u64,
}

impl Default for AvailabilityConfig {
    fn default() -> Self {
        Self {
            search_url: "https://streaming-availability.p.rapidapi.com/shows/search/title"
                .to_string(),
            show_url: "https://streaming-availability.p.rapidapi.com/shows".to_string(),
            api_key: String::new(),
            api_host: "streaming-availability.p.rapidapi.com".to_string(),
            country: "us".to_string(),
            output_language: "en".to_string(),
            cache_ttl_days: constants::cache::AVAILABILITY_TTL_DAYS,
            request_timeout_seconds: 15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TmdbConfig {
    /// Discovery is disabled while this is unset.
    pub api_key: Option<String>,

    pub base_url: String,

    pub image_base: String,

    pub language: String,

    /// Fetch trailer links for discovered movies.
    pub enrich_trailers: bool,

    pub trailer_concurrency: usize,

    pub max_trailer_enrichment: usize,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.themoviedb.org/3".to_string(),
            image_base: "https://image.tmdb.org/t/p/w500".to_string(),
            language: "en-US".to_string(),
            enrich_trailers: true,
            trailer_concurrency: constants::discovery::TRAILER_CONCURRENCY,
            max_trailer_enrichment: constants::discovery::MAX_TRAILER_ENRICHMENT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MoodConfig {
    pub default_limit: u64,

    pub max_limit: u64,
}

impl Default for MoodConfig {
    fn default() -> Self {
        Self {
            default_limit: constants::limits::DEFAULT_MOOD_LIMIT,
            max_limit: constants::limits::MAX_MOOD_LIMIT,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        // A missing .env file is the common case.
        let _ = dotenvy::dotenv();

        let paths = Self::config_paths();

        let mut config = None;
        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                config = Some(Self::load_from_path(path)?);
                break;
            }
        }

        let mut config = config.unwrap_or_else(|| {
            info!("No config file found, using defaults");
            Self::default()
        });
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Environment variables win over the config file.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("DATABASE_URL") {
            self.general.database_path = url;
        }
        if let Some(key) = get("RAPIDAPI_KEY") {
            self.availability.api_key = key;
        }
        if let Some(url) = get("STREAM_AVAIL_BASE") {
            self.availability.search_url = url;
        }
        if let Some(url) = get("STREAM_AVAIL_GET_SHOW") {
            self.availability.show_url = url;
        }
        if let Some(country) = get("STREAM_AVAIL_COUNTRY") {
            self.availability.country = country.to_lowercase();
        }
        if let Some(lang) = get("STREAM_AVAIL_OUTPUT_LANG") {
            self.availability.output_language = lang;
        }
        if let Some(days) = get("AVAILABILITY_TTL_DAYS") {
            match days.trim().parse() {
                Ok(days) => self.availability.cache_ttl_days = days,
                Err(_) => warn!("Ignoring invalid AVAILABILITY_TTL_DAYS: {}", days),
            }
        }
        if let Some(key) = get("TMDB_API_KEY") {
            self.tmdb.api_key = Some(key);
        }
        if let Some(base) = get("TMDB_IMAGE_BASE") {
            self.tmdb.image_base = base;
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("moodreel").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".moodreel").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.availability.search_url.is_empty() || self.availability.show_url.is_empty() {
            anyhow::bail!("Streaming availability URLs cannot be empty");
        }

        if self.availability.country.len() != 2 {
            anyhow::bail!(
                "Availability country must be a two-letter code, got '{}'",
                self.availability.country
            );
        }

        if self.availability.request_timeout_seconds == 0 {
            anyhow::bail!("Availability request timeout must be > 0");
        }

        if self.availability.cache_ttl_days < 0 {
            anyhow::bail!("Availability cache TTL cannot be negative");
        }

        if self.mood.max_limit == 0
            || self.mood.default_limit == 0
            || self.mood.default_limit > self.mood.max_limit
        {
            anyhow::bail!("Mood limits must satisfy 0 < default_limit <= max_limit");
        }

        if self.tmdb.trailer_concurrency == 0 {
            anyhow::bail!("TMDB trailer concurrency must be > 0");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.availability.cache_ttl_days, 7);
        assert_eq!(config.availability.country, "us");
        assert_eq!(config.mood.default_limit, 30);
        assert_eq!(config.mood.max_limit, 100);
        assert!(config.tmdb.api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[availability]"));
        assert!(toml_str.contains("[tmdb]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [availability]
            country = "gb"
            cache_ttl_days = 3
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.availability.country, "gb");
        assert_eq!(config.availability.cache_ttl_days, 3);

        assert_eq!(config.availability.output_language, "en");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("RAPIDAPI_KEY", "secret"),
            ("STREAM_AVAIL_COUNTRY", "DE"),
            ("AVAILABILITY_TTL_DAYS", "14"),
            ("TMDB_API_KEY", "tmdb-key"),
            ("TMDB_IMAGE_BASE", ""),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env_overrides(|key| env.get(key).map(|v| (*v).to_string()));

        assert_eq!(config.availability.api_key, "secret");
        assert_eq!(config.availability.country, "de");
        assert_eq!(config.availability.cache_ttl_days, 14);
        assert_eq!(config.tmdb.api_key.as_deref(), Some("tmdb-key"));
        assert_eq!(config.tmdb.image_base, "https://image.tmdb.org/t/p/w500");
    }

    #[test]
    fn test_invalid_ttl_override_is_ignored() {
        let mut config = Config::default();
        config.apply_env_overrides(|key| (key == "AVAILABILITY_TTL_DAYS").then(|| "soon".into()));
        assert_eq!(config.availability.cache_ttl_days, 7);
    }

    #[test]
    fn test_validate_rejects_bad_limits() {
        let mut config = Config::default();
        config.mood.default_limit = 200;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.availability.country = "usa".to_string();
        assert!(config.validate().is_err());
    }
}
