use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Public base URL used when building continuation links
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Prometheus exporter listener, only used with the `metrics` feature
    #[serde(default = "default_metrics_bind")]
    pub metrics_bind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,

    #[serde(default = "default_concurrent_fetches")]
    pub concurrent_fetches: usize,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-source request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Seconds a continuation token stays readable
    #[serde(default = "default_ttl")]
    pub ttl: u64,

    /// Hard cap in seconds on a token's lifetime when `sliding` is on
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime: u64,

    #[serde(default)]
    pub sliding: bool,

    /// Drop a token as soon as it has been read once
    #[serde(default)]
    pub single_use: bool,

    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval: u64,

    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub log_to_file: bool,

    #[serde(default = "default_log_file")]
    pub log_file: String,

    #[serde(default)]
    pub json_format: bool,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .map_err(|_| ConfigError::NotFound(path.as_ref().display().to_string()))?;

        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load the file at `path` if given, else the default location if it
    /// exists, else built-in defaults. Environment overrides apply in every case.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => Some(path.to_path_buf()),
            None => Self::config_dir()
                .map(|dir| dir.join("config.toml"))
                .ok()
                .filter(|p| p.exists()),
        };

        match path {
            Some(path) => Self::load_with_env(path),
            None => {
                let mut config = Self::default();
                config.apply_env_overrides();
                config.validate()?;
                Ok(config)
            }
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = self.to_toml()?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_addr()?;

        url::Url::parse(&self.server.base_url)
            .map_err(|_| ConfigError::InvalidUrl(self.server.base_url.clone()))?;

        if self.settings.default_page_size == 0 {
            return Err(ConfigError::Invalid("Default page size must be greater than 0".to_string()));
        }

        if self.settings.concurrent_fetches == 0 {
            return Err(ConfigError::Invalid("Concurrent fetches must be greater than 0".to_string()));
        }

        if self.settings.timeout == 0 {
            return Err(ConfigError::Invalid("Timeout must be greater than 0".to_string()));
        }

        if self.cache.ttl == 0 {
            return Err(ConfigError::Invalid("Cache TTL must be greater than 0".to_string()));
        }

        if self.cache.max_lifetime < self.cache.ttl {
            return Err(ConfigError::Invalid(
                "Cache max lifetime must not be shorter than the TTL".to_string(),
            ));
        }

        if self.cache.max_entries == 0 {
            return Err(ConfigError::Invalid("Cache max entries must be greater than 0".to_string()));
        }

        if self.cache.cleanup_interval == 0 {
            return Err(ConfigError::Invalid("Cleanup interval must be greater than 0".to_string()));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(bind) = std::env::var("RSS_CLIENT_BIND") {
            self.server.bind = bind;
        }

        if let Ok(base_url) = std::env::var("RSS_CLIENT_BASE_URL") {
            self.server.base_url = base_url;
        }

        if let Ok(page_size) = std::env::var("RSS_CLIENT_PAGE_SIZE") {
            if let Ok(val) = page_size.parse() {
                self.settings.default_page_size = val;
            }
        }

        if let Ok(level) = std::env::var("RSS_CLIENT_LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.server
            .bind
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("Invalid bind address: {}", self.server.bind)))
    }

    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("rss-client"))
            .ok_or_else(|| ConfigError::Invalid("Could not determine config directory".to_string()))
    }
}

impl CacheSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl)
    }

    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            base_url: default_base_url(),
            metrics_bind: default_metrics_bind(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            concurrent_fetches: default_concurrent_fetches(),
            user_agent: default_user_agent(),
            timeout: default_timeout(),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl: default_ttl(),
            max_lifetime: default_max_lifetime(),
            sliding: false,
            single_use: false,
            cleanup_interval: default_cleanup_interval(),
            max_entries: default_max_entries(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_to_file: false,
            log_file: default_log_file(),
            json_format: false,
        }
    }
}

fn default_bind() -> String { "0.0.0.0:9000".to_string() }
fn default_base_url() -> String { "http://rss-client:9000".to_string() }
fn default_metrics_bind() -> String { "0.0.0.0:9100".to_string() }

fn default_page_size() -> usize { 20 }
fn default_concurrent_fetches() -> usize { 8 }
fn default_user_agent() -> String {
    format!("rss-client/{}", env!("CARGO_PKG_VERSION"))
}
fn default_timeout() -> u64 { 30 }

fn default_ttl() -> u64 { 30 * 60 }
fn default_max_lifetime() -> u64 { 45 * 60 }
fn default_cleanup_interval() -> u64 { 45 * 60 }
fn default_max_entries() -> usize { 10_000 }

fn default_log_level() -> String { "info".to_string() }
fn default_log_file() -> String { "logs/rss-client.log".to_string() }
