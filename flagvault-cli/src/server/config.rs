use std::env;
use std::io;
use std::time::Duration;

use serde::Deserialize;

/// Top-level fv.toml configuration
#[derive(Debug, Deserialize, Default, PartialEq)]
pub struct FvConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_hostname")]
    pub hostname: String,
    /// Deadline applied to every request's store and cache calls.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct StorageConfig {
    #[serde(default = "default_storage")]
    pub backend: StorageBackend,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Sled,
    Memory,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct CacheConfig {
    #[serde(default = "default_cache")]
    pub backend: CacheBackend,
    #[serde(default = "default_cache_capacity")]
    pub max_capacity: u64,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    Moka,
    /// Every read misses and every write fails, as if the cache were down.
    Disabled,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

/// Where the client subcommands send their requests.
#[derive(Debug, Deserialize, Default, PartialEq)]
pub struct RemoteConfig {
    pub url: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value for {key}: {value:?}")]
    InvalidEnv { key: &'static str, value: String },
}

// ── Default value functions ──────────────────────────

fn default_port() -> u16 {
    8080
}

fn default_hostname() -> String {
    "0.0.0.0".to_string()
}

fn default_request_timeout_ms() -> u64 {
    5000
}

fn default_storage() -> StorageBackend {
    StorageBackend::Sled
}

fn default_data_dir() -> String {
    "./data".to_string()
}

fn default_cache() -> CacheBackend {
    CacheBackend::Moka
}

fn default_cache_capacity() -> u64 {
    10_000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            hostname: default_hostname(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage(),
            data_dir: default_data_dir(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: default_cache(),
            max_capacity: default_cache_capacity(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl FvConfig {
    /// Load configuration from a TOML file. A missing file yields the
    /// defaults; an unreadable or malformed one is an error.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_string(),
                source,
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read {
                path: path.to_string(),
                source,
            }),
        }
    }

    /// Apply environment variable overrides to the configuration.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let get = |key: &'static str| lookup(key).filter(|v| !v.trim().is_empty()).map(|v| (key, v));

        if let Some((_, val)) = get("FV_HOSTNAME") {
            self.server.hostname = val;
        }
        if let Some((key, val)) = get("FV_PORT") {
            self.server.port = parse_env(key, &val)?;
        }
        if let Some((key, val)) = get("FV_REQUEST_TIMEOUT_MS") {
            self.server.request_timeout_ms = parse_env(key, &val)?;
        }

        // FV_STORAGE
        if let Some((key, val)) = get("FV_STORAGE") {
            self.storage.backend = match val.to_lowercase().as_str() {
                "sled" => StorageBackend::Sled,
                "memory" => StorageBackend::Memory,
                _ => return Err(ConfigError::InvalidEnv { key, value: val }),
            };
        }
        if let Some((_, val)) = get("FV_DATA_DIR") {
            self.storage.data_dir = val;
        }

        // FV_CACHE
        if let Some((key, val)) = get("FV_CACHE") {
            self.cache.backend = match val.to_lowercase().as_str() {
                "moka" => CacheBackend::Moka,
                "disabled" => CacheBackend::Disabled,
                _ => return Err(ConfigError::InvalidEnv { key, value: val }),
            };
        }
        if let Some((key, val)) = get("FV_CACHE_CAPACITY") {
            self.cache.max_capacity = parse_env(key, &val)?;
        }

        if let Some((_, val)) = get("FV_LOG_LEVEL") {
            self.log.level = val;
        }
        if let Some((key, val)) = get("FV_LOG_JSON") {
            self.log.json = parse_env(key, &val)?;
        }

        if let Some((_, val)) = get("FV_REMOTE") {
            self.remote.url = Some(val);
        }

        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.hostname, self.server.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.server.request_timeout_ms)
    }
}

fn parse_env<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        key,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn with_env(pairs: &[(&str, &str)]) -> Result<FvConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut config = FvConfig::default();
        config.apply_overrides(|key| vars.get(key).cloned())?;
        Ok(config)
    }

    #[test]
    fn defaults() {
        let config = FvConfig::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.storage.backend, StorageBackend::Sled);
        assert_eq!(config.storage.data_dir, "./data");
        assert_eq!(config.cache.backend, CacheBackend::Moka);
        assert_eq!(config.cache.max_capacity, 10_000);
        assert_eq!(config.log.level, "info");
        assert!(!config.log.json);
        assert_eq!(config.remote.url, None);
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config: FvConfig = toml::from_str(
            r#"
[server]
port = 9090

[storage]
backend = "memory"

[cache]
backend = "disabled"
"#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.hostname, "0.0.0.0");
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.storage.data_dir, "./data");
        assert_eq!(config.cache.backend, CacheBackend::Disabled);
        assert_eq!(config.cache.max_capacity, 10_000);
    }

    #[test]
    fn missing_file_is_default() {
        let config = FvConfig::load("/definitely/not/here/fv.toml").unwrap();
        assert_eq!(config, FvConfig::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fv.toml");
        std::fs::write(&path, "[server\nport = ").unwrap();
        let err = FvConfig::load(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn env_overrides_apply() {
        let config = with_env(&[
            ("FV_HOSTNAME", "127.0.0.1"),
            ("FV_PORT", "3000"),
            ("FV_REQUEST_TIMEOUT_MS", "250"),
            ("FV_STORAGE", "Memory"),
            ("FV_DATA_DIR", "/var/lib/fv"),
            ("FV_CACHE", "disabled"),
            ("FV_CACHE_CAPACITY", "42"),
            ("FV_LOG_LEVEL", "debug"),
            ("FV_LOG_JSON", "true"),
            ("FV_REMOTE", "http://flags:8080"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
        assert_eq!(config.request_timeout(), Duration::from_millis(250));
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.storage.data_dir, "/var/lib/fv");
        assert_eq!(config.cache.backend, CacheBackend::Disabled);
        assert_eq!(config.cache.max_capacity, 42);
        assert_eq!(config.log.level, "debug");
        assert!(config.log.json);
        assert_eq!(config.remote.url.as_deref(), Some("http://flags:8080"));
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let config = with_env(&[("FV_PORT", ""), ("FV_LOG_LEVEL", "  ")]).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn invalid_env_values_fail() {
        for (key, value) in [
            ("FV_PORT", "eighty"),
            ("FV_STORAGE", "postgres"),
            ("FV_CACHE", "redis"),
            ("FV_CACHE_CAPACITY", "-1"),
        ] {
            match with_env(&[(key, value)]) {
                Err(ConfigError::InvalidEnv { key: k, value: v }) => {
                    assert_eq!(k, key);
                    assert_eq!(v, value);
                }
                other => panic!("{key}={value}: expected InvalidEnv, got {other:?}"),
            }
        }
    }
}
