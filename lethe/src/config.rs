use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for a single named cache instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceConfig {
    /// Backend driver: "file", "redis", "valkey" or "memcached"
    pub driver: String,

    /// Directory in which cache files are stored (file driver)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,

    /// Server host (redis / valkey drivers)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// Server port (redis / valkey drivers)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Unix socket path, takes precedence over host/port (redis / valkey)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub socket: Option<String>,

    /// Server URLs, e.g. "memcache://127.0.0.1:11211" (memcached driver)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servers: Option<Vec<String>>,
}

impl InstanceConfig {
    /// Config for a file-backed instance storing under `store_path`
    pub fn file<P: Into<PathBuf>>(store_path: P) -> Self {
        Self {
            driver: "file".to_string(),
            store_path: Some(store_path.into()),
            host: None,
            port: None,
            socket: None,
            servers: None,
        }
    }

    /// Config for a Redis-backed instance
    pub fn redis(host: &str, port: u16) -> Self {
        Self {
            driver: "redis".to_string(),
            store_path: None,
            host: Some(host.to_string()),
            port: Some(port),
            socket: None,
            servers: None,
        }
    }

    /// Config for a Valkey-backed instance
    pub fn valkey(host: &str, port: u16) -> Self {
        Self {
            driver: "valkey".to_string(),
            store_path: None,
            host: Some(host.to_string()),
            port: Some(port),
            socket: None,
            servers: None,
        }
    }

    /// Config for a Memcached-backed instance
    pub fn memcached(servers: Vec<String>) -> Self {
        Self {
            driver: "memcached".to_string(),
            store_path: None,
            host: None,
            port: None,
            socket: None,
            servers: Some(servers),
        }
    }
}

/// Full cache configuration: a map of instance name to instance config
///
/// ```yaml
/// default:
///   driver: file
///   store_path: /var/cache/app
/// sessions:
///   driver: redis
///   host: 127.0.0.1
///   port: 6379
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheConfig {
    instances: HashMap<String, InstanceConfig>,
}

impl CacheConfig {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: CacheConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Add an instance configuration, builder-style
    pub fn with_instance(mut self, name: &str, config: InstanceConfig) -> Self {
        self.instances.insert(name.to_string(), config);
        self
    }

    /// Add or replace an instance configuration
    pub fn insert(&mut self, name: &str, config: InstanceConfig) {
        self.instances.insert(name.to_string(), config);
    }

    /// Look up the configuration for a named instance
    pub fn get(&self, name: &str) -> Option<&InstanceConfig> {
        self.instances.get(name)
    }

    /// Names of all configured instances
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.instances.keys().map(String::as_str)
    }
}
