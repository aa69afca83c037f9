//! Storage backend drivers
//!
//! Each driver implements the same capability contract against one concrete
//! storage technology. The instance layer treats them interchangeably: keys
//! arriving here are already namespaced and values are already encoded.

mod file;
mod memcached;
mod redis;
mod valkey;

pub(crate) use file::FileDriver;
pub(crate) use memcached::MemcachedDriver;
pub(crate) use redis::RedisDriver;
pub(crate) use valkey::ValkeyDriver;

use crate::config::InstanceConfig;
use crate::error::{CacheError, Result};

/// Capability contract implemented by every storage backend.
///
/// Drivers normalize their client's "key absent" sentinel to `None`, so the
/// instance layer never sees a backend-native miss representation. Transport
/// failures are never retried here; they propagate to the caller as-is.
pub(crate) trait Driver: Send + Sync {
    /// Get a value from the cache.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Set a value against a key, with an optional TTL in seconds.
    ///
    /// A `None` value clears the key on backends with a per-entry
    /// null-means-clear policy; the file driver stores a null envelope.
    fn set(&self, key: &str, value: Option<&str>, expires: Option<u64>) -> Result<()>;

    /// Get multiple values, positionally aligned with `keys`.
    fn mget(&self, keys: &[String]) -> Result<Vec<Option<String>>>;

    /// Set multiple values in one batched write.
    fn mset(&self, entries: &[(String, Option<String>)], expires: Option<u64>) -> Result<()>;

    /// Clear a single key.
    fn clear(&self, key: &str) -> Result<()>;

    /// Clear multiple keys.
    fn mclear(&self, keys: &[String]) -> Result<()>;

    /// List keys matching a glob-style pattern.
    ///
    /// Backends that cannot enumerate keys return an empty list rather
    /// than failing.
    fn keys(&self, pattern: &str) -> Result<Vec<String>>;

    /// Clear every key matching a glob-style pattern.
    fn flush(&self, pattern: &str) -> Result<()>;
}

/// Construct and connect the driver named by `config.driver`.
pub(crate) fn connect(config: &InstanceConfig) -> Result<Box<dyn Driver>> {
    match config.driver.as_str() {
        "file" => Ok(Box::new(FileDriver::new(config)?)),
        "redis" => Ok(Box::new(RedisDriver::connect(config)?)),
        "valkey" => Ok(Box::new(ValkeyDriver::connect(config)?)),
        "memcached" => Ok(Box::new(MemcachedDriver::connect(config)?)),
        other => Err(CacheError::InvalidDriver(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_driver() {
        let mut config = InstanceConfig::file("/tmp/unused");
        config.driver = "carrier-pigeon".to_string();

        let err = connect(&config).err().expect("construction should fail");
        match err {
            CacheError::InvalidDriver(kind) => assert_eq!(kind, "carrier-pigeon"),
            other => panic!("expected InvalidDriver, got {other:?}"),
        }
    }
}
