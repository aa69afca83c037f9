//! Memcached driver
//!
//! Pass-through to a memcached cluster. TTL is native (per-item
//! expiration), but key enumeration is not available: the introspection
//! commands it would need were removed from modern memcached, so `keys`
//! reports nothing and `flush` can only drop the whole store.

use tracing::debug;

use super::Driver;
use crate::config::InstanceConfig;
use crate::error::Result;

pub(crate) struct MemcachedDriver {
    client: memcache::Client,
}

impl MemcachedDriver {
    pub(crate) fn connect(config: &InstanceConfig) -> Result<Self> {
        let servers = config
            .servers
            .clone()
            .unwrap_or_else(|| vec!["memcache://127.0.0.1:11211".to_string()]);

        debug!("connecting to memcached at {:?}", servers);
        let client = memcache::Client::connect(servers)?;

        Ok(Self { client })
    }
}

impl Driver for MemcachedDriver {
    fn get(&self, key: &str) -> Result<Option<String>> {
        // The client reports NOT_FOUND as None already, which is exactly
        // the miss representation the instance layer expects
        Ok(self.client.get::<String>(key)?)
    }

    fn set(&self, key: &str, value: Option<&str>, expires: Option<u64>) -> Result<()> {
        let Some(value) = value else {
            return self.clear(key);
        };

        // Expiration 0 means the item never expires
        self.client.set(key, value, expires.unwrap_or(0) as u32)?;
        Ok(())
    }

    fn mget(&self, keys: &[String]) -> Result<Vec<Option<String>>> {
        let refs: Vec<&str> = keys.iter().map(String::as_str).collect();
        let mut found = self.client.gets::<String>(&refs)?;

        Ok(keys.iter().map(|key| found.remove(key)).collect())
    }

    fn mset(&self, entries: &[(String, Option<String>)], expires: Option<u64>) -> Result<()> {
        for (key, value) in entries {
            self.set(key, value.as_deref(), expires)?;
        }

        Ok(())
    }

    fn clear(&self, key: &str) -> Result<()> {
        self.client.delete(key)?;
        Ok(())
    }

    fn mclear(&self, keys: &[String]) -> Result<()> {
        for key in keys {
            self.clear(key)?;
        }

        Ok(())
    }

    /// Memcached cannot list keys. The commands that once allowed it
    /// (`stats cachedump` and friends) are gone from current servers, so
    /// enumeration reports nothing rather than failing.
    fn keys(&self, _pattern: &str) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    /// With no enumeration there is no way to flush a single namespace:
    /// this drops the entire store, shared namespaces included.
    fn flush(&self, _pattern: &str) -> Result<()> {
        self.client.flush()?;
        Ok(())
    }
}
