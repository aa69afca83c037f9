//! Cache instances
//!
//! An [`Instance`] is a named logical cache bound to one backend driver.
//! It owns the two pieces of behavior every backend shares: key
//! namespacing, so instances can coexist on one physical store without
//! collisions, and value encoding, so structured values round-trip
//! through backends that only store text.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::config::InstanceConfig;
use crate::driver::{self, Driver};
use crate::error::Result;
use crate::value;

/// Derive the deterministic namespace checksum for an instance name.
fn namespace_token(name: &str) -> String {
    format!("{:08x}", crc32fast::hash(name.as_bytes()))
}

/// A named logical cache namespace bound to one backend driver.
///
/// Instances are handed out by [`Cache::instance`](crate::Cache::instance)
/// and shared as `Arc<Instance>`; all operations take `&self` and may be
/// called from multiple threads.
pub struct Instance {
    name: String,
    token: String,
    driver: Box<dyn Driver>,
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance")
            .field("name", &self.name)
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

impl Instance {
    pub(crate) fn new(name: &str, config: &InstanceConfig) -> Result<Self> {
        let token = namespace_token(name);
        let driver = driver::connect(config)?;

        info!(
            "cache instance '{}' ready (driver={}, namespace={})",
            name, config.driver, token
        );

        Ok(Self {
            name: name.to_string(),
            token,
            driver,
        })
    }

    /// The instance name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The checksum prefix isolating this instance's keys on a shared
    /// physical store.
    pub fn namespace_token(&self) -> &str {
        &self.token
    }

    /// Namespace a logical key.
    fn key(&self, key: &str) -> String {
        format!("{}.{}", self.token, key)
    }

    /// Remove the namespace prefix from a key.
    fn unkey<'a>(&self, key: &'a str) -> &'a str {
        key.strip_prefix(&self.token)
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(key)
    }

    /// The backend pattern for this instance's keys, optionally scoped to
    /// a sub-namespace.
    fn pattern(&self, namespace: Option<&str>) -> String {
        match namespace {
            Some(ns) => self.key(&format!("{ns}.*")),
            None => self.key("*"),
        }
    }

    /// Get a value from the cache.
    ///
    /// Stored text that parses as JSON comes back in structured form;
    /// anything else comes back as the raw string. A missing key is
    /// `Ok(None)` - indistinguishable from one that was cleared.
    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        let key = self.key(key);
        debug!("GET {}", key);

        let Some(raw) = self.driver.get(&key)? else {
            return Ok(None);
        };

        Ok(Some(value::decode(&raw).unwrap_or(Value::String(raw))))
    }

    /// Get a value without attempting to decode it.
    pub fn get_raw(&self, key: &str) -> Result<Option<String>> {
        let key = self.key(key);
        debug!("GET raw {}", key);

        self.driver.get(&key)
    }

    /// Get a value deserialized into a caller-chosen type.
    ///
    /// Unlike [`get`](Self::get), a value that does not deserialize as `T`
    /// is an error rather than a fallback.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get_raw(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Store a value in the cache, with an optional TTL in seconds.
    ///
    /// A value that serializes to null clears the key instead: the key is
    /// deleted, not set to a null marker.
    pub fn set<V: Serialize>(&self, key: &str, value: V, expires: Option<u64>) -> Result<()> {
        let key = self.key(key);
        let value = serde_json::to_value(value)?;
        debug!("SET {} (ttl={:?})", key, expires);

        match value::encode(&value) {
            None => self.driver.clear(&key),
            Some(encoded) => self.driver.set(&key, Some(&encoded), expires),
        }
    }

    /// Get multiple values in one batched backend read.
    ///
    /// Every requested key appears in the result, keyed by its logical
    /// name, with `None` for misses.
    pub fn mget(&self, keys: &[&str]) -> Result<HashMap<String, Option<Value>>> {
        let namespaced: Vec<String> = keys.iter().map(|key| self.key(key)).collect();
        debug!("MGET count={}", namespaced.len());

        let values = self.driver.mget(&namespaced)?;

        Ok(keys
            .iter()
            .zip(values)
            .map(|(key, raw)| {
                let decoded = raw.map(|raw| value::decode(&raw).unwrap_or(Value::String(raw)));
                ((*key).to_string(), decoded)
            })
            .collect())
    }

    /// Get multiple values without decoding them.
    pub fn mget_raw(&self, keys: &[&str]) -> Result<HashMap<String, Option<String>>> {
        let namespaced: Vec<String> = keys.iter().map(|key| self.key(key)).collect();
        debug!("MGET raw count={}", namespaced.len());

        let values = self.driver.mget(&namespaced)?;

        Ok(keys
            .iter()
            .zip(values)
            .map(|(key, raw)| ((*key).to_string(), raw))
            .collect())
    }

    /// Store multiple values in one batched backend write.
    ///
    /// Null entries are not special-cased here the way single [`set`]
    /// calls are; they pass through to the driver, which either applies
    /// its own per-entry null-means-clear policy or stores a null record.
    ///
    /// [`set`]: Self::set
    pub fn mset(&self, entries: &[(&str, Value)], expires: Option<u64>) -> Result<()> {
        debug!("MSET count={} (ttl={:?})", entries.len(), expires);

        let encoded: Vec<(String, Option<String>)> = entries
            .iter()
            .map(|(key, value)| (self.key(key), value::encode(value)))
            .collect();

        self.driver.mset(&encoded, expires)
    }

    /// Clear a value from the cache.
    pub fn clear(&self, key: &str) -> Result<()> {
        let key = self.key(key);
        debug!("CLEAR {}", key);

        self.driver.clear(&key)
    }

    /// Clear multiple values from the cache.
    pub fn mclear(&self, keys: &[&str]) -> Result<()> {
        let namespaced: Vec<String> = keys.iter().map(|key| self.key(key)).collect();
        debug!("MCLEAR count={}", namespaced.len());

        self.driver.mclear(&namespaced)
    }

    /// List this instance's logical keys, optionally scoped to a
    /// sub-namespace.
    ///
    /// The namespace token is stripped from every result. Backends that
    /// cannot enumerate keys yield an empty list.
    pub fn keys(&self, namespace: Option<&str>) -> Result<Vec<String>> {
        let pattern = self.pattern(namespace);
        debug!("KEYS {}", pattern);

        Ok(self
            .driver
            .keys(&pattern)?
            .iter()
            .map(|key| self.unkey(key).to_string())
            .collect())
    }

    /// Clear everything [`keys`](Self::keys) would list under the same
    /// scope.
    ///
    /// On backends without enumeration this deviates: the memcached
    /// driver flushes the whole store.
    pub fn flush(&self, namespace: Option<&str>) -> Result<()> {
        let pattern = self.pattern(namespace);
        debug!("FLUSH {}", pattern);

        self.driver.flush(&pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn file_instance(name: &str, dir: &std::path::Path) -> Instance {
        Instance::new(name, &InstanceConfig::file(dir)).unwrap()
    }

    #[test]
    fn test_namespace_token_format() {
        let token = namespace_token("default");
        assert_eq!(token.len(), 8);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));

        // Deterministic, and distinct per name
        assert_eq!(token, namespace_token("default"));
        assert_ne!(token, namespace_token("sessions"));
    }

    #[test]
    fn test_key_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let instance = file_instance("default", dir.path());

        let namespaced = instance.key("users.1.profile");
        assert_eq!(
            namespaced,
            format!("{}.users.1.profile", instance.namespace_token())
        );
        assert_eq!(instance.unkey(&namespaced), "users.1.profile");
    }

    #[test]
    fn test_scalar_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let instance = file_instance("default", dir.path());

        instance.set("greeting", "hello", None).unwrap();
        assert_eq!(instance.get("greeting").unwrap(), Some(json!("hello")));
        assert_eq!(
            instance.get_raw("greeting").unwrap(),
            Some("hello".to_string())
        );

        instance.set("count", 42, None).unwrap();
        assert_eq!(instance.get("count").unwrap(), Some(json!(42)));
        assert_eq!(instance.get_raw("count").unwrap(), Some("42".to_string()));
    }

    #[test]
    fn test_mapping_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let instance = file_instance("default", dir.path());

        instance.set("user", json!({"a": "b"}), None).unwrap();

        // Decoded as structured data
        assert_eq!(instance.get("user").unwrap(), Some(json!({"a": "b"})));
        // Raw form is the literal encoded string
        assert_eq!(
            instance.get_raw("user").unwrap(),
            Some(r#"{"a":"b"}"#.to_string())
        );

        let raw = instance.mget_raw(&["user", "missing"]).unwrap();
        assert_eq!(raw["user"], Some(r#"{"a":"b"}"#.to_string()));
        assert_eq!(raw["missing"], None);
    }

    #[test]
    fn test_sequence_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let instance = file_instance("default", dir.path());

        instance.set("tags", json!(["a", "b", "c"]), None).unwrap();
        assert_eq!(instance.get("tags").unwrap(), Some(json!(["a", "b", "c"])));
    }

    #[test]
    fn test_get_as_typed() {
        #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
        struct Profile {
            name: String,
            age: u32,
        }

        let dir = tempfile::tempdir().unwrap();
        let instance = file_instance("default", dir.path());

        let profile = Profile {
            name: "alice".to_string(),
            age: 30,
        };
        instance.set("profile", &profile, None).unwrap();

        assert_eq!(instance.get_as::<Profile>("profile").unwrap(), Some(profile));
        assert_eq!(instance.get_as::<Profile>("missing").unwrap(), None);
    }

    #[test]
    fn test_clear_via_null() {
        let dir = tempfile::tempdir().unwrap();
        let instance = file_instance("default", dir.path());

        instance.set("key", "value", None).unwrap();
        instance.set("key", Value::Null, None).unwrap();
        assert_eq!(instance.get("key").unwrap(), None);

        // Identical outcome to an explicit clear
        instance.set("other", "value", None).unwrap();
        instance.clear("other").unwrap();
        assert_eq!(instance.get("other").unwrap(), None);
    }

    #[test]
    fn test_namespace_isolation() {
        let dir = tempfile::tempdir().unwrap();
        let a = file_instance("alpha", dir.path());
        let b = file_instance("beta", dir.path());

        a.set("shared", "from-a", None).unwrap();
        assert_eq!(b.get("shared").unwrap(), None);

        b.set("shared", "from-b", None).unwrap();
        assert_eq!(a.get("shared").unwrap(), Some(json!("from-a")));
        assert_eq!(b.get("shared").unwrap(), Some(json!("from-b")));

        // Flushing one namespace leaves the other intact
        a.flush(None).unwrap();
        assert_eq!(a.get("shared").unwrap(), None);
        assert_eq!(b.get("shared").unwrap(), Some(json!("from-b")));
    }

    #[test]
    fn test_mset_mget() {
        let dir = tempfile::tempdir().unwrap();
        let instance = file_instance("default", dir.path());

        instance
            .mset(&[("x", json!("1")), ("y", json!("2"))], None)
            .unwrap();

        let values = instance.mget(&["x", "y", "missing"]).unwrap();
        assert_eq!(values.len(), 3);
        assert_eq!(values["x"], Some(json!("1")));
        assert_eq!(values["y"], Some(json!("2")));
        assert_eq!(values["missing"], None);
    }

    #[test]
    fn test_mset_null_entry_reads_as_miss() {
        let dir = tempfile::tempdir().unwrap();
        let instance = file_instance("default", dir.path());

        instance
            .mset(&[("a", json!("1")), ("b", Value::Null)], None)
            .unwrap();

        let values = instance.mget(&["a", "b"]).unwrap();
        assert_eq!(values["a"], Some(json!("1")));
        assert_eq!(values["b"], None);
    }

    #[test]
    fn test_mclear() {
        let dir = tempfile::tempdir().unwrap();
        let instance = file_instance("default", dir.path());

        instance
            .mset(&[("a", json!("1")), ("b", json!("2")), ("c", json!("3"))], None)
            .unwrap();
        instance.mclear(&["a", "b"]).unwrap();

        assert_eq!(instance.get("a").unwrap(), None);
        assert_eq!(instance.get("b").unwrap(), None);
        assert_eq!(instance.get("c").unwrap(), Some(json!("3")));
    }

    #[test]
    fn test_keys_strips_namespace() {
        let dir = tempfile::tempdir().unwrap();
        let instance = file_instance("default", dir.path());

        instance.set("users.1", "alice", None).unwrap();
        instance.set("users.2", "bob", None).unwrap();
        instance.set("posts.1", "hi", None).unwrap();

        let mut keys = instance.keys(None).unwrap();
        keys.sort();
        assert_eq!(keys, vec!["posts.1", "users.1", "users.2"]);

        let mut users = instance.keys(Some("users")).unwrap();
        users.sort();
        assert_eq!(users, vec!["users.1", "users.2"]);
    }

    #[test]
    fn test_flush_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let instance = file_instance("default", dir.path());

        instance.set("a", "1", None).unwrap();
        instance.set("b", "2", None).unwrap();

        instance.flush(None).unwrap();
        assert_eq!(instance.keys(None).unwrap(), Vec::<String>::new());

        // A second flush is a no-op, not an error
        instance.flush(None).unwrap();
    }

    #[test]
    fn test_flush_scoped() {
        let dir = tempfile::tempdir().unwrap();
        let instance = file_instance("default", dir.path());

        instance.set("users.1", "alice", None).unwrap();
        instance.set("posts.1", "hi", None).unwrap();

        instance.flush(Some("users")).unwrap();

        assert_eq!(instance.get("users.1").unwrap(), None);
        assert_eq!(instance.get("posts.1").unwrap(), Some(json!("hi")));
    }

    #[test]
    fn test_ttl_expiry() {
        let dir = tempfile::tempdir().unwrap();
        let instance = file_instance("default", dir.path());

        instance.set("ephemeral", "v", Some(1)).unwrap();
        assert_eq!(instance.get("ephemeral").unwrap(), Some(json!("v")));

        std::thread::sleep(std::time::Duration::from_secs(2));
        assert_eq!(instance.get("ephemeral").unwrap(), None);
    }
}
