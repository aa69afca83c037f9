//! Round-trip tests against live backend servers.
//!
//! These need Redis/Valkey on 127.0.0.1:6379 and memcached on
//! 127.0.0.1:11211, so they are excluded from CI by default:
//!
//! ```sh
//! cargo test --features live-tests
//! ```

#![cfg(feature = "live-tests")]

use lethe::{Cache, CacheConfig, Instance, InstanceConfig};
use serde_json::json;
use std::sync::Arc;

fn resolve(name: &str, config: InstanceConfig) -> Arc<Instance> {
    let cache = Cache::new(CacheConfig::new().with_instance(name, config));
    cache.instance(Some(name)).unwrap()
}

fn exercise(instance: &Instance) {
    instance.flush(None).unwrap();

    // Scalar and structured round trips
    instance.set("greeting", "hello", None).unwrap();
    assert_eq!(instance.get("greeting").unwrap(), Some(json!("hello")));

    instance.set("user", json!({"a": "b"}), None).unwrap();
    assert_eq!(instance.get("user").unwrap(), Some(json!({"a": "b"})));
    assert_eq!(
        instance.get_raw("user").unwrap(),
        Some(r#"{"a":"b"}"#.to_string())
    );

    // Null-means-clear
    instance.set("greeting", serde_json::Value::Null, None).unwrap();
    assert_eq!(instance.get("greeting").unwrap(), None);

    // Batched reads report misses as None
    instance
        .mset(&[("x", json!("1")), ("y", json!("2"))], None)
        .unwrap();
    let values = instance.mget(&["x", "y", "absent"]).unwrap();
    assert_eq!(values["x"], Some(json!("1")));
    assert_eq!(values["y"], Some(json!("2")));
    assert_eq!(values["absent"], None);

    instance.flush(None).unwrap();
}

#[test]
fn test_redis_round_trip() {
    let instance = resolve("live-redis", InstanceConfig::redis("127.0.0.1", 6379));
    exercise(&instance);

    // TTL is native; the write carries it as a server option
    instance.set("ephemeral", "v", Some(1)).unwrap();
    assert_eq!(instance.get("ephemeral").unwrap(), Some(json!("v")));
    std::thread::sleep(std::time::Duration::from_secs(2));
    assert_eq!(instance.get("ephemeral").unwrap(), None);

    // Enumeration is available, so keys() reports logical names
    instance.set("users.1", "alice", None).unwrap();
    assert_eq!(instance.keys(None).unwrap(), vec!["users.1"]);
    instance.flush(None).unwrap();
}

#[test]
fn test_valkey_round_trip() {
    // Valkey is protocol-compatible; this may point at the same server
    // as the redis test, under a different namespace
    let instance = resolve("live-valkey", InstanceConfig::valkey("127.0.0.1", 6379));
    exercise(&instance);

    instance.set("ephemeral", "v", Some(1)).unwrap();
    std::thread::sleep(std::time::Duration::from_secs(2));
    assert_eq!(instance.get("ephemeral").unwrap(), None);
}

#[test]
fn test_memcached_round_trip() {
    let instance = resolve(
        "live-memcached",
        InstanceConfig::memcached(vec!["memcache://127.0.0.1:11211".to_string()]),
    );

    instance.set("greeting", "hello", None).unwrap();
    assert_eq!(instance.get("greeting").unwrap(), Some(json!("hello")));

    instance.set("user", json!({"a": "b"}), None).unwrap();
    assert_eq!(instance.get("user").unwrap(), Some(json!({"a": "b"})));

    instance.set("greeting", serde_json::Value::Null, None).unwrap();
    assert_eq!(instance.get("greeting").unwrap(), None);

    let values = instance.mget(&["user", "absent"]).unwrap();
    assert_eq!(values["user"], Some(json!({"a": "b"})));
    assert_eq!(values["absent"], None);

    // No enumeration on memcached: keys() is empty even with data present
    assert_eq!(instance.keys(None).unwrap(), Vec::<String>::new());

    // flush() drops the whole store - the documented deviation
    instance.flush(None).unwrap();
    assert_eq!(instance.get("user").unwrap(), None);
}
