//! Basic usage: a file-backed cache with two isolated instances.
//!
//! Run with: cargo run --example basic

use lethe::{Cache, CacheConfig, InstanceConfig};
use serde_json::json;

fn main() -> anyhow::Result<()> {
    let store_path = std::env::temp_dir().join("lethe-example");

    let cache = Cache::new(
        CacheConfig::new()
            .with_instance("default", InstanceConfig::file(&store_path))
            .with_instance("sessions", InstanceConfig::file(&store_path)),
    );

    let store = cache.instance(None)?;
    let sessions = cache.instance(Some("sessions"))?;

    // Scalars pass through untouched; structured values are encoded
    store.set("greeting", "hello", None)?;
    store.set("user.1", json!({"name": "alice", "admin": true}), None)?;

    println!("greeting     = {:?}", store.get("greeting")?);
    println!("user.1       = {:?}", store.get("user.1")?);
    println!("user.1 (raw) = {:?}", store.get_raw("user.1")?);

    // Same logical key, different instance, no collision
    sessions.set("user.1", "session-token", Some(3600))?;
    println!("sessions     = {:?}", sessions.get("user.1")?);

    let mut keys = store.keys(None)?;
    keys.sort();
    println!("default keys = {keys:?}");

    store.flush(None)?;
    sessions.flush(None)?;

    Ok(())
}
