//! # Lethe
//!
//! Uniform caching facade over interchangeable storage backends.
//!
//! Application code reads and writes named, possibly structured values
//! through one API; the actual storage is delegated to a backend chosen
//! per instance in configuration:
//!
//! - **file** - one file per key, TTL emulated with lazy eviction on read
//! - **redis** - native TTL and key listing over the Redis protocol
//! - **valkey** - Redis-protocol variant kept for config compatibility
//! - **memcached** - native TTL, no key enumeration
//!
//! Every instance namespaces its keys with a checksum of its own name, so
//! any number of logical caches can share one physical store without
//! collisions. Structured values (maps and sequences) are encoded to JSON
//! text on write and decoded best-effort on read; scalars pass through
//! untouched.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lethe::{Cache, CacheConfig, InstanceConfig};
//! use serde_json::json;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = CacheConfig::new()
//!         .with_instance("default", InstanceConfig::file("/var/cache/app"))
//!         .with_instance("sessions", InstanceConfig::redis("127.0.0.1", 6379));
//!
//!     let cache = Cache::new(config);
//!
//!     let store = cache.instance(None)?;
//!     store.set("user.1", json!({"name": "alice"}), Some(3600))?;
//!     let user = store.get("user.1")?;
//!     println!("{user:?}");
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;

mod driver;
mod instance;
mod registry;
mod value;

pub use config::{CacheConfig, InstanceConfig};
pub use error::{CacheError, Result};
pub use instance::Instance;
pub use registry::Cache;
