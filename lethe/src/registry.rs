//! Instance registry
//!
//! One [`Cache`] is constructed at process start from a [`CacheConfig`]
//! and shared; named instances are built lazily on first resolve and
//! memoized for the registry's lifetime so every caller shares the same
//! backend connection per name.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::instance::Instance;

/// Registry of named cache instances.
pub struct Cache {
    config: CacheConfig,
    instances: Mutex<HashMap<String, Arc<Instance>>>,
}

impl Cache {
    /// Create a registry over the given configuration.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            instances: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve a named instance, constructing it on first use.
    ///
    /// Passing `None` resolves the `"default"` instance. Later resolves of
    /// the same name return the identical `Arc`, so state written through
    /// one handle is visible through every other. The registry lock is
    /// held across construction: concurrent first resolves of one name
    /// block until exactly one instance exists.
    ///
    /// # Errors
    ///
    /// [`CacheError::ConfigNotFound`] when the configuration has no entry
    /// for the name, [`CacheError::InvalidDriver`] when the entry names an
    /// unknown backend kind, or the backend's own connection error.
    pub fn instance(&self, name: Option<&str>) -> Result<Arc<Instance>> {
        let name = name.unwrap_or("default");

        let mut instances = self.instances.lock();
        if let Some(instance) = instances.get(name) {
            return Ok(Arc::clone(instance));
        }

        let config = self
            .config
            .get(name)
            .ok_or_else(|| CacheError::ConfigNotFound(name.to_string()))?;

        let instance = Arc::new(Instance::new(name, config)?);
        instances.insert(name.to_string(), Arc::clone(&instance));

        Ok(instance)
    }
}
