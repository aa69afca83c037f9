use thiserror::Error;

/// Main error type for cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("No config could be found for instance '{0}'")]
    ConfigNotFound(String),

    #[error("'{0}' is not a valid driver")]
    InvalidDriver(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Memcached error: {0}")]
    Memcached(#[from] memcache::MemcacheError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CacheError {
    /// Whether the error was raised while constructing an instance, as
    /// opposed to during a backend operation. Construction failures are
    /// retryable with corrected configuration.
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigNotFound(_) | Self::InvalidDriver(_))
    }
}

/// Result type alias for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;
