//! File-backed driver
//!
//! Stores one file per cache key under a configured directory. The backing
//! store has no native TTL, so expiry is emulated: every write wraps the
//! value in an envelope carrying its expiry timestamp, and reads evict
//! lazily when that timestamp has passed. There is no background sweep.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

use super::Driver;
use crate::config::InstanceConfig;
use crate::error::Result;

/// On-disk record pairing a value with its expiry timestamp.
///
/// `expires` is epoch seconds; it is always written, with an explicit null
/// meaning the key never expires. Only these two fields exist at the top
/// level, so a reader can test expiry before materializing the payload.
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    value: Value,
    #[serde(default)]
    expires: Option<u64>,
}

pub(crate) struct FileDriver {
    store_path: PathBuf,
}

impl FileDriver {
    pub(crate) fn new(config: &InstanceConfig) -> Result<Self> {
        let store_path = config.store_path.clone().ok_or_else(|| {
            std::io::Error::new(
                ErrorKind::InvalidInput,
                "file driver requires a store_path",
            )
        })?;

        fs::create_dir_all(&store_path)?;

        Ok(Self { store_path })
    }

    /// The file in which to store a cached value.
    fn filename(&self, key: &str) -> PathBuf {
        self.store_path.join(key)
    }

    fn now_epoch() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

impl Driver for FileDriver {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let data = match fs::read_to_string(self.filename(key)) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let envelope: Envelope = serde_json::from_str(&data)?;

        // Expiry is checked before the payload is looked at. An expired key
        // is deleted as a side effect of the read; this is not atomic with
        // respect to a concurrent writer of the same key.
        if let Some(expires) = envelope.expires {
            if Self::now_epoch() > expires {
                debug!("key expired, evicting: {}", key);
                self.clear(key)?;
                return Ok(None);
            }
        }

        Ok(match envelope.value {
            Value::Null => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        })
    }

    fn set(&self, key: &str, value: Option<&str>, expires: Option<u64>) -> Result<()> {
        let envelope = Envelope {
            value: value.map_or(Value::Null, |v| Value::String(v.to_string())),
            expires: expires.map(|secs| Self::now_epoch() + secs),
        };

        fs::write(self.filename(key), serde_json::to_string(&envelope)?)?;
        Ok(())
    }

    fn mget(&self, keys: &[String]) -> Result<Vec<Option<String>>> {
        keys.iter().map(|key| self.get(key)).collect()
    }

    fn mset(&self, entries: &[(String, Option<String>)], expires: Option<u64>) -> Result<()> {
        for (key, value) in entries {
            self.set(key, value.as_deref(), expires)?;
        }
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.filename(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn mclear(&self, keys: &[String]) -> Result<()> {
        for key in keys {
            self.clear(key)?;
        }
        Ok(())
    }

    fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.store_path) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut keys = Vec::new();
        for entry in entries {
            let name = entry?.file_name();
            let name = name.to_string_lossy();
            if glob_match(pattern, &name) {
                keys.push(name.into_owned());
            }
        }

        Ok(keys)
    }

    fn flush(&self, pattern: &str) -> Result<()> {
        let keys = self.keys(pattern)?;
        self.mclear(&keys)
    }
}

/// Glob-style match supporting the `*` wildcard.
fn glob_match(pattern: &str, name: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let name: Vec<char> = name.chars().collect();
    let (mut pi, mut ni) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while ni < name.len() {
        if pi < pattern.len() && pattern[pi] == name[ni] {
            pi += 1;
            ni += 1;
        } else if pi < pattern.len() && pattern[pi] == '*' {
            star = Some((pi, ni));
            pi += 1;
        } else if let Some((star_pi, star_ni)) = star {
            // Backtrack: let the last star consume one more character
            pi = star_pi + 1;
            ni = star_ni + 1;
            star = Some((star_pi, star_ni + 1));
        } else {
            return false;
        }
    }

    while pi < pattern.len() && pattern[pi] == '*' {
        pi += 1;
    }

    pi == pattern.len()
}
