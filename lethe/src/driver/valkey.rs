//! Valkey driver
//!
//! Valkey speaks the Redis protocol, so this driver rides the same client
//! crate as the redis driver. It is kept as a separate backend kind for
//! config compatibility, and it carries the historical behavioral
//! difference of issuing `SETEX` for expiring writes instead of the `EX`
//! option on `SET`.

use parking_lot::Mutex;
use tracing::debug;

use super::Driver;
use crate::config::InstanceConfig;
use crate::error::Result;

pub(crate) struct ValkeyDriver {
    conn: Mutex<redis::Connection>,
}

impl ValkeyDriver {
    pub(crate) fn connect(config: &InstanceConfig) -> Result<Self> {
        let url = match &config.socket {
            Some(socket) => format!("unix://{socket}"),
            None => format!(
                "redis://{}:{}/",
                config.host.as_deref().unwrap_or("127.0.0.1"),
                config.port.unwrap_or(6379)
            ),
        };

        debug!("connecting to valkey at {}", url);
        let conn = redis::Client::open(url.as_str())?.get_connection()?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl Driver for ValkeyDriver {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.lock();
        Ok(redis::cmd("GET").arg(key).query(&mut *conn)?)
    }

    fn set(&self, key: &str, value: Option<&str>, expires: Option<u64>) -> Result<()> {
        let Some(value) = value else {
            return self.clear(key);
        };

        let mut conn = self.conn.lock();
        if let Some(secs) = expires {
            // SETEX writes the value and its TTL in one command
            redis::cmd("SETEX")
                .arg(key)
                .arg(secs)
                .arg(value)
                .query::<()>(&mut *conn)?;
        } else {
            redis::cmd("SET").arg(key).arg(value).query::<()>(&mut *conn)?;
        }

        Ok(())
    }

    fn mget(&self, keys: &[String]) -> Result<Vec<Option<String>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.conn.lock();
        Ok(redis::cmd("MGET").arg(keys).query(&mut *conn)?)
    }

    fn mset(&self, entries: &[(String, Option<String>)], expires: Option<u64>) -> Result<()> {
        for (key, value) in entries {
            self.set(key, value.as_deref(), expires)?;
        }

        Ok(())
    }

    fn clear(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.lock();
        redis::cmd("DEL").arg(key).query::<i64>(&mut *conn)?;
        Ok(())
    }

    fn mclear(&self, keys: &[String]) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }

        let mut conn = self.conn.lock();
        redis::cmd("DEL").arg(keys).query::<i64>(&mut *conn)?;
        Ok(())
    }

    fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        let mut conn = self.conn.lock();
        Ok(redis::cmd("KEYS").arg(pattern).query(&mut *conn)?)
    }

    fn flush(&self, pattern: &str) -> Result<()> {
        let keys = self.keys(pattern)?;
        self.mclear(&keys)
    }
}
