//! Redis driver
//!
//! A thin pass-through to a Redis server over a single blocking connection.
//! TTLs ride on the write itself as the `EX` server option, key listing
//! uses `KEYS`, and nil replies are normalized to `None` before anything
//! reaches the instance layer.

use parking_lot::Mutex;
use tracing::debug;

use super::Driver;
use crate::config::InstanceConfig;
use crate::error::Result;

pub(crate) struct RedisDriver {
    conn: Mutex<redis::Connection>,
}

impl RedisDriver {
    pub(crate) fn connect(config: &InstanceConfig) -> Result<Self> {
        let url = match &config.socket {
            Some(socket) => format!("unix://{socket}"),
            None => format!(
                "redis://{}:{}/",
                config.host.as_deref().unwrap_or("127.0.0.1"),
                config.port.unwrap_or(6379)
            ),
        };

        debug!("connecting to redis at {}", url);
        let client = redis::Client::open(url.as_str())?;
        let conn = client.get_connection()?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl Driver for RedisDriver {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.lock();

        // Nil replies come back as None through FromRedisValue; no other
        // miss sentinel can leak out of this driver
        Ok(redis::cmd("GET").arg(key).query(&mut *conn)?)
    }

    fn set(&self, key: &str, value: Option<&str>, expires: Option<u64>) -> Result<()> {
        let Some(value) = value else {
            return self.clear(key);
        };

        let mut conn = self.conn.lock();
        match expires {
            Some(secs) => {
                redis::cmd("SET")
                    .arg(key)
                    .arg(value)
                    .arg("EX")
                    .arg(secs)
                    .query::<()>(&mut *conn)?;
            }
            None => {
                redis::cmd("SET").arg(key).arg(value).query::<()>(&mut *conn)?;
            }
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
        // Batched writes reuse the single-key path, so a null entry clears
        // its key
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
