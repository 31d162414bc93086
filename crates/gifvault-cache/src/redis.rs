use async_trait::async_trait;
use gifvault_core::{KeyValueStore, StoreError};
use redis::AsyncCommands;
use std::time::Duration;
use tracing::{debug, trace, warn};

use crate::Result;

/// A Redis-backed [`KeyValueStore`].
///
/// TTLs are applied with millisecond precision (`PSETEX` / `PEXPIRE`).
#[derive(Clone)]
pub struct RedisStore {
    conn: redis::aio::ConnectionManager,
}

fn map_redis_error(operation: &str, err: redis::RedisError) -> StoreError {
    let message = format!("{operation}: {err}");
    if err.is_timeout() || message.to_ascii_lowercase().contains("timed out") {
        StoreError::Timeout(message)
    } else if err.is_connection_dropped() || err.is_connection_refusal() {
        StoreError::Unavailable(message)
    } else {
        StoreError::Operation(message)
    }
}

fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

impl RedisStore {
    /// Creates a store over an existing connection manager.
    pub fn new(conn: redis::aio::ConnectionManager) -> Self {
        Self { conn }
    }

    /// Opens a connection manager for `redis_url` and wraps it.
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| map_redis_error("invalid redis url", e))?;
        let conn = client
            .get_connection_manager()
            .await
            .map_err(|e| map_redis_error("failed to connect to Redis", e))?;
        debug!("connected to Redis");
        Ok(Self::new(conn))
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        trace!(key, "GET");
        let mut conn = self.conn.clone();
        conn.get::<_, Option<String>>(key).await.map_err(|e| {
            warn!(key, error = %e, "Redis error on get");
            map_redis_error("failed to fetch value from Redis", e)
        })
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        trace!(key, ?ttl, "SET");
        let mut conn = self.conn.clone();
        let outcome = match ttl {
            Some(ttl) => conn.pset_ex::<_, _, ()>(key, value, ttl_millis(ttl)).await,
            None => conn.set::<_, _, ()>(key, value).await,
        };
        outcome.map_err(|e| {
            warn!(key, error = %e, "Redis error on set");
            map_redis_error("failed to write value to Redis", e)
        })
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        trace!(key, ?ttl, "PEXPIRE");
        let mut conn = self.conn.clone();
        let millis = i64::try_from(ttl_millis(ttl)).unwrap_or(i64::MAX);
        conn.pexpire::<_, bool>(key, millis).await.map_err(|e| {
            warn!(key, error = %e, "Redis error on expire");
            map_redis_error("failed to set expiry in Redis", e)
        })
    }
}
