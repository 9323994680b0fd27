//! Distributed mutual-exclusion locks for the moderation pipeline.
//!
//! One lock per moderation target guarantees at most one in-flight
//! classification attempt for that target across all worker processes.
//! Locks live in Redis with a TTL so a crashed worker cannot starve a
//! target forever; release is compare-and-delete so only the holder's
//! token can remove the entry.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use uuid::Uuid;

/// Opaque ownership token returned by a successful acquisition.
///
/// Release requires the token so a worker whose lock already expired
/// cannot delete a lock now held by someone else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockToken(String);

impl LockToken {
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Lock service abstraction (trait for testability).
#[async_trait]
pub trait BaseLockService: Send + Sync {
    /// Attempt to acquire the lock for `key` with the given TTL.
    ///
    /// Returns `Ok(None)` when the lock is already held by someone else.
    async fn try_acquire(&self, key: &str, ttl: Duration) -> Result<Option<LockToken>>;

    /// Release the lock for `key` if `token` still owns it.
    ///
    /// Returns `true` when the entry was deleted, `false` when the lock
    /// had already expired or was taken over by another holder.
    async fn release(&self, key: &str, token: &LockToken) -> Result<bool>;
}

/// Redis-backed lock service.
///
/// Acquisition is a single `SET key token NX PX ttl`, release is a Lua
/// compare-and-delete. Both are atomic on the Redis side.
#[derive(Clone)]
pub struct RedisLockService {
    conn: ConnectionManager,
}

const RELEASE_SCRIPT: &str = r#"
if redis.call('GET', KEYS[1]) == ARGV[1] then
    return redis.call('DEL', KEYS[1])
else
    return 0
end
"#;

impl RedisLockService {
    /// Connect to the lock store at `redis_url`.
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client =
            redis::Client::open(redis_url).context("invalid Redis URL for lock store")?;
        let conn = ConnectionManager::new(client)
            .await
            .context("failed to connect to Redis lock store")?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl BaseLockService for RedisLockService {
    async fn try_acquire(&self, key: &str, ttl: Duration) -> Result<Option<LockToken>> {
        let token = LockToken::generate();
        let mut conn = self.conn.clone();

        let acquired: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(token.as_str())
            .arg("NX")
            .arg("PX")
            .arg(ttl.as_millis() as u64)
            .query_async(&mut conn)
            .await
            .context("lock acquire failed")?;

        // SET NX returns OK on success, nil when the key already exists.
        Ok(acquired.map(|_| token))
    }

    async fn release(&self, key: &str, token: &LockToken) -> Result<bool> {
        let mut conn = self.conn.clone();

        let deleted: i64 = redis::Script::new(RELEASE_SCRIPT)
            .key(key)
            .arg(token.as_str())
            .invoke_async(&mut conn)
            .await
            .context("lock release failed")?;

        Ok(deleted == 1)
    }
}
