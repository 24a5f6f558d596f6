use crate::application_port::AuthError;
use std::collections::HashSet;
use std::time::Duration;

/// Shared key-value cache with per-key expiry.
///
/// Each call touches a single key and is atomic with respect to that key.
/// Expired keys must be indistinguishable from absent ones.
#[async_trait::async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError>;
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), KvError>;
    async fn exists(&self, key: &str) -> Result<bool, KvError>;
    async fn del(&self, key: &str) -> Result<(), KvError>;
    async fn set_add(&self, key: &str, member: &str) -> Result<(), KvError>;
    async fn set_members(&self, key: &str) -> Result<HashSet<String>, KvError>;
    async fn set_card(&self, key: &str) -> Result<u64, KvError>;
    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), KvError>;
    /// Number of live keys starting with `prefix`. Walks the keyspace; O(keys).
    async fn count_prefix(&self, prefix: &str) -> Result<u64, KvError>;
}

#[derive(Debug, thiserror::Error)]
pub enum KvError {
    #[error("store operation timed out")]
    Timeout,
    #[error("store backend error: {0}")]
    Backend(String),
}

impl From<KvError> for AuthError {
    fn from(err: KvError) -> Self {
        match err {
            KvError::Timeout => AuthError::UpstreamTimeout,
            KvError::Backend(e) => AuthError::Store(e),
        }
    }
}

/// Whole milliseconds, rounded down so an entry never outlives what it guards,
/// but never zero: a zero expiry means "delete now" or "forever" to most stores.
/// Capped at `i64::MAX` since stores take the expiry as a signed integer and a
/// negative one deletes the key.
pub fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis())
        .unwrap_or(u64::MAX)
        .clamp(1, i64::MAX as u64)
}
