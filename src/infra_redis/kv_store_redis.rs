use crate::domain_port::*;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, RedisResult};
use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

const SCAN_BATCH: usize = 500;

/// `KvStore` over a shared Redis. Every command is bounded by `op_timeout`
/// and a timeout surfaces as `KvError::Timeout`, never as an empty answer.
pub struct RedisKvStore {
    conn: ConnectionManager,
    op_timeout: Duration,
}

impl RedisKvStore {
    pub fn new(conn: ConnectionManager, op_timeout: Duration) -> Self {
        RedisKvStore { conn, op_timeout }
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, KvError>
    where
        F: Future<Output = RedisResult<T>>,
    {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) if e.is_timeout() => Err(KvError::Timeout),
            Ok(Err(e)) => Err(KvError::Backend(e.to_string())),
            Err(_) => Err(KvError::Timeout),
        }
    }
}

#[async_trait::async_trait]
impl KvStore for RedisKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let mut conn = self.conn.clone();
        self.bounded(conn.get::<_, Option<String>>(key)).await
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), KvError> {
        let mut conn = self.conn.clone();
        self.bounded(conn.pset_ex::<_, _, ()>(key, value, ttl_millis(ttl)))
            .await
    }

    async fn exists(&self, key: &str) -> Result<bool, KvError> {
        let mut conn = self.conn.clone();
        self.bounded(conn.exists::<_, bool>(key)).await
    }

    async fn del(&self, key: &str) -> Result<(), KvError> {
        let mut conn = self.conn.clone();
        self.bounded(conn.del::<_, ()>(key)).await
    }

    async fn set_add(&self, key: &str, member: &str) -> Result<(), KvError> {
        let mut conn = self.conn.clone();
        self.bounded(conn.sadd::<_, _, ()>(key, member)).await
    }

    async fn set_members(&self, key: &str) -> Result<HashSet<String>, KvError> {
        let mut conn = self.conn.clone();
        self.bounded(conn.smembers::<_, HashSet<String>>(key))
            .await
    }

    async fn set_card(&self, key: &str) -> Result<u64, KvError> {
        let mut conn = self.conn.clone();
        self.bounded(conn.scard::<_, u64>(key)).await
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), KvError> {
        let mut conn = self.conn.clone();
        let millis = i64::try_from(ttl_millis(ttl)).unwrap_or(i64::MAX);
        self.bounded(conn.pexpire::<_, ()>(key, millis)).await
    }

    async fn count_prefix(&self, prefix: &str) -> Result<u64, KvError> {
        let mut conn = self.conn.clone();
        let pattern = format!("{prefix}*");
        let mut cursor: u64 = 0;
        let mut count: u64 = 0;
        loop {
            let mut cmd = redis::cmd("SCAN");
            cmd.arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH);
            let (next, keys): (u64, Vec<String>) = self.bounded(cmd.query_async(&mut conn)).await?;
            count += keys.len() as u64;
            if next == 0 {
                break;
            }
            cursor = next;
        }
        Ok(count)
    }
}
