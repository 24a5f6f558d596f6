use crate::domain_port::*;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
enum Value {
    Str(String),
    Set(HashSet<String>),
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Option<DateTime<Utc>>,
}

impl Entry {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|at| now < at)
    }
}

/// Process-local stand-in for the shared cache. Expired keys are dropped
/// lazily when touched, the way Redis hides them until its own sweep.
pub struct InMemoryKvStore {
    entries: DashMap<String, Entry>,
    clock: Arc<dyn Clock>,
}

impl InMemoryKvStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        InMemoryKvStore {
            entries: DashMap::new(),
            clock,
        }
    }

    /// Past the end of the calendar the entry simply never expires.
    fn deadline(&self, ttl: Duration) -> DateTime<Utc> {
        let millis = i64::try_from(ttl_millis(ttl)).unwrap_or(i64::MAX);
        chrono::Duration::try_milliseconds(millis)
            .and_then(|ttl| self.clock.now().checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    fn purge_if_expired(&self, key: &str) {
        let now = self.clock.now();
        self.entries.remove_if(key, |_, entry| !entry.is_live(now));
    }

    fn wrong_type(key: &str) -> KvError {
        KvError::Backend(format!("WRONGTYPE operation against key {key}"))
    }
}

#[async_trait::async_trait]
impl KvStore for InMemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        self.purge_if_expired(key);
        match self.entries.get(key) {
            None => Ok(None),
            Some(entry) => match &entry.value {
                Value::Str(s) => Ok(Some(s.clone())),
                Value::Set(_) => Err(Self::wrong_type(key)),
            },
        }
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), KvError> {
        let entry = Entry {
            value: Value::Str(value.to_string()),
            expires_at: Some(self.deadline(ttl)),
        };
        self.entries.insert(key.to_string(), entry);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, KvError> {
        self.purge_if_expired(key);
        Ok(self.entries.contains_key(key))
    }

    async fn del(&self, key: &str) -> Result<(), KvError> {
        self.entries.remove(key);
        Ok(())
    }

    async fn set_add(&self, key: &str, member: &str) -> Result<(), KvError> {
        self.purge_if_expired(key);
        let mut entry = self.entries.entry(key.to_string()).or_insert_with(|| Entry {
            value: Value::Set(HashSet::new()),
            expires_at: None,
        });
        match &mut entry.value {
            Value::Set(members) => {
                members.insert(member.to_string());
                Ok(())
            }
            Value::Str(_) => Err(Self::wrong_type(key)),
        }
    }

    async fn set_members(&self, key: &str) -> Result<HashSet<String>, KvError> {
        self.purge_if_expired(key);
        match self.entries.get(key) {
            None => Ok(HashSet::new()),
            Some(entry) => match &entry.value {
                Value::Set(members) => Ok(members.clone()),
                Value::Str(_) => Err(Self::wrong_type(key)),
            },
        }
    }

    async fn set_card(&self, key: &str) -> Result<u64, KvError> {
        Ok(self.set_members(key).await?.len() as u64)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), KvError> {
        self.purge_if_expired(key);
        let deadline = self.deadline(ttl);
        if let Some(mut entry) = self.entries.get_mut(key) {
            entry.expires_at = Some(deadline);
        }
        Ok(())
    }

    async fn count_prefix(&self, prefix: &str) -> Result<u64, KvError> {
        let now = self.clock.now();
        self.entries.retain(|_, entry| entry.is_live(now));
        let count = self
            .entries
            .iter()
            .filter(|entry| entry.key().starts_with(prefix))
            .count();
        Ok(count as u64)
    }
}
