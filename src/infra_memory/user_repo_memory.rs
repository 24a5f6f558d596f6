use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;

pub struct InMemoryUserRepo {
    users: DashMap<UserId, CredentialsRecord>,
    by_email: DashMap<String, UserId>,
    clock: Arc<dyn Clock>,
}

impl InMemoryUserRepo {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        InMemoryUserRepo {
            users: DashMap::new(),
            by_email: DashMap::new(),
            clock,
        }
    }

    /// Flip the account flags of an existing user; returns false if unknown.
    pub fn set_flags(&self, user_id: UserId, enabled: bool, locked: bool) -> bool {
        match self.users.get_mut(&user_id) {
            Some(mut rec) => {
                rec.user.enabled = enabled;
                rec.user.locked = locked;
                true
            }
            None => false,
        }
    }

    pub fn remove(&self, user_id: UserId) {
        if let Some((_, rec)) = self.users.remove(&user_id) {
            self.by_email.remove(&rec.user.email);
        }
    }
}

#[async_trait::async_trait]
impl UserRepo for InMemoryUserRepo {
    async fn find_by_id(&self, user_id: UserId) -> Result<Option<UserRecord>, AuthError> {
        Ok(self.users.get(&user_id).map(|rec| rec.user.clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<CredentialsRecord>, AuthError> {
        let Some(user_id) = self.by_email.get(email).map(|id| *id) else {
            return Ok(None);
        };
        Ok(self.users.get(&user_id).map(|rec| rec.clone()))
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AuthError> {
        Ok(self.by_email.contains_key(email))
    }

    async fn create(&self, user: NewUser) -> Result<UserRecord, AuthError> {
        match self.by_email.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(AuthError::DuplicateIdentity),
            Entry::Vacant(slot) => {
                let record = UserRecord {
                    user_id: user.user_id,
                    email: user.email,
                    user_type: user.user_type,
                    enabled: true,
                    locked: false,
                    created_at: self.clock.now(),
                };
                self.users.insert(
                    user.user_id,
                    CredentialsRecord {
                        user: record.clone(),
                        password_hash: user.password_hash,
                    },
                );
                slot.insert(user.user_id);
                Ok(record)
            }
        }
    }
}
