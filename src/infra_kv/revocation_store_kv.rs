use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use std::sync::Arc;
use std::time::Duration;

pub const BLACKLIST_KEY_PREFIX: &str = "blacklist:token:";
const BLACKLIST_MARKER: &str = "blacklisted";

pub struct KvRevocationStore {
    kv: Arc<dyn KvStore>,
}

impl KvRevocationStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        KvRevocationStore { kv }
    }

    fn key(token: &AccessToken) -> String {
        format!("{}{}", BLACKLIST_KEY_PREFIX, token.as_str())
    }
}

#[async_trait::async_trait]
impl RevocationStore for KvRevocationStore {
    async fn revoke(&self, token: &AccessToken, ttl: Duration) -> Result<(), AuthError> {
        self.kv
            .set_ex(&Self::key(token), BLACKLIST_MARKER, ttl)
            .await?;
        Ok(())
    }

    async fn is_revoked(&self, token: &AccessToken) -> Result<bool, AuthError> {
        Ok(self.kv.exists(&Self::key(token)).await?)
    }

    async fn count(&self) -> Result<u64, AuthError> {
        Ok(self.kv.count_prefix(BLACKLIST_KEY_PREFIX).await?)
    }
}
