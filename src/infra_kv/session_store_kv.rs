use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use argon2::password_hash::rand_core::{OsRng, RngCore};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

pub const REFRESH_TOKEN_PREFIX: &str = "refresh:token:";
pub const USER_TOKENS_PREFIX: &str = "user:tokens:";

pub struct KvSessionStore {
    kv: Arc<dyn KvStore>,
    token_length: usize,
}

impl KvSessionStore {
    /// `token_length` is the number of random bytes before encoding.
    pub fn new(kv: Arc<dyn KvStore>, token_length: usize) -> Self {
        KvSessionStore { kv, token_length }
    }

    fn token_key(token: &str) -> String {
        format!("{}{}", REFRESH_TOKEN_PREFIX, token)
    }

    fn user_key(user_id: UserId) -> String {
        format!("{}{}", USER_TOKENS_PREFIX, user_id)
    }
}

#[async_trait::async_trait]
impl SessionStore for KvSessionStore {
    fn new_token(&self) -> RefreshToken {
        let mut bytes = vec![0u8; self.token_length];
        OsRng.fill_bytes(&mut bytes);
        RefreshToken(URL_SAFE_NO_PAD.encode(bytes))
    }

    async fn save(
        &self,
        user_id: UserId,
        token: &RefreshToken,
        ttl: Duration,
    ) -> Result<(), AuthError> {
        let user_id_str = user_id.to_string();
        self.kv
            .set_ex(&Self::token_key(token.as_str()), &user_id_str, ttl)
            .await?;

        // Not atomic with the write above: a crash here leaves the row
        // unlisted, which only skews the session count.
        let user_key = Self::user_key(user_id);
        self.kv.set_add(&user_key, token.as_str()).await?;
        self.kv.expire(&user_key, ttl).await?;
        Ok(())
    }

    async fn lookup_user(&self, token: &RefreshToken) -> Result<UserId, AuthError> {
        let value = self
            .kv
            .get(&Self::token_key(token.as_str()))
            .await?
            .ok_or(AuthError::RefreshTokenNotFound)?;
        value
            .parse::<UserId>()
            .map_err(|e| AuthError::Store(format!("corrupt refresh token row: {e}")))
    }

    async fn delete(&self, token: &RefreshToken) -> Result<(), AuthError> {
        self.kv.del(&Self::token_key(token.as_str())).await?;
        Ok(())
    }

    async fn delete_all(&self, user_id: UserId) -> Result<(), AuthError> {
        let user_key = Self::user_key(user_id);
        let tokens = self.kv.set_members(&user_key).await?;
        for token in &tokens {
            self.kv.del(&Self::token_key(token)).await?;
        }
        self.kv.del(&user_key).await?;
        Ok(())
    }

    async fn count(&self, user_id: UserId) -> Result<u64, AuthError> {
        Ok(self.kv.set_card(&Self::user_key(user_id)).await?)
    }

    async fn list(&self, user_id: UserId) -> Result<HashSet<String>, AuthError> {
        Ok(self.kv.set_members(&Self::user_key(user_id)).await?)
    }
}
