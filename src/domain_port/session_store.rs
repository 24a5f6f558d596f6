use crate::application_port::AuthError;
use crate::domain_model::{RefreshToken, UserId};
use std::collections::HashSet;
use std::time::Duration;

/// Refresh token rows plus the per-user listing of issued refresh tokens.
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    /// Fresh random, URL-safe, unpadded token value.
    fn new_token(&self) -> RefreshToken;

    /// Writes `token -> user_id` and adds the token to the user's set,
    /// resetting the expiry of the whole set to `ttl`.
    async fn save(&self, user_id: UserId, token: &RefreshToken, ttl: Duration)
    -> Result<(), AuthError>;

    /// Fails with `RefreshTokenNotFound` when absent or expired.
    async fn lookup_user(&self, token: &RefreshToken) -> Result<UserId, AuthError>;

    /// Removes the token row only; the user's set keeps the stale member.
    async fn delete(&self, token: &RefreshToken) -> Result<(), AuthError>;

    /// Removes every token row listed for the user, then the set itself.
    async fn delete_all(&self, user_id: UserId) -> Result<(), AuthError>;

    async fn count(&self, user_id: UserId) -> Result<u64, AuthError>;

    async fn list(&self, user_id: UserId) -> Result<HashSet<String>, AuthError>;
}
