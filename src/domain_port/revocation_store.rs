use crate::application_port::AuthError;
use crate::domain_model::AccessToken;
use std::time::Duration;

/// Access tokens invalidated before their natural expiry.
#[async_trait::async_trait]
pub trait RevocationStore: Send + Sync {
    /// Blacklist `token` for `ttl`. The entry disappears on its own afterwards.
    async fn revoke(&self, token: &AccessToken, ttl: Duration) -> Result<(), AuthError>;
    async fn is_revoked(&self, token: &AccessToken) -> Result<bool, AuthError>;
    /// Diagnostic only; scans the whole blacklist namespace. Never call per request.
    async fn count(&self) -> Result<u64, AuthError>;
}
