use crate::application_port::AuthError;
use crate::domain_model::CallerIdentity;

/// Per-request identity resolution from an optional `Authorization` header value.
#[async_trait::async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, authorization: Option<&str>) -> Result<CallerIdentity, AuthError>;
}
