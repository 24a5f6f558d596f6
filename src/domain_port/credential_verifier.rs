use crate::application_port::AuthError;
use crate::domain_port::UserRecord;

#[async_trait::async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Returns the account on a match, `InvalidCredentials` otherwise.
    async fn verify_credentials(&self, email: &str, password: &str)
    -> Result<UserRecord, AuthError>;
}
