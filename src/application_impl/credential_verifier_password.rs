use crate::application_port::*;
use crate::domain_port::*;
use std::sync::Arc;

/// Email + password check against the user store. Every kind of mismatch,
/// including disabled and locked accounts, reads as `InvalidCredentials`.
pub struct PasswordCredentialVerifier {
    user_repo: Arc<dyn UserRepo>,
    credential_hasher: Arc<dyn CredentialHasher>,
}

impl PasswordCredentialVerifier {
    pub fn new(user_repo: Arc<dyn UserRepo>, credential_hasher: Arc<dyn CredentialHasher>) -> Self {
        PasswordCredentialVerifier {
            user_repo,
            credential_hasher,
        }
    }
}

#[async_trait::async_trait]
impl CredentialVerifier for PasswordCredentialVerifier {
    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserRecord, AuthError> {
        let rec = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !rec.user.enabled || rec.user.locked {
            return Err(AuthError::InvalidCredentials);
        }

        let ok = self
            .credential_hasher
            .verify_password(password, &rec.password_hash)
            .await?;
        if !ok {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(rec.user)
    }
}
