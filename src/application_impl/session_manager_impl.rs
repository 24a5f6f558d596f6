use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    /// Revocation TTL for access tokens whose own expiry cannot be read.
    pub blacklist_ttl: Duration,
}

pub struct RealSessionManager {
    user_repo: Arc<dyn UserRepo>,
    credential_verifier: Arc<dyn CredentialVerifier>,
    credential_hasher: Arc<dyn CredentialHasher>,
    token_codec: Arc<dyn TokenCodec>,
    session_store: Arc<dyn SessionStore>,
    revocation_store: Arc<dyn RevocationStore>,
    clock: Arc<dyn Clock>,
    config: SessionConfig,
}

impl RealSessionManager {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_repo: Arc<dyn UserRepo>,
        credential_verifier: Arc<dyn CredentialVerifier>,
        credential_hasher: Arc<dyn CredentialHasher>,
        token_codec: Arc<dyn TokenCodec>,
        session_store: Arc<dyn SessionStore>,
        revocation_store: Arc<dyn RevocationStore>,
        clock: Arc<dyn Clock>,
        config: SessionConfig,
    ) -> Self {
        Self {
            user_repo,
            credential_verifier,
            credential_hasher,
            token_codec,
            session_store,
            revocation_store,
            clock,
            config,
        }
    }

    fn validate_registration(email: &str, password: &str) -> Result<(), AuthError> {
        if email.trim().is_empty() || !email.contains('@') {
            return Err(AuthError::InvalidInput("invalid email".to_string()));
        }
        if password.is_empty() {
            return Err(AuthError::InvalidInput("password is required".to_string()));
        }
        Ok(())
    }

    async fn issue_pair(&self, user: &UserRecord) -> Result<AuthResult, AuthError> {
        let claims = TokenClaims {
            email: user.email.clone(),
            user_type: user.user_type,
        };
        let (access_token, _) = self
            .token_codec
            .issue(user.user_id, &claims, self.config.access_ttl)?;

        let refresh_token = self.session_store.new_token();
        self.session_store
            .save(user.user_id, &refresh_token, self.config.refresh_ttl)
            .await?;

        Ok(AuthResult {
            token_type: BEARER,
            access_token,
            refresh_token,
            user_id: user.user_id,
            email: user.email.clone(),
            user_type: user.user_type,
        })
    }

    /// How long the blacklist entry for `token` should live, or `None` if the
    /// token is already past its expiry and needs no entry.
    fn revocation_ttl(&self, token: &AccessToken) -> Option<Duration> {
        match self.token_codec.decode_and_verify(token) {
            Ok(verified) => (verified.expires_at - self.clock.now())
                .to_std()
                .ok()
                .filter(|remaining| !remaining.is_zero()),
            Err(AuthError::TokenExpired) => None,
            Err(_) => Some(self.config.blacklist_ttl),
        }
    }
}

#[async_trait::async_trait]
impl SessionManager for RealSessionManager {
    async fn register(&self, input: RegisterInput) -> Result<AuthResult, AuthError> {
        let RegisterInput {
            email,
            password,
            user_type,
        } = input;

        Self::validate_registration(&email, &password)?;

        if self.user_repo.email_exists(&email).await? {
            return Err(AuthError::DuplicateIdentity);
        }

        let password_hash = self.credential_hasher.hash_password(&password).await?;
        let user = self
            .user_repo
            .create(NewUser {
                user_id: UserId::new(),
                email,
                password_hash,
                user_type,
            })
            .await?;
        info!(user_id = %user.user_id, user_type = %user.user_type, "user registered");

        self.issue_pair(&user).await
    }

    async fn login(&self, input: LoginInput) -> Result<AuthResult, AuthError> {
        let user = self
            .credential_verifier
            .verify_credentials(&input.email, &input.password)
            .await?;

        let result = self.issue_pair(&user).await?;
        info!(user_id = %user.user_id, "user logged in");
        Ok(result)
    }

    async fn refresh(&self, refresh_token: &RefreshToken) -> Result<AuthResult, AuthError> {
        let user_id = self.session_store.lookup_user(refresh_token).await?;

        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        // Single use: the old token is gone before its replacement exists.
        // A crash in between strands the session; the client logs in again.
        self.session_store.delete(refresh_token).await?;

        let result = self.issue_pair(&user).await?;
        debug!(%user_id, "refresh token rotated");
        Ok(result)
    }

    async fn logout(
        &self,
        access_token: &AccessToken,
        refresh_token: &RefreshToken,
        user_id: UserId,
    ) -> Result<(), AuthError> {
        if let Some(ttl) = self.revocation_ttl(access_token) {
            self.revocation_store.revoke(access_token, ttl).await?;
        }
        self.session_store.delete(refresh_token).await?;
        info!(%user_id, "user logged out");
        Ok(())
    }

    async fn logout_all(&self, user_id: UserId) -> Result<(), AuthError> {
        self.session_store.delete_all(user_id).await?;
        info!(%user_id, "all sessions terminated");
        Ok(())
    }

    async fn active_session_count(&self, user_id: UserId) -> Result<u64, AuthError> {
        self.session_store.count(user_id).await
    }

    async fn list_sessions(&self, user_id: UserId) -> Result<HashSet<String>, AuthError> {
        self.session_store.list(user_id).await
    }

    async fn revoked_token_count(&self) -> Result<u64, AuthError> {
        self.revocation_store.count().await
    }
}
