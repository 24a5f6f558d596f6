use crate::domain_model::*;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("identity already exists")]
    DuplicateIdentity,
    #[error("token malformed")]
    TokenMalformed,
    #[error("token signature invalid")]
    TokenSignatureInvalid,
    #[error("token expired")]
    TokenExpired,
    #[error("token revoked")]
    TokenRevoked,
    #[error("refresh token not found")]
    RefreshTokenNotFound,
    #[error("user not found")]
    UserNotFound,
    #[error("upstream timeout")]
    UpstreamTimeout,
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("store error: {0}")]
    Store(String),
    #[error("internal error: {0}")]
    InternalError(String),
}

#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub user_type: UserType,
}

#[derive(Debug, Clone)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Token pair plus the account it was issued to.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResult {
    pub token_type: &'static str,
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
    pub user_id: UserId,
    pub email: String,
    pub user_type: UserType,
}

pub const BEARER: &str = "Bearer";

/// Login, rotation and logout over access/refresh token pairs.
#[async_trait::async_trait]
pub trait SessionManager: Send + Sync {
    async fn register(&self, input: RegisterInput) -> Result<AuthResult, AuthError>;
    async fn login(&self, input: LoginInput) -> Result<AuthResult, AuthError>;
    /// Consumes `refresh_token` and returns a freshly rotated pair.
    async fn refresh(&self, refresh_token: &RefreshToken) -> Result<AuthResult, AuthError>;
    /// Revokes the access token for its remaining lifetime and drops the refresh token.
    /// Succeeds even when either token is already invalid.
    async fn logout(
        &self,
        access_token: &AccessToken,
        refresh_token: &RefreshToken,
        user_id: UserId,
    ) -> Result<(), AuthError>;
    /// Destroys every refresh token of the user. Access tokens stay valid until expiry.
    async fn logout_all(&self, user_id: UserId) -> Result<(), AuthError>;
    /// Upper bound: may include refresh tokens already dropped by a single logout.
    async fn active_session_count(&self, user_id: UserId) -> Result<u64, AuthError>;
    async fn list_sessions(&self, user_id: UserId) -> Result<HashSet<String>, AuthError>;
    async fn revoked_token_count(&self) -> Result<u64, AuthError>;
}
