use crate::domain_model::{UserId, UserType};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Signed, self-verifying bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AccessToken(pub String);

/// Opaque random string; meaning lives only in the session store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RefreshToken(pub String);

impl AccessToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl RefreshToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Claims carried next to the subject of an access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub email: String,
    pub user_type: UserType,
}

/// What `decode_and_verify` hands back once signature and expiry checked out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    pub subject: UserId,
    pub claims: TokenClaims,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
