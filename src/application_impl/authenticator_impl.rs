use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use std::sync::Arc;

const BEARER_PREFIX: &str = "Bearer ";

/// Resolves the caller from a bearer access token.
///
/// Order matters: the blacklist is consulted first so a revoked token costs
/// no signature work, and the user store only sees verified subjects.
pub struct BearerAuthenticator {
    token_codec: Arc<dyn TokenCodec>,
    revocation_store: Arc<dyn RevocationStore>,
    user_repo: Arc<dyn UserRepo>,
}

impl BearerAuthenticator {
    pub fn new(
        token_codec: Arc<dyn TokenCodec>,
        revocation_store: Arc<dyn RevocationStore>,
        user_repo: Arc<dyn UserRepo>,
    ) -> Self {
        Self {
            token_codec,
            revocation_store,
            user_repo,
        }
    }
}

/// Token part of an `Authorization: Bearer <token>` value. Other schemes and
/// empty tokens count as "no bearer token".
pub fn bearer_token(authorization: Option<&str>) -> Option<&str> {
    authorization?
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[async_trait::async_trait]
impl Authenticator for BearerAuthenticator {
    async fn authenticate(&self, authorization: Option<&str>) -> Result<CallerIdentity, AuthError> {
        let Some(raw) = bearer_token(authorization) else {
            return Ok(CallerIdentity::Anonymous);
        };
        let token = AccessToken(raw.to_string());

        if self.revocation_store.is_revoked(&token).await? {
            return Err(AuthError::TokenRevoked);
        }

        let verified = self.token_codec.decode_and_verify(&token)?;

        let user = match self.user_repo.find_by_id(verified.subject).await? {
            Some(user) => user,
            None => {
                warn!(user_id = %verified.subject, "valid token for unknown user");
                return Err(AuthError::UserNotFound);
            }
        };

        Ok(CallerIdentity::Authenticated(Principal {
            user_id: user.user_id,
            email: user.email,
            user_type: user.user_type,
        }))
    }
}
