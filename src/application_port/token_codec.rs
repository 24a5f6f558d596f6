use crate::application_port::AuthError;
use crate::domain_model::*;
use std::time::Duration;

/// Stateless signing and verification of access tokens.
///
/// There is deliberately no way to read claims without verifying the signature.
pub trait TokenCodec: Send + Sync {
    fn issue(
        &self,
        subject: UserId,
        claims: &TokenClaims,
        ttl: Duration,
    ) -> Result<(AccessToken, chrono::DateTime<chrono::Utc>), AuthError>;

    fn decode_and_verify(&self, token: &AccessToken) -> Result<VerifiedToken, AuthError>;
}
