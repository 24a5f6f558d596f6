use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::Clock;
use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, crypto, decode, encode};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// HMAC-SHA256 output size; shorter secrets are refused.
pub const MIN_SIGNING_KEY_LEN: usize = 32;

#[derive(Debug, Serialize, Deserialize)]
struct AccessClaims {
    sub: String, // user id as string
    email: String,
    #[serde(rename = "type")]
    user_type: UserType,
    iat: i64,
    exp: i64,
}

pub struct JwtHs256Codec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    clock: Arc<dyn Clock>,
}

impl JwtHs256Codec {
    pub fn new(signing_key: &[u8], clock: Arc<dyn Clock>) -> Result<Self, AuthError> {
        if signing_key.len() < MIN_SIGNING_KEY_LEN {
            return Err(AuthError::InternalError(format!(
                "signing key must be at least {MIN_SIGNING_KEY_LEN} bytes"
            )));
        }
        Ok(JwtHs256Codec {
            encoding_key: EncodingKey::from_secret(signing_key),
            decoding_key: DecodingKey::from_secret(signing_key),
            clock,
        })
    }

    fn validation() -> Validation {
        let mut v = Validation::new(Algorithm::HS256);
        // exp is checked against the injected clock instead
        v.validate_exp = false;
        v.required_spec_claims = ["exp", "sub"].iter().map(|c| c.to_string()).collect::<HashSet<_>>();
        v
    }

    /// Signature check over the raw `header.payload` bytes, before anything is parsed.
    fn verify_signature(&self, raw: &str) -> Result<(), AuthError> {
        let mut segments = raw.split('.');
        let (Some(header), Some(payload), Some(signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(AuthError::TokenMalformed);
        };
        if header.is_empty() || payload.is_empty() || signature.is_empty() {
            return Err(AuthError::TokenMalformed);
        }

        let message = &raw[..header.len() + 1 + payload.len()];
        match crypto::verify(
            signature,
            message.as_bytes(),
            &self.decoding_key,
            Algorithm::HS256,
        ) {
            Ok(true) => Ok(()),
            Ok(false) | Err(_) => Err(AuthError::TokenSignatureInvalid),
        }
    }

    #[inline]
    fn timestamp(secs: i64) -> Result<DateTime<Utc>, AuthError> {
        Utc.timestamp_opt(secs, 0)
            .single()
            .ok_or(AuthError::TokenMalformed)
    }
}

impl TokenCodec for JwtHs256Codec {
    fn issue(
        &self,
        subject: UserId,
        claims: &TokenClaims,
        ttl: Duration,
    ) -> Result<(AccessToken, DateTime<Utc>), AuthError> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| AuthError::InternalError(format!("access ttl: {e}")))?;
        let iat_dt = self.clock.now();
        let exp_dt = iat_dt
            .checked_add_signed(ttl)
            .ok_or_else(|| AuthError::InternalError("access ttl out of range".to_string()))?;
        let claims = AccessClaims {
            sub: subject.to_string(),
            email: claims.email.clone(),
            user_type: claims.user_type,
            iat: iat_dt.timestamp(),
            exp: exp_dt.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InternalError(e.to_string()))?;
        Ok((AccessToken(token), Self::timestamp(claims.exp)?))
    }

    fn decode_and_verify(&self, token: &AccessToken) -> Result<VerifiedToken, AuthError> {
        self.verify_signature(token.as_str())?;

        let data = decode::<AccessClaims>(token.as_str(), &self.decoding_key, &Self::validation())
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => AuthError::TokenSignatureInvalid,
                _ => AuthError::TokenMalformed,
            })?;
        let claims = data.claims;

        if self.clock.now().timestamp() >= claims.exp {
            return Err(AuthError::TokenExpired);
        }

        let subject = claims
            .sub
            .parse::<UserId>()
            .map_err(|_| AuthError::TokenMalformed)?;

        Ok(VerifiedToken {
            subject,
            claims: TokenClaims {
                email: claims.email,
                user_type: claims.user_type,
            },
            issued_at: Self::timestamp(claims.iat)?,
            expires_at: Self::timestamp(claims.exp)?,
        })
    }
}
