//! Shared harness for integration tests.
//!
//! Everything runs against the in-memory adapters and a `ManualClock`, so
//! expiry is driven by `advance` rather than by sleeping.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use warden::application_impl::*;
use warden::application_port::*;
use warden::domain_model::*;
use warden::domain_port::*;
use warden::infra_kv::*;
use warden::infra_memory::*;

pub const SIGNING_KEY: &[u8] = b"integration-test-signing-key-0123456789";
pub const PASSWORD: &str = "correct horse battery staple";

pub const ACCESS_TTL: Duration = Duration::from_secs(900);
pub const REFRESH_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);
pub const BLACKLIST_TTL: Duration = Duration::from_secs(900);

/// Whole-second start so JWT second granularity lines up with the clock.
pub fn epoch() -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap()
}

/// Reversible stand-in for argon2; keeps the suite fast in debug builds.
pub struct PlainHasher;

#[async_trait::async_trait]
impl CredentialHasher for PlainHasher {
    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        Ok(format!("plain${password}"))
    }

    async fn verify_password(&self, password: &str, password_hash: &str) -> Result<bool, AuthError> {
        Ok(password_hash == format!("plain${password}"))
    }
}

/// Store whose every call times out, as a Redis behind a dead link would.
pub struct UnreachableKvStore;

#[async_trait::async_trait]
impl KvStore for UnreachableKvStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, KvError> {
        Err(KvError::Timeout)
    }
    async fn set_ex(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), KvError> {
        Err(KvError::Timeout)
    }
    async fn exists(&self, _key: &str) -> Result<bool, KvError> {
        Err(KvError::Timeout)
    }
    async fn del(&self, _key: &str) -> Result<(), KvError> {
        Err(KvError::Timeout)
    }
    async fn set_add(&self, _key: &str, _member: &str) -> Result<(), KvError> {
        Err(KvError::Timeout)
    }
    async fn set_members(&self, _key: &str) -> Result<HashSet<String>, KvError> {
        Err(KvError::Timeout)
    }
    async fn set_card(&self, _key: &str) -> Result<u64, KvError> {
        Err(KvError::Timeout)
    }
    async fn expire(&self, _key: &str, _ttl: Duration) -> Result<(), KvError> {
        Err(KvError::Timeout)
    }
    async fn count_prefix(&self, _prefix: &str) -> Result<u64, KvError> {
        Err(KvError::Timeout)
    }
}

pub struct Harness {
    pub clock: Arc<ManualClock>,
    pub kv: Arc<dyn KvStore>,
    pub users: Arc<InMemoryUserRepo>,
    pub codec: Arc<dyn TokenCodec>,
    pub revocations: Arc<dyn RevocationStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub session_manager: Arc<dyn SessionManager>,
    pub authenticator: Arc<dyn Authenticator>,
}

impl Harness {
    pub fn new() -> Self {
        let clock = Arc::new(ManualClock::new(epoch()));
        let kv: Arc<dyn KvStore> = Arc::new(InMemoryKvStore::new(clock.clone()));
        Self::build(clock, kv, Arc::new(PlainHasher))
    }

    /// Same wiring with the real argon2 hasher.
    pub fn with_argon2() -> Self {
        let clock = Arc::new(ManualClock::new(epoch()));
        let kv: Arc<dyn KvStore> = Arc::new(InMemoryKvStore::new(clock.clone()));
        Self::build(clock, kv, Arc::new(Argon2PasswordHasher))
    }

    pub fn with_kv_store(kv: Arc<dyn KvStore>) -> Self {
        let clock = Arc::new(ManualClock::new(epoch()));
        Self::build(clock, kv, Arc::new(PlainHasher))
    }

    fn build(
        clock: Arc<ManualClock>,
        kv: Arc<dyn KvStore>,
        hasher: Arc<dyn CredentialHasher>,
    ) -> Self {
        let users = Arc::new(InMemoryUserRepo::new(clock.clone()));
        let user_repo: Arc<dyn UserRepo> = users.clone();
        let codec: Arc<dyn TokenCodec> =
            Arc::new(JwtHs256Codec::new(SIGNING_KEY, clock.clone()).unwrap());
        let sessions: Arc<dyn SessionStore> = Arc::new(KvSessionStore::new(kv.clone(), 32));
        let revocations: Arc<dyn RevocationStore> = Arc::new(KvRevocationStore::new(kv.clone()));
        let verifier: Arc<dyn CredentialVerifier> =
            Arc::new(PasswordCredentialVerifier::new(user_repo.clone(), hasher.clone()));

        let session_manager: Arc<dyn SessionManager> = Arc::new(RealSessionManager::new(
            user_repo.clone(),
            verifier,
            hasher,
            codec.clone(),
            sessions.clone(),
            revocations.clone(),
            clock.clone(),
            SessionConfig {
                access_ttl: ACCESS_TTL,
                refresh_ttl: REFRESH_TTL,
                blacklist_ttl: BLACKLIST_TTL,
            },
        ));
        let authenticator: Arc<dyn Authenticator> = Arc::new(BearerAuthenticator::new(
            codec.clone(),
            revocations.clone(),
            user_repo,
        ));

        Harness {
            clock,
            kv,
            users,
            codec,
            revocations,
            sessions,
            session_manager,
            authenticator,
        }
    }

    pub async fn register(&self, email: &str) -> AuthResult {
        self.session_manager
            .register(RegisterInput {
                email: email.to_string(),
                password: PASSWORD.to_string(),
                user_type: UserType::Employer,
            })
            .await
            .unwrap()
    }

    /// Account created straight in the user store, with no session yet.
    pub async fn seed_user(&self, email: &str) -> UserRecord {
        self.users
            .create(NewUser {
                user_id: UserId::new(),
                email: email.to_string(),
                password_hash: format!("plain${PASSWORD}"),
                user_type: UserType::Applicant,
            })
            .await
            .unwrap()
    }

    pub async fn login(&self, email: &str) -> Result<AuthResult, AuthError> {
        self.session_manager
            .login(LoginInput {
                email: email.to_string(),
                password: PASSWORD.to_string(),
            })
            .await
    }

    pub fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }
}

pub fn bearer(token: &AccessToken) -> String {
    format!("Bearer {}", token.as_str())
}
