use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_kv::*;
use crate::infra_memory::*;
use crate::infra_mysql::*;
use crate::infra_redis::*;
use crate::logger::*;
use crate::settings::Settings;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use std::sync::Arc;

pub struct Server {
    pub session_manager: Arc<dyn SessionManager>,
    pub authenticator: Arc<dyn Authenticator>,
    pool: Option<MySqlPool>,
}

impl Server {
    /// Assembles a server around already-built services.
    pub fn new(
        session_manager: Arc<dyn SessionManager>,
        authenticator: Arc<dyn Authenticator>,
    ) -> Self {
        Self {
            session_manager,
            authenticator,
            pool: None,
        }
    }

    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let kv_store: Arc<dyn KvStore> = match settings.store.backend.as_str() {
            "redis" => {
                let redis_client = redis::Client::open(settings.store.redis_url.as_str())?;
                let redis_manager = redis_client.get_connection_manager().await?;
                Arc::new(RedisKvStore::new(redis_manager, settings.store.op_timeout()))
            }
            "memory" => {
                warn!("in-memory token store: sessions are not shared across instances");
                Arc::new(InMemoryKvStore::new(clock.clone()))
            }
            other => return Err(anyhow::anyhow!("Unknown store backend: {}", other)),
        };

        let (user_repo, pool): (Arc<dyn UserRepo>, Option<MySqlPool>) =
            match settings.user.backend.as_str() {
                "mysql" => {
                    let pool = MySqlPoolOptions::new()
                        .acquire_timeout(settings.user.acquire_timeout())
                        .connect(&settings.user.mysql_url)
                        .await?;
                    let repo = MySqlUserRepo::new(pool.clone(), settings.user.acquire_timeout());
                    (Arc::new(repo), Some(pool))
                }
                "memory" => (Arc::new(InMemoryUserRepo::new(clock.clone())), None),
                other => return Err(anyhow::anyhow!("Unknown user backend: {}", other)),
            };

        let credential_hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2PasswordHasher);
        let credential_verifier: Arc<dyn CredentialVerifier> = Arc::new(
            PasswordCredentialVerifier::new(user_repo.clone(), credential_hasher.clone()),
        );
        let token_codec: Arc<dyn TokenCodec> = Arc::new(JwtHs256Codec::new(
            settings.token.secret.as_bytes(),
            clock.clone(),
        )?);

        let session_store: Arc<dyn SessionStore> = Arc::new(KvSessionStore::new(
            kv_store.clone(),
            settings.token.refresh_length,
        ));
        let revocation_store: Arc<dyn RevocationStore> =
            Arc::new(KvRevocationStore::new(kv_store));

        let session_manager: Arc<dyn SessionManager> = Arc::new(RealSessionManager::new(
            user_repo.clone(),
            credential_verifier,
            credential_hasher,
            token_codec.clone(),
            session_store,
            revocation_store.clone(),
            clock,
            SessionConfig {
                access_ttl: settings.token.access_ttl(),
                refresh_ttl: settings.token.refresh_ttl(),
                blacklist_ttl: settings.token.blacklist_ttl(),
            },
        ));
        let authenticator: Arc<dyn Authenticator> = Arc::new(BearerAuthenticator::new(
            token_codec,
            revocation_store,
            user_repo,
        ));

        info!(
            store = %settings.store.backend,
            user = %settings.user.backend,
            "server started"
        );

        Ok(Self {
            session_manager,
            authenticator,
            pool,
        })
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");

        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}
