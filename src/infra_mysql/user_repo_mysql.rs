use super::util::{is_dup_key, store_error};
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use std::future::Future;
use std::time::Duration;
use uuid::Uuid;

/// Expected table:
///
/// ```sql
/// CREATE TABLE users (
///     user_id       BINARY(16)   NOT NULL PRIMARY KEY,
///     email         VARCHAR(255) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     user_type     VARCHAR(16)  NOT NULL,
///     enabled       BOOLEAN      NOT NULL DEFAULT TRUE,
///     locked        BOOLEAN      NOT NULL DEFAULT FALSE,
///     created_at    TIMESTAMP    NOT NULL DEFAULT CURRENT_TIMESTAMP
/// );
/// ```
pub struct MySqlUserRepo {
    pool: MySqlPool,
    query_timeout: Duration,
}

impl MySqlUserRepo {
    pub fn new(pool: MySqlPool, query_timeout: Duration) -> Self {
        MySqlUserRepo {
            pool,
            query_timeout,
        }
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, AuthError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.query_timeout, fut).await {
            Ok(result) => result.map_err(store_error),
            Err(_) => Err(AuthError::UpstreamTimeout),
        }
    }

    #[inline]
    fn uid_from_bytes(id: &[u8]) -> Result<UserId, AuthError> {
        Ok(UserId(
            Uuid::from_slice(id).map_err(|e| AuthError::Store(e.to_string()))?,
        ))
    }

    fn row_to_record(row: MySqlRow) -> Result<CredentialsRecord, AuthError> {
        let user_id_bytes: Vec<u8> = row
            .try_get("user_id")
            .map_err(|e| AuthError::Store(e.to_string()))?;
        let user_id = Self::uid_from_bytes(&user_id_bytes)?;

        let email: String = row
            .try_get("email")
            .map_err(|e| AuthError::Store(e.to_string()))?;
        let password_hash: String = row
            .try_get("password_hash")
            .map_err(|e| AuthError::Store(e.to_string()))?;
        let user_type: String = row
            .try_get("user_type")
            .map_err(|e| AuthError::Store(e.to_string()))?;
        let user_type = user_type.parse::<UserType>().map_err(AuthError::Store)?;
        let enabled: bool = row
            .try_get("enabled")
            .map_err(|e| AuthError::Store(e.to_string()))?;
        let locked: bool = row
            .try_get("locked")
            .map_err(|e| AuthError::Store(e.to_string()))?;
        let created_at: DateTime<Utc> = row
            .try_get("created_at")
            .map_err(|e| AuthError::Store(e.to_string()))?;

        Ok(CredentialsRecord {
            user: UserRecord {
                user_id,
                email,
                user_type,
                enabled,
                locked,
                created_at,
            },
            password_hash,
        })
    }
}

#[async_trait::async_trait]
impl UserRepo for MySqlUserRepo {
    async fn find_by_id(&self, user_id: UserId) -> Result<Option<UserRecord>, AuthError> {
        let row_opt: Option<MySqlRow> = self
            .bounded(
                sqlx::query(
                    r#"
SELECT user_id, email, password_hash, user_type, enabled, locked, created_at
FROM users
WHERE user_id = ?
"#,
                )
                .bind(user_id.0.as_bytes() as &[u8])
                .fetch_optional(&self.pool),
            )
            .await?;

        Ok(row_opt
            .map(Self::row_to_record)
            .transpose()?
            .map(|rec| rec.user))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<CredentialsRecord>, AuthError> {
        let row_opt: Option<MySqlRow> = self
            .bounded(
                sqlx::query(
                    r#"
SELECT user_id, email, password_hash, user_type, enabled, locked, created_at
FROM users
WHERE email = ?
"#,
                )
                .bind(email)
                .fetch_optional(&self.pool),
            )
            .await?;

        row_opt.map(Self::row_to_record).transpose()
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AuthError> {
        let count: i64 = self
            .bounded(
                sqlx::query_scalar(r#"SELECT COUNT(*) FROM users WHERE email = ?"#)
                    .bind(email)
                    .fetch_one(&self.pool),
            )
            .await?;

        Ok(count > 0)
    }

    async fn create(&self, user: NewUser) -> Result<UserRecord, AuthError> {
        let created_at = Utc::now();
        let result = tokio::time::timeout(
            self.query_timeout,
            sqlx::query(
                r#"
INSERT INTO users (user_id, email, password_hash, user_type, enabled, locked, created_at)
VALUES (?, ?, ?, ?, TRUE, FALSE, ?)
"#,
            )
            .bind(user.user_id.0.as_bytes() as &[u8])
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.user_type.as_str())
            .bind(created_at)
            .execute(&self.pool),
        )
        .await
        .map_err(|_| AuthError::UpstreamTimeout)?;

        match result {
            Ok(_) => Ok(UserRecord {
                user_id: user.user_id,
                email: user.email,
                user_type: user.user_type,
                enabled: true,
                locked: false,
                created_at,
            }),
            Err(e) if is_dup_key(&e) => Err(AuthError::DuplicateIdentity),
            Err(e) => Err(store_error(e)),
        }
    }
}
