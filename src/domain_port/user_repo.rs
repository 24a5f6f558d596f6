use crate::application_port::*;
use crate::domain_model::*;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub user_id: UserId,
    pub email: String,
    pub user_type: UserType,
    pub enabled: bool,
    pub locked: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CredentialsRecord {
    pub user: UserRecord,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_id: UserId,
    pub email: String,
    pub password_hash: String,
    pub user_type: UserType,
}

#[async_trait::async_trait]
pub trait UserRepo: Send + Sync {
    async fn find_by_id(&self, user_id: UserId) -> Result<Option<UserRecord>, AuthError>;

    /// Fetch the record and password hash (for login).
    async fn find_by_email(&self, email: &str) -> Result<Option<CredentialsRecord>, AuthError>;

    async fn email_exists(&self, email: &str) -> Result<bool, AuthError>;

    /// Fails with `DuplicateIdentity` if the email is already taken.
    async fn create(&self, user: NewUser) -> Result<UserRecord, AuthError>;
}
