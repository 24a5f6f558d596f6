use crate::application_port::AuthError;
use sqlx::mysql::MySqlDatabaseError;

pub fn is_dup_key(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db) = err {
        if let Some(mysql_err) = db.try_downcast_ref::<MySqlDatabaseError>() {
            return mysql_err.number() == 1062; // ER_DUP_ENTRY
        }
    }

    false
}

/// Pool exhaustion and connect timeouts fail closed as `UpstreamTimeout`.
pub fn store_error(err: sqlx::Error) -> AuthError {
    match err {
        sqlx::Error::PoolTimedOut => AuthError::UpstreamTimeout,
        sqlx::Error::Io(ref io) if io.kind() == std::io::ErrorKind::TimedOut => {
            AuthError::UpstreamTimeout
        }
        e => AuthError::Store(e.to_string()),
    }
}
