use crate::domain_model::{UserId, UserType};
use serde::Serialize;

/// A caller whose access token was verified and whose account still exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub user_id: UserId,
    pub email: String,
    pub user_type: UserType,
}

/// Identity resolved for one inbound request.
///
/// Authorization is left to downstream handlers; `Anonymous` only means no
/// bearer token was supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "principal", rename_all = "lowercase")]
pub enum CallerIdentity {
    Anonymous,
    Authenticated(Principal),
}

impl CallerIdentity {
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            CallerIdentity::Anonymous => None,
            CallerIdentity::Authenticated(p) => Some(p),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, CallerIdentity::Anonymous)
    }
}
