// store

mod kv_store;
mod revocation_store;
mod session_store;

pub use kv_store::*;
pub use revocation_store::*;
pub use session_store::*;

// repo

mod credential_verifier;
mod user_repo;

pub use credential_verifier::*;
pub use user_repo::*;

mod clock;

pub use clock::*;
