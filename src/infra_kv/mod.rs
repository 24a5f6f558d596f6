//! Session and revocation stores laid out over any `KvStore`.

mod revocation_store_kv;
mod session_store_kv;

pub use revocation_store_kv::*;
pub use session_store_kv::*;
