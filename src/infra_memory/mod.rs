//! Process-local adapters for tests and single-node development.

mod kv_store_memory;
mod user_repo_memory;

pub use kv_store_memory::*;
pub use user_repo_memory::*;
