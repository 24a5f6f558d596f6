mod authenticator;
mod credential_hasher;
mod session_manager;
mod token_codec;

pub use authenticator::*;
pub use credential_hasher::*;
pub use session_manager::*;
pub use token_codec::*;
