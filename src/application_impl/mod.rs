mod authenticator_impl;
mod credential_hasher_argon2;
mod credential_verifier_password;
mod session_manager_impl;
mod token_codec_jwt;

pub use authenticator_impl::*;
pub use credential_hasher_argon2::*;
pub use credential_verifier_password::*;
pub use session_manager_impl::*;
pub use token_codec_jwt::*;
