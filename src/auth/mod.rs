//! Authentication module
//!
//! Supports: pre-issued bearer token / API key, and username+password login
//!
//! The `Authenticator` applies the bearer credential to every request and
//! caches the session token obtained from `/login`.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::{CachedToken, Credentials};

pub(crate) use authenticator::join_path;
