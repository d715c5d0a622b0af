//! Authentication types shared by the client and its callers.
//!
//! This module provides:
//! - `Credentials`: an identifier/secret pair that never prints its secret
//! - `GarminTokens`: the OAuth1 + OAuth2 session and its serialized form
//! - `Authenticator`: the single login-and-dump operation

pub mod credentials;
pub mod token;

pub use credentials::Credentials;
pub use token::{GarminTokens, OAuth1Token, OAuth2Token};

/// Performs a login and returns the serialized session token.
///
/// Implementations make exactly one attempt; callers decide what to do
/// with a failure.
#[allow(async_fn_in_trait)]
pub trait Authenticator {
    async fn authenticate(&self, credentials: &Credentials) -> anyhow::Result<String>;
}
