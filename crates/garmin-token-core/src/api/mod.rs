//! HTTP client module for Garmin Connect authentication.
//!
//! This module provides the `GarminClient`, which walks the Garmin SSO
//! sign-in pages, exchanges the resulting service ticket for an OAuth1
//! token, and trades that for an OAuth2 access token.
//!
//! Requests against the connect API are signed with OAuth 1.0a HMAC-SHA1
//! using the shared mobile-app consumer credentials.

pub mod client;
pub mod error;
pub mod oauth;
pub mod sso;

pub use client::{Endpoints, GarminClient};
pub use error::{ApiError, LoginError};
pub use oauth::{OAuth1Signer, OAuthConsumer};
