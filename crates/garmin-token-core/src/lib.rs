//! Core library for garmin-token.
//!
//! Provides the Garmin Connect SSO client, OAuth1 request signing, and the
//! serialized session token format consumed as `GARMIN_SECRET_STRING`.

pub mod api;
pub mod auth;
pub mod config;

pub use api::{ApiError, Endpoints, GarminClient, LoginError};
pub use auth::{Authenticator, Credentials, GarminTokens, OAuth1Token, OAuth2Token};
pub use config::Config;
