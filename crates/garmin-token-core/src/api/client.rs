//! Garmin SSO and connect API client.
//!
//! This module provides the `GarminClient` struct, which performs the full
//! login handshake and produces a `GarminTokens` session.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::{header, Client};
use tracing::{debug, info, warn};

use crate::auth::token::OAuth2Response;
use crate::auth::{Authenticator, Credentials, GarminTokens, OAuth1Token, OAuth2Token};
use crate::config::Config;

use super::oauth::{OAuth1Signer, OAuthConsumer};
use super::{sso, ApiError, LoginError};

// ============================================================================
// Constants
// ============================================================================

/// Published consumer key/secret of the Garmin Connect mobile app
const DEFAULT_OAUTH_CONSUMER_URL: &str = "https://thegarth.s3.amazonaws.com/oauth_consumer.json";

/// User agent for the SSO pages
const SSO_USER_AGENT: &str = "GCM-iOS-5.7.2.1";

/// User agent the OAuth endpoints expect
const MOBILE_USER_AGENT: &str = "com.garmin.android.apps.connectmobile";

/// Title of the SSO page shown after a successful sign-in
const SUCCESS_TITLE: &str = "Success";

/// Base URLs used during login.
#[derive(Debug, Clone)]
pub struct Endpoints {
    /// SSO root, e.g. `https://sso.garmin.com/sso`
    pub sso: String,
    /// Connect API root, e.g. `https://connectapi.garmin.com`
    pub connect_api: String,
    pub oauth_consumer: String,
}

impl Endpoints {
    pub fn for_domain(domain: &str) -> Self {
        Self {
            sso: format!("https://sso.{}/sso", domain),
            connect_api: format!("https://connectapi.{}", domain),
            oauth_consumer: DEFAULT_OAUTH_CONSUMER_URL.to_string(),
        }
    }

    fn embed(&self) -> String {
        format!("{}/embed", self.sso)
    }

    fn signin(&self) -> String {
        format!("{}/signin", self.sso)
    }

    fn oauth_service(&self) -> String {
        format!("{}/oauth-service/oauth", self.connect_api)
    }
}

/// Client for the Garmin login handshake.
/// Clone is cheap - reqwest::Client uses Arc internally, cookies included.
#[derive(Clone)]
pub struct GarminClient {
    client: Client,
    endpoints: Endpoints,
    domain: String,
}

impl GarminClient {
    /// Create a client for the configured domain
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_endpoints(config.domain(), config.endpoints(), config.request_timeout())
    }

    pub fn with_endpoints(domain: &str, endpoints: Endpoints, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .user_agent(SSO_USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoints,
            domain: domain.to_string(),
        })
    }

    /// Sign in and obtain OAuth1 and OAuth2 tokens.
    pub async fn login(&self, credentials: &Credentials) -> Result<GarminTokens> {
        info!(domain = %self.domain, "Signing in to Garmin SSO");

        let ticket = self
            .sign_in(credentials)
            .await
            .context("Failed to sign in to Garmin SSO")?;
        let consumer = self.fetch_consumer().await?;

        let oauth1 = self
            .fetch_oauth1_token(&consumer, &ticket)
            .await
            .context("Failed to fetch OAuth1 token")?;
        let oauth2 = self
            .exchange_oauth2_token(&consumer, &oauth1)
            .await
            .context("Failed to exchange OAuth1 token for OAuth2 token")?;

        info!(scope = %oauth2.scope, expires_at = oauth2.expires_at, "Obtained Garmin tokens");
        Ok(GarminTokens { oauth1, oauth2 })
    }

    fn embed_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("id", "gauth-widget".to_string()),
            ("embedWidget", "true".to_string()),
            ("gauthHost", self.endpoints.sso.clone()),
        ]
    }

    fn signin_params(&self) -> Vec<(&'static str, String)> {
        let embed = self.endpoints.embed();
        vec![
            ("id", "gauth-widget".to_string()),
            ("embedWidget", "true".to_string()),
            ("gauthHost", embed.clone()),
            ("service", embed.clone()),
            ("source", embed.clone()),
            ("redirectAfterAccountLoginUrl", embed.clone()),
            ("redirectAfterAccountCreationUrl", embed),
        ]
    }

    /// Walk the SSO pages and return the service ticket
    async fn sign_in(&self, credentials: &Credentials) -> Result<String> {
        let embed_url = self.endpoints.embed();
        let signin_url = self.endpoints.signin();

        debug!(url = %embed_url, "Loading SSO embed page");
        let response = self
            .client
            .get(&embed_url)
            .query(&self.embed_params())
            .send()
            .await
            .context("Failed to load SSO embed page")?;
        Self::check_response(response).await?;

        debug!(url = %signin_url, "Loading SSO sign-in form");
        let params = self.signin_params();
        let response = self
            .client
            .get(&signin_url)
            .query(&params)
            .header(header::REFERER, embed_url.as_str())
            .send()
            .await
            .context("Failed to load SSO sign-in page")?;
        let html = Self::check_response(response)
            .await?
            .text()
            .await
            .context("Failed to read SSO sign-in page")?;
        let csrf = sso::csrf_token(&html).ok_or(LoginError::MissingCsrfToken)?;

        debug!("Submitting SSO credentials");
        let response = self
            .client
            .post(&signin_url)
            .query(&params)
            .header(header::REFERER, signin_url.as_str())
            .form(&[
                ("username", credentials.identifier()),
                ("password", credentials.secret()),
                ("embed", "true"),
                ("_csrf", csrf),
            ])
            .send()
            .await
            .context("Failed to submit SSO credentials")?;
        let html = Self::check_response(response)
            .await?
            .text()
            .await
            .context("Failed to read SSO sign-in response")?;

        let title = sso::title(&html).ok_or(LoginError::MissingTitle)?;
        if sso::is_mfa_challenge(title) {
            warn!(title = %title, "SSO asked for a two-factor code");
            return Err(LoginError::MfaRequired.into());
        }
        if title != SUCCESS_TITLE {
            warn!(title = %title, "Unexpected SSO page after sign-in");
            return Err(LoginError::UnexpectedTitle(title.to_string()).into());
        }

        let ticket = sso::ticket(&html).ok_or(LoginError::MissingTicket)?;
        debug!("Received SSO service ticket");
        Ok(ticket.to_string())
    }

    async fn fetch_consumer(&self) -> Result<OAuthConsumer> {
        debug!(url = %self.endpoints.oauth_consumer, "Fetching OAuth consumer");
        let response = self
            .client
            .get(&self.endpoints.oauth_consumer)
            .send()
            .await
            .context("Failed to fetch OAuth consumer")?;
        Self::check_response(response)
            .await?
            .json()
            .await
            .context("Failed to parse OAuth consumer")
    }

    async fn fetch_oauth1_token(&self, consumer: &OAuthConsumer, ticket: &str) -> Result<OAuth1Token> {
        let url = format!("{}/preauthorized", self.endpoints.oauth_service());
        let login_url = self.endpoints.embed();
        let query = [
            ("ticket", ticket),
            ("login-url", login_url.as_str()),
            ("accepts-mfa-tokens", "true"),
        ];
        let authorization = OAuth1Signer::new(consumer).authorization("GET", &url, &query);

        let response = self
            .client
            .get(&url)
            .query(&query)
            .header(header::AUTHORIZATION, authorization)
            .header(header::USER_AGENT, MOBILE_USER_AGENT)
            .send()
            .await
            .context("Failed to send OAuth1 request")?;
        let body = Self::check_response(response)
            .await?
            .text()
            .await
            .context("Failed to read OAuth1 response")?;

        Ok(parse_oauth1_response(&body, &self.domain)?)
    }

    async fn exchange_oauth2_token(&self, consumer: &OAuthConsumer, oauth1: &OAuth1Token) -> Result<OAuth2Token> {
        let url = format!("{}/exchange/user/2.0", self.endpoints.oauth_service());
        let form: Vec<(&str, &str)> = oauth1
            .mfa_token
            .as_deref()
            .map(|mfa_token| vec![("mfa_token", mfa_token)])
            .unwrap_or_default();
        let authorization = OAuth1Signer::new(consumer)
            .with_token(&oauth1.oauth_token, &oauth1.oauth_token_secret)
            .authorization("POST", &url, &form);

        let issued_at = Utc::now();
        let response = self
            .client
            .post(&url)
            .header(header::AUTHORIZATION, authorization)
            .header(header::USER_AGENT, MOBILE_USER_AGENT)
            .form(&form)
            .send()
            .await
            .context("Failed to send OAuth2 exchange request")?;
        let body: OAuth2Response = Self::check_response(response)
            .await?
            .json()
            .await
            .context("Failed to parse OAuth2 exchange response")?;

        Ok(OAuth2Token::from_response(body, issued_at))
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }
}

impl Authenticator for GarminClient {
    async fn authenticate(&self, credentials: &Credentials) -> Result<String> {
        let tokens = self.login(credentials).await?;
        tokens.dumps()
    }
}

/// Parse the form-encoded body of the preauthorized endpoint.
fn parse_oauth1_response(body: &str, domain: &str) -> Result<OAuth1Token, LoginError> {
    let mut oauth_token = None;
    let mut oauth_token_secret = None;
    let mut mfa_token = None;
    let mut mfa_expiration_timestamp = None;

    for (key, value) in url::form_urlencoded::parse(body.trim().as_bytes()) {
        let value = Some(value.into_owned());
        match key.as_ref() {
            "oauth_token" => oauth_token = value,
            "oauth_token_secret" => oauth_token_secret = value,
            "mfa_token" => mfa_token = value,
            "mfa_expiration_timestamp" => mfa_expiration_timestamp = value,
            _ => {}
        }
    }

    Ok(OAuth1Token {
        oauth_token: oauth_token.ok_or(LoginError::MissingOAuthField("oauth_token"))?,
        oauth_token_secret: oauth_token_secret
            .ok_or(LoginError::MissingOAuthField("oauth_token_secret"))?,
        mfa_token,
        mfa_expiration_timestamp,
        domain: Some(domain.to_string()),
    })
}
