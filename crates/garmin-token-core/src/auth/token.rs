//! Garmin session tokens and their `GARMIN_SECRET_STRING` serialization.
//!
//! The serialized form is standard base64 over a JSON array holding the
//! OAuth1 token followed by the OAuth2 token.

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OAuth1Token {
    pub oauth_token: String,
    pub oauth_token_secret: String,
    #[serde(default)]
    pub mfa_token: Option<String>,
    #[serde(default)]
    pub mfa_expiration_timestamp: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
}

/// Body of the OAuth2 exchange response, before expiry stamping.
#[derive(Debug, Deserialize)]
pub(crate) struct OAuth2Response {
    pub scope: String,
    pub jti: String,
    pub token_type: String,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub refresh_token_expires_in: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OAuth2Token {
    pub scope: String,
    pub jti: String,
    pub token_type: String,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    /// Unix seconds
    pub expires_at: i64,
    pub refresh_token_expires_in: i64,
    /// Unix seconds
    pub refresh_token_expires_at: i64,
}

impl OAuth2Token {
    pub(crate) fn from_response(response: OAuth2Response, issued_at: DateTime<Utc>) -> Self {
        let now = issued_at.timestamp();
        Self {
            expires_at: now + response.expires_in,
            refresh_token_expires_at: now + response.refresh_token_expires_in,
            scope: response.scope,
            jti: response.jti,
            token_type: response.token_type,
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expires_in: response.expires_in,
            refresh_token_expires_in: response.refresh_token_expires_in,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.expires_at
    }

    pub fn refresh_expired(&self) -> bool {
        Utc::now().timestamp() > self.refresh_token_expires_at
    }
}

/// A complete Garmin Connect session.
#[derive(Debug, Clone, PartialEq)]
pub struct GarminTokens {
    pub oauth1: OAuth1Token,
    pub oauth2: OAuth2Token,
}

impl GarminTokens {
    /// Serialize to the base64 secret string.
    pub fn dumps(&self) -> Result<String> {
        let json = serde_json::to_string(&(&self.oauth1, &self.oauth2))
            .context("Failed to serialize tokens")?;
        Ok(STANDARD.encode(json))
    }

    /// Parse a secret string produced by `dumps`.
    pub fn loads(secret: &str) -> Result<Self> {
        let bytes = STANDARD
            .decode(secret.trim())
            .context("Secret string is not valid base64")?;
        let (oauth1, oauth2): (OAuth1Token, OAuth2Token) =
            serde_json::from_slice(&bytes).context("Secret string does not hold a token pair")?;
        Ok(Self { oauth1, oauth2 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_response() -> OAuth2Response {
        OAuth2Response {
            scope: "CONNECT_READ CONNECT_WRITE".to_string(),
            jti: "jti-1".to_string(),
            token_type: "Bearer".to_string(),
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            expires_in: 3600,
            refresh_token_expires_in: 7200,
        }
    }

    fn sample_tokens() -> GarminTokens {
        let issued_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        GarminTokens {
            oauth1: OAuth1Token {
                oauth_token: "token".to_string(),
                oauth_token_secret: "secret".to_string(),
                mfa_token: None,
                mfa_expiration_timestamp: None,
                domain: Some("garmin.com".to_string()),
            },
            oauth2: OAuth2Token::from_response(sample_response(), issued_at),
        }
    }

    #[test]
    fn test_expiry_stamping() {
        let tokens = sample_tokens();
        assert_eq!(tokens.oauth2.expires_at, 1_704_067_200 + 3600);
        assert_eq!(tokens.oauth2.refresh_token_expires_at, 1_704_067_200 + 7200);
        assert!(tokens.oauth2.is_expired());
        assert!(tokens.oauth2.refresh_expired());
    }

    #[test]
    fn test_fresh_token_not_expired() {
        let token = OAuth2Token::from_response(sample_response(), Utc::now());
        assert!(!token.is_expired());
        assert!(!token.refresh_expired());
    }

    #[test]
    fn test_dumps_is_base64_json_pair() {
        let secret = sample_tokens().dumps().unwrap();
        let json: serde_json::Value =
            serde_json::from_slice(&STANDARD.decode(&secret).unwrap()).unwrap();

        let pair = json.as_array().expect("top level is an array");
        assert_eq!(pair.len(), 2);
        assert_eq!(pair[0]["oauth_token"], "token");
        assert_eq!(pair[0]["mfa_token"], serde_json::Value::Null);
        assert_eq!(pair[1]["access_token"], "access");
        assert_eq!(pair[1]["expires_at"], 1_704_067_200 + 3600);

        assert_eq!(GarminTokens::loads(&secret).unwrap(), sample_tokens());
    }

    #[test]
    fn test_loads_rejects_garbage() {
        assert!(GarminTokens::loads("not base64!").is_err());
        let not_a_pair = STANDARD.encode(r#"{"oauth_token": "x"}"#);
        assert!(GarminTokens::loads(&not_a_pair).is_err());
    }
}
