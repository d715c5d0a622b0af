use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Unauthorized - credentials were rejected")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Failures in the SSO sign-in page flow.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum LoginError {
    #[error("CSRF token not found on sign-in page")]
    MissingCsrfToken,

    #[error("Page title not found in sign-in response")]
    MissingTitle,

    #[error("Two-factor authentication is required but not supported")]
    MfaRequired,

    #[error("Unexpected sign-in page title: {0}")]
    UnexpectedTitle(String),

    #[error("Service ticket not found in sign-in response")]
    MissingTicket,

    #[error("OAuth1 response is missing {0}")]
    MissingOAuthField(&'static str),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => {
                debug!(body = %truncated, "Unauthorized response body");
                ApiError::Unauthorized
            }
            403 => ApiError::AccessDenied(truncated),
            404 => ApiError::NotFound(truncated),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }
}
