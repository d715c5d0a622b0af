//! Interactive Garmin login that prints a reusable session token.
//!
//! The flow is prompt → authenticate → report. Authentication is a single
//! attempt; every failure is reported the same way and ends in exit code 1.

pub mod prompt;
pub mod report;

use std::io::Write;

use garmin_token_core::Authenticator;
use tracing::{info, warn};

pub use prompt::{CredentialSource, TerminalPrompt};
pub use report::{Outcome, Reporter};

/// Run one login and write the result to `out`.
pub async fn run<S, A, W>(source: &mut S, authenticator: &A, out: W) -> Outcome
where
    S: CredentialSource,
    A: Authenticator,
    W: Write,
{
    let mut reporter = Reporter::new(out);

    let credentials = match source.read_credentials() {
        Ok(credentials) => credentials,
        Err(e) => {
            warn!(error = %format_args!("{:#}", e), "Failed to read credentials");
            if let Err(e) = reporter.input_failure(format_args!("{:#}", e)) {
                warn!(error = %e, "Failed to write output");
            }
            return Outcome::Failure;
        }
    };

    if let Err(e) = reporter.start() {
        warn!(error = %e, "Failed to write output");
        return Outcome::Failure;
    }

    let written = match authenticator.authenticate(&credentials).await {
        Ok(token) => {
            info!("Authentication succeeded");
            reporter.success(&token).map(|()| Outcome::Success)
        }
        Err(e) => {
            warn!(error = %format_args!("{:#}", e), "Authentication failed");
            reporter
                .failure(format_args!("{:#}", e))
                .map(|()| Outcome::Failure)
        }
    };

    written.unwrap_or_else(|e| {
        warn!(error = %e, "Failed to write output");
        Outcome::Failure
    })
}
