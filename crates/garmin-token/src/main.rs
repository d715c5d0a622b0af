//! garmin-token - log in to Garmin Connect and print a session token.
//!
//! The printed token is meant to be stored as the `GARMIN_SECRET_STRING`
//! secret of automation that talks to Garmin Connect.

use std::io;
use std::process::ExitCode;

use garmin_token::{run, Outcome, TerminalPrompt};
use garmin_token_core::{Config, GarminClient};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    info!("garmin-token starting");

    let client = match Config::load().and_then(|config| GarminClient::new(&config)) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to initialize");
            eprintln!("Error: {:#}", e);
            return Outcome::Failure.into();
        }
    };

    let outcome = run(&mut TerminalPrompt, &client, io::stdout().lock()).await;
    outcome.into()
}
