//! Human-readable result output.

use std::fmt;
use std::io::{self, Write};
use std::process::ExitCode;

const RULE_WIDTH: usize = 60;

const FAILURE_HINTS: &[&str] = &[
    "Incorrect email or password",
    "Two-factor authentication enabled (not supported yet)",
    "Network connection issues",
];

/// Name of the secret the token is meant to be stored under
pub const SECRET_NAME: &str = "GARMIN_SECRET_STRING";

/// Terminal state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    pub fn exit_code(self) -> u8 {
        match self {
            Outcome::Success => 0,
            Outcome::Failure => 1,
        }
    }
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        ExitCode::from(outcome.exit_code())
    }
}

pub struct Reporter<W: Write> {
    out: W,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    fn rule(&mut self) -> io::Result<()> {
        writeln!(self.out, "{}", "=".repeat(RULE_WIDTH))
    }

    /// Banner printed once the credentials are in hand
    pub fn start(&mut self) -> io::Result<()> {
        writeln!(self.out)?;
        self.rule()?;
        writeln!(self.out, "Garmin Authentication Token Generator")?;
        self.rule()?;
        writeln!(self.out)?;
        writeln!(self.out, "Authenticating with Garmin...")?;
        self.out.flush()
    }

    pub fn success(&mut self, token: &str) -> io::Result<()> {
        writeln!(self.out, "✓ Successfully authenticated with Garmin")?;
        writeln!(self.out)?;
        self.rule()?;
        writeln!(self.out, "Your Garmin Secret String:")?;
        self.rule()?;
        writeln!(self.out, "{}", token)?;
        self.rule()?;
        writeln!(self.out)?;
        writeln!(self.out, "Add this to your GitHub Secrets as {}", SECRET_NAME)?;
        writeln!(self.out)?;
        self.out.flush()
    }

    /// Error message followed by the static list of likely causes.
    pub fn failure(&mut self, error: impl fmt::Display) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "✗ Authentication failed: {}", error)?;
        writeln!(self.out)?;
        writeln!(self.out, "Possible reasons:")?;
        for (i, hint) in FAILURE_HINTS.iter().enumerate() {
            writeln!(self.out, "{}. {}", i + 1, hint)?;
        }
        self.out.flush()
    }

    /// Failure that happened before authentication was attempted
    pub fn input_failure(&mut self, error: impl fmt::Display) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "✗ Could not read credentials: {}", error)?;
        self.out.flush()
    }
}
