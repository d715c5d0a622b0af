//! Terminal credential prompts.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use garmin_token_core::Credentials;

const EMAIL_PROMPT: &str = "Enter your Garmin email address: ";
const PASSWORD_PROMPT: &str = "Enter your Garmin password: ";

/// Where the login credentials come from.
pub trait CredentialSource {
    fn read_credentials(&mut self) -> Result<Credentials>;
}

/// Reads the email from stdin and the password without echo.
pub struct TerminalPrompt;

impl CredentialSource for TerminalPrompt {
    fn read_credentials(&mut self) -> Result<Credentials> {
        print!("{}", EMAIL_PROMPT);
        io::stdout().flush()?;
        let identifier = read_line_trimmed(&mut io::stdin().lock())
            .context("Failed to read email address")?;

        let secret = rpassword::prompt_password(PASSWORD_PROMPT)
            .context("Failed to read password")?;

        Ok(Credentials::new(identifier, secret))
    }
}

/// Read one line, dropping the line terminator. EOF is an error.
fn read_line_trimmed<R: BufRead>(reader: &mut R) -> io::Result<String> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
    }
    let trimmed = line.trim_end_matches(['\r', '\n']);
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_line_trimmed() {
        let mut input = Cursor::new("user@example.com\r\nrest");
        assert_eq!(read_line_trimmed(&mut input).unwrap(), "user@example.com");
        assert_eq!(read_line_trimmed(&mut input).unwrap(), "rest");
    }

    #[test]
    fn test_read_line_eof() {
        let mut input = Cursor::new("");
        let err = read_line_trimmed(&mut input).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
