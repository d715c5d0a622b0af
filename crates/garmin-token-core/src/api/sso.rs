//! Extraction helpers for the Garmin SSO HTML pages.

use std::sync::OnceLock;

use regex::Regex;

static CSRF_RE: OnceLock<Regex> = OnceLock::new();
static TITLE_RE: OnceLock<Regex> = OnceLock::new();
static TICKET_RE: OnceLock<Regex> = OnceLock::new();

fn capture<'a>(re: &'static OnceLock<Regex>, pattern: &str, html: &'a str) -> Option<&'a str> {
    let re = re.get_or_init(|| Regex::new(pattern).expect("static regex is valid"));
    re.captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Find the `_csrf` hidden input value on the sign-in form.
pub fn csrf_token(html: &str) -> Option<&str> {
    capture(&CSRF_RE, r#"name="_csrf"\s+value="(.+?)""#, html)
}

/// Find the `<title>` of a page.
pub fn title(html: &str) -> Option<&str> {
    capture(&TITLE_RE, r"<title>(.+?)</title>", html)
}

/// Find the service ticket on the post-login success page.
pub fn ticket(html: &str) -> Option<&str> {
    capture(&TICKET_RE, r#"embed\?ticket=([^"]+)""#, html)
}

/// Whether a sign-in response title is a two-factor challenge.
pub fn is_mfa_challenge(title: &str) -> bool {
    title.contains("MFA")
}
