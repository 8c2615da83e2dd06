use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{Error, Result};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport-level settings. The builder only reads `auth`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// `None` disables the timeout entirely.
    pub timeout: Option<Duration>,
    pub follow_redirects: bool,
    pub skip_verify: bool,
    pub force_http1: bool,
    pub auth: Option<Auth>,
    pub check_status: bool,
    /// Build and print the request without sending it.
    pub offline: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            timeout: Some(DEFAULT_TIMEOUT),
            follow_redirects: false,
            skip_verify: false,
            force_http1: false,
            auth: None,
            check_status: false,
            offline: false,
        }
    }
}

/// Basic authentication credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Auth {
    pub username: String,
    pub password: String,
}

impl Auth {
    /// Parses `user:password`. The password may itself contain colons.
    pub fn parse(s: &str) -> Result<Self> {
        match s.split_once(':') {
            Some((username, password)) => Ok(Self {
                username: username.to_string(),
                password: password.to_string(),
            }),
            None => Err(Error::usage(format!(
                "--auth expects 'user:password', got '{s}' (password prompting is not supported)"
            ))),
        }
    }

    pub fn header_value(&self) -> String {
        let credentials = format!("{}:{}", self.username, self.password);
        format!("Basic {}", STANDARD.encode(credentials))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_auth() {
        let auth = Auth::parse("alice:open sesame").unwrap();
        assert_eq!(auth.username, "alice");
        assert_eq!(auth.password, "open sesame");
        assert_eq!(auth.header_value(), "Basic YWxpY2U6b3BlbiBzZXNhbWU=");
    }

    #[test]
    fn test_parse_auth_keeps_colons_in_password() {
        let auth = Auth::parse("bob:a:b").unwrap();
        assert_eq!(auth.password, "a:b");
    }

    #[test]
    fn test_parse_auth_without_password() {
        assert!(Auth::parse("alice").unwrap_err().is_usage());
    }

    #[test]
    fn test_default_timeout() {
        assert_eq!(Options::default().timeout, Some(Duration::from_secs(30)));
    }
}
