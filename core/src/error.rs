//! Error types for request parsing, building and exchange.
//!
//! Two kinds reach the user: `Usage` errors come from malformed command-line
//! input and are shown together with the usage text; every other variant is
//! an operational failure reported with its context only.

use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// Malformed CLI-level input: missing URL, bad item syntax, invalid header
    /// name, invalid JSON literal, conflicting body items, stdin reuse.
    Usage(String),

    /// A file or stream could not be read or written.
    Io {
        context: String,
        source: std::io::Error,
    },

    /// A JSON value could not be parsed or serialized.
    Json {
        context: String,
        source: serde_json::Error,
    },

    /// The transport failed to deliver the request or read the response.
    Http {
        context: String,
        source: reqwest::Error,
    },

    /// A built value is not representable on the wire.
    Invalid(String),
}

impl Error {
    pub fn usage(message: impl Into<String>) -> Self {
        Error::Usage(message.into())
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            context: context.into(),
            source,
        }
    }

    pub fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Error::Json {
            context: context.into(),
            source,
        }
    }

    pub fn http(context: impl Into<String>, source: reqwest::Error) -> Self {
        Error::Http {
            context: context.into(),
            source,
        }
    }

    /// Whether the surrounding CLI should print its usage text.
    pub fn is_usage(&self) -> bool {
        matches!(self, Error::Usage(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Usage(msg) => write!(f, "{msg}"),
            Error::Io { context, source } => write!(f, "{context}: {source}"),
            Error::Json { context, source } => write!(f, "{context}: {source}"),
            Error::Http { context, source } => write!(f, "{context}: {source}"),
            Error::Invalid(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io { source, .. } => Some(source),
            Error::Json { source, .. } => Some(source),
            Error::Http { source, .. } => Some(source),
            Error::Usage(_) | Error::Invalid(_) => None,
        }
    }
}
