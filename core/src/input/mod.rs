//! Request model produced by the item parser.
//!
//! A [`Request`] is built once per invocation from the positional arguments
//! and standard input, then handed to the builder in [`crate::exchange`].
//! Nothing mutates it after [`parse_args`] returns.

pub mod args;
pub mod stdin;

use std::fmt;

use url::Url;

pub use args::{parse_args, parse_url, split_item, ItemKind};
pub use stdin::Stdin;

/// Options that influence how items are interpreted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    /// Serialize data fields as a form instead of a JSON object.
    pub form: bool,
    /// Capture standard input as the raw request body.
    pub read_stdin: bool,
}

impl Options {
    pub fn preferred_body_kind(&self) -> BodyKind {
        if self.form {
            BodyKind::Form
        } else {
            BodyKind::Json
        }
    }
}

/// An uppercase HTTP method token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method(String);

impl Method {
    pub fn new(token: &str) -> Self {
        Self(token.to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single `name`/`value` item. When `is_file` is set, `value` is a path
/// whose contents are read by the builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub value: String,
    pub is_file: bool,
}

impl Field {
    pub fn inline(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            is_file: false,
        }
    }

    pub fn file(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: path.into(),
            is_file: true,
        }
    }
}

/// Body encoding requested for data fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Json,
    Form,
}

/// The request body. At most one encoding is active per request, so files
/// can only ride on a form body and raw JSON only on a JSON body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Body {
    #[default]
    Empty,
    Json {
        fields: Vec<Field>,
        /// Values are JSON text merged verbatim into the object.
        raw_json_fields: Vec<Field>,
    },
    Form {
        fields: Vec<Field>,
        /// Parts uploaded as multipart file parts.
        files: Vec<Field>,
    },
    Raw(Vec<u8>),
}

impl Body {
    pub fn empty_of(kind: BodyKind) -> Self {
        match kind {
            BodyKind::Json => Body::Json {
                fields: Vec::new(),
                raw_json_fields: Vec::new(),
            },
            BodyKind::Form => Body::Form {
                fields: Vec::new(),
                files: Vec::new(),
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Body::Empty)
    }

    pub fn kind(&self) -> Option<BodyKind> {
        match self {
            Body::Json { .. } => Some(BodyKind::Json),
            Body::Form { .. } => Some(BodyKind::Form),
            Body::Empty | Body::Raw(_) => None,
        }
    }
}

/// Parsed, canonical representation of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    /// Appended to the URL query string in order.
    pub parameters: Vec<Field>,
    pub headers: Vec<Field>,
    pub body: Body,
}
