//! `multipart/form-data` encoding.
//!
//! Parts are written into an in-memory buffer in the order they are added.
//! Names and filenames that cannot travel as a quoted string use the RFC 5987
//! extended form `name*=utf-8''...`.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// RFC 5987 `attr-char`: everything else is percent-encoded.
const ATTR_CHAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

pub struct MultipartWriter {
    boundary: String,
    buffer: Vec<u8>,
}

impl MultipartWriter {
    pub fn new() -> Self {
        Self::with_boundary(random_boundary())
    }

    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            buffer: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn write_part(&mut self, content_disposition: &str, content: &[u8]) {
        if !self.buffer.is_empty() {
            self.buffer.extend_from_slice(b"\r\n");
        }
        self.buffer.extend_from_slice(b"--");
        self.buffer.extend_from_slice(self.boundary.as_bytes());
        self.buffer.extend_from_slice(b"\r\nContent-Disposition: ");
        self.buffer.extend_from_slice(content_disposition.as_bytes());
        self.buffer.extend_from_slice(b"\r\n\r\n");
        self.buffer.extend_from_slice(content);
    }

    /// Writes the closing delimiter and returns the encoded body.
    pub fn finish(mut self) -> Vec<u8> {
        if !self.buffer.is_empty() {
            self.buffer.extend_from_slice(b"\r\n");
        }
        self.buffer.extend_from_slice(b"--");
        self.buffer.extend_from_slice(self.boundary.as_bytes());
        self.buffer.extend_from_slice(b"--\r\n");
        self.buffer
    }
}

impl Default for MultipartWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// 30 random bytes, hex encoded.
fn random_boundary() -> String {
    let bytes: [u8; 30] = rand::random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Builds `form-data; name="..."[; filename="..."]`.
pub fn content_disposition(name: &str, filename: Option<&str>) -> String {
    let mut value = String::from("form-data");
    if !name.is_empty() {
        value.push_str(&disposition_param("name", name));
    }
    if let Some(filename) = filename.filter(|f| !f.is_empty()) {
        value.push_str(&disposition_param("filename", filename));
    }
    value
}

fn disposition_param(key: &str, value: &str) -> String {
    if needs_escape(value) {
        format!("; {key}*=utf-8''{}", utf8_percent_encode(value, ATTR_CHAR))
    } else {
        format!("; {key}=\"{value}\"")
    }
}

/// Non-ASCII, control characters other than tab, quotes and backslashes
/// cannot appear inside a quoted parameter.
fn needs_escape(s: &str) -> bool {
    s.chars().any(|c| {
        !c.is_ascii() || (c.is_ascii_control() && c != '\t') || c == '"' || c == '\\'
    })
}
