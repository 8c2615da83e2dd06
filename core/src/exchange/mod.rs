//! Turns a parsed [`Request`] into a wire-level [`WireRequest`] and sends it.
//!
//! Building is all-or-nothing: the first failing file read or JSON encode
//! aborts the build and nothing partial is returned.

pub mod body;
pub mod client;
pub mod multipart;
pub mod options;

use std::fs;

use url::Url;

pub use client::{HttpClient, Response, Transport};
pub use options::{Auth, Options};

use crate::error::{Error, Result};
use crate::input::{Field, Request};
use crate::version::USER_AGENT;

/// Header fields in insertion order. Names compare case-insensitively and
/// may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// First value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    #[cfg(test)]
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for Headers {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A request ready to hand to a [`Transport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireRequest {
    pub method: String,
    pub url: Url,
    pub headers: Headers,
    pub body: Option<Vec<u8>>,
    pub content_type: Option<String>,
}

impl WireRequest {
    pub fn content_length(&self) -> usize {
        self.body.as_ref().map_or(0, Vec::len)
    }

    /// `path?query`, as written on the request line.
    pub fn request_target(&self) -> String {
        match self.url.query() {
            Some(query) => format!("{}?{}", self.url.path(), query),
            None => self.url.path().to_string(),
        }
    }

    /// The `Host` header, or the URL authority when the user did not set one.
    pub fn host(&self) -> String {
        if let Some(host) = self.headers.get("Host") {
            return host.to_string();
        }
        let host = self.url.host_str().unwrap_or_default();
        match self.url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        }
    }
}

/// Builds the wire request: merged query string, headers, encoded body and
/// defaulted `Content-Type`, `User-Agent` and `Authorization`.
pub fn build_request(request: &Request, options: &Options) -> Result<WireRequest> {
    let url = build_url(request)?;
    let mut headers = build_headers(request)?;
    let encoded = body::build_body(&request.body)?;

    if let Some(content_type) = &encoded.content_type {
        if !headers.contains("Content-Type") {
            headers.add("Content-Type", content_type.clone());
        }
    }
    if !headers.contains("User-Agent") {
        headers.add("User-Agent", USER_AGENT);
    }
    if let Some(auth) = &options.auth {
        if !headers.contains("Authorization") {
            headers.add("Authorization", auth.header_value());
        }
    }

    log::debug!(
        "built request: {} {} ({} header(s), content type {:?})",
        request.method,
        url,
        headers.len(),
        encoded.content_type
    );

    Ok(WireRequest {
        method: request.method.to_string(),
        url,
        headers,
        body: encoded.body,
        content_type: encoded.content_type,
    })
}

/// Appends command-line parameters after any query already in the URL.
fn build_url(request: &Request) -> Result<Url> {
    let mut url = request.url.clone();
    let mut pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    for field in &request.parameters {
        pairs.push((field.name.clone(), resolve_field_value(field)?));
    }

    if pairs.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(&pairs);
    }
    Ok(url)
}

fn build_headers(request: &Request) -> Result<Headers> {
    let mut headers = Headers::new();
    for field in &request.headers {
        headers.add(field.name.clone(), resolve_field_value(field)?);
    }
    Ok(headers)
}

/// Inline values are used as-is; file-backed values are read in full.
pub(crate) fn resolve_field_value(field: &Field) -> Result<String> {
    if !field.is_file {
        return Ok(field.value.clone());
    }
    fs::read_to_string(&field.value)
        .map_err(|e| Error::io(format!("reading field value of '{}'", field.name), e))
}
