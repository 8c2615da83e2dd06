use reqwest::blocking::{Client, ClientBuilder};
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::Method;

use super::{Headers, Options, WireRequest};
use crate::error::{Error, Result};

/// Anything that can deliver a [`WireRequest`] and return the full response.
pub trait Transport {
    fn send(&self, request: &WireRequest) -> Result<Response>;
}

/// A fully buffered response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// e.g. `HTTP/1.1`
    pub version: String,
    pub status: u16,
    pub reason: String,
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl Response {
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("Content-Type")
    }

    pub fn content_length(&self) -> Option<u64> {
        self.headers
            .get("Content-Length")
            .and_then(|v| v.trim().parse().ok())
    }
}

/// Blocking transport backed by reqwest.
pub struct HttpClient {
    inner: Client,
}

impl HttpClient {
    pub fn new(options: &Options) -> Result<Self> {
        let redirect = if options.follow_redirects {
            Policy::default()
        } else {
            Policy::none()
        };

        let mut builder = ClientBuilder::new()
            .timeout(options.timeout)
            .redirect(redirect)
            .danger_accept_invalid_certs(options.skip_verify);
        if options.force_http1 {
            builder = builder.http1_only();
        }

        let inner = builder
            .build()
            .map_err(|e| Error::http("building HTTP client", e))?;
        Ok(Self { inner })
    }
}

impl Transport for HttpClient {
    fn send(&self, request: &WireRequest) -> Result<Response> {
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|_| Error::Invalid(format!("invalid method: {}", request.method)))?;

        let mut builder = self.inner.request(method, request.url.clone());
        for (name, value) in request.headers.iter() {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| Error::Invalid(format!("invalid header field name: {name}")))?;
            let header_value = HeaderValue::from_str(value).map_err(|_| {
                Error::Invalid(format!("invalid value for header '{name}': {value:?}"))
            })?;
            builder = builder.header(header_name, header_value);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        log::info!("sending {} {}", request.method, request.url);
        let resp = builder
            .send()
            .map_err(|e| Error::http("sending HTTP request", e))?;

        let status = resp.status();
        let version = format!("{:?}", resp.version());
        let headers: Headers = resp
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), String::from_utf8_lossy(v.as_bytes()).into_owned()))
            .collect();
        let body = resp
            .bytes()
            .map_err(|e| Error::http("reading response body", e))?
            .to_vec();
        log::debug!("received {} with {} byte(s)", status, body.len());

        Ok(Response {
            version,
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("").to_string(),
            headers,
            body,
        })
    }
}
