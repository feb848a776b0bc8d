//! Injectable HTTP transport seam used by HTTP-backed resources.
//!
//! Resources only ever need "send this request, hand me the status and a body
//! stream". Keeping that behind a trait means pooling, TLS, redirects and
//! timeouts all live in the injected client, and tests can substitute a
//! canned transport without any network.

use std::error::Error;
use std::fmt;
use std::io::Read;
use std::sync::Arc;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, CONNECTION};
use reqwest::{Method, StatusCode, Url};

/// A request as seen by this layer: only the parts the resource layer
/// controls. Everything else (redirect policy, timeouts, proxies) belongs to
/// the client implementation.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    /// Extra headers for this request, applied over any client-level defaults.
    pub headers: HeaderMap,
    /// Ask the server to close the connection after the response.
    pub close: bool,
}

impl HttpRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            close: false,
        }
    }
}

/// The status line plus the body as a plain reader. Ownership of the body
/// transfers to the caller, who must read it to completion or drop it so the
/// underlying connection can be released.
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: Box<dyn Read + Send>,
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Round-trip failure from an [`HttpClient`]: the request never produced a
/// response (connection refused, DNS, TLS, ...). Status-code handling is the
/// resource layer's job, not the client's.
#[derive(Debug, thiserror::Error)]
#[error("http transport error: {0}")]
pub struct HttpClientError(#[source] pub Box<dyn Error + Send + Sync>);

impl HttpClientError {
    pub fn new(err: impl Error + Send + Sync + 'static) -> Self {
        Self(Box::new(err))
    }
}

/// Minimal transport contract: execute one request, return one response.
pub trait HttpClient: Send + Sync {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, HttpClientError>;
}

impl HttpClient for Client {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, HttpClientError> {
        let mut builder = self
            .request(request.method, request.url)
            .headers(request.headers);
        if request.close {
            builder = builder.header(CONNECTION, "close");
        }
        let response = builder.send().map_err(HttpClientError::new)?;
        Ok(HttpResponse {
            status: response.status(),
            body: Box::new(response),
        })
    }
}

/// Builds a fresh reqwest-backed client. This is a constructor, not a shared
/// instance; callers wanting connection-pool reuse across resolvers hold the
/// returned `Arc` themselves.
pub fn default_client() -> Arc<dyn HttpClient> {
    Arc::new(Client::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_method_url_and_defaults() {
        let url = Url::parse("http://example.com/data").unwrap();
        let req = HttpRequest::new(Method::HEAD, url.clone());
        assert_eq!(req.method, Method::HEAD);
        assert_eq!(req.url, url);
        assert!(req.headers.is_empty());
        assert!(!req.close);
    }

    #[test]
    fn client_error_preserves_source() {
        let inner = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = HttpClientError::new(inner);
        assert!(err.to_string().contains("refused"));
        assert!(err.source().is_some());
    }
}
