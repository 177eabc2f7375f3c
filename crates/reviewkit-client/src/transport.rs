//! The HTTP boundary.
//!
//! The synchronization engine talks to the backend through the `Transport`
//! trait, so tests (and alternative stacks) can swap the network out
//! entirely. The production implementation rides on `reqwest`.
//!
//! The CSRF token is injected at construction and attached as a header on
//! mutating verbs; the core never reads cookies itself.

use std::time::Duration;

use async_trait::async_trait;
use reviewkit_types::{ResourceError, Result};
use serde_json::Value;
use url::Url;

/// Default request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Header carrying the CSRF token on mutating requests.
const CSRF_HEADER: &str = "X-CSRFToken";

/// HTTP verb for an API request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    /// The verb as it appears on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// Whether the verb mutates server state and therefore needs the CSRF
    /// token.
    pub fn is_mutating(self) -> bool {
        !matches!(self, Self::Get)
    }
}

/// One request to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Site-relative URL path, as produced by a kind's URL resolver.
    pub url: String,
    /// JSON request body, for mutating verbs.
    pub body: Option<Value>,
}

/// One response from the backend.
///
/// `body` is `Value::Null` when the response had no body (a 204 from a
/// destroy, for instance). HTTP-level failures never reach this type; the
/// transport turns them into errors, so the engine only ever sees
/// envelope-level results.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub body: Value,
}

/// The transport abstraction the engine is written against.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request and return the parsed response.
    ///
    /// Transport failures (no response at all, or an HTTP failure without
    /// a JSON body) are `Network` errors; a successful response that is
    /// not empty and not JSON is a `Deserialization` error. API-level
    /// failures ride back inside the body's envelope and are not this
    /// layer's concern.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}

/// reqwest-backed transport.
#[derive(Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
    csrf_token: Option<String>,
}

impl HttpTransport {
    /// Create a transport rooted at `base_url`.
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ResourceError::Url(format!("invalid base URL {base_url:?}: {e}")))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| ResourceError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            csrf_token: None,
        })
    }

    /// Attach the CSRF token to send on mutating requests.
    pub fn with_csrf_token(mut self, token: impl Into<String>) -> Self {
        self.csrf_token = Some(token.into());
        self
    }

    /// The absolute URL for a site-relative path.
    fn absolute_url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ResourceError::Url(format!("cannot join {path:?}: {e}")))
    }
}

/// The CSRF header to attach, if any.
///
/// Only mutating verbs carry the token, and only when one was configured.
fn csrf_header_for(method: Method, token: Option<&str>) -> Option<(&'static str, &str)> {
    match token {
        Some(token) if method.is_mutating() => Some((CSRF_HEADER, token)),
        _ => None,
    }
}

/// Turn a raw response body into a JSON value.
///
/// An empty body becomes `Value::Null`. A body that is not JSON is a
/// `Network` error when the HTTP status already signals failure (an HTML
/// error page from a proxy, say) and a `Deserialization` error otherwise.
fn parse_body(status: u16, text: &str) -> Result<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    match serde_json::from_str(text) {
        Ok(body) => Ok(body),
        Err(_) if !(200..300).contains(&status) => Err(ResourceError::Network(format!(
            "HTTP {status} with a non-JSON body"
        ))),
        Err(e) => Err(ResourceError::Deserialization(format!(
            "response is not JSON: {e}"
        ))),
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = self.absolute_url(&request.url)?;
        tracing::debug!(method = request.method.as_str(), %url, "sending API request");

        let mut builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Put => self.client.put(url),
            Method::Delete => self.client.delete(url),
        };

        if let Some((name, value)) = csrf_header_for(request.method, self.csrf_token.as_deref()) {
            builder = builder.header(name, value);
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ResourceError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ResourceError::Network(e.to_string()))?;

        let body = parse_body(status, &text)?;
        Ok(ApiResponse { body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutating_verbs() {
        assert!(!Method::Get.is_mutating());
        assert!(Method::Post.is_mutating());
        assert!(Method::Put.is_mutating());
        assert!(Method::Delete.is_mutating());
    }

    #[test]
    fn test_csrf_header_on_mutating_verbs_only() {
        let token = Some("abc123");
        for method in [Method::Post, Method::Put, Method::Delete] {
            assert_eq!(
                csrf_header_for(method, token),
                Some((CSRF_HEADER, "abc123"))
            );
        }
        assert_eq!(csrf_header_for(Method::Get, token), None);
    }

    #[test]
    fn test_no_csrf_header_without_token() {
        assert_eq!(csrf_header_for(Method::Post, None), None);
        assert_eq!(csrf_header_for(Method::Delete, None), None);
    }

    #[test]
    fn test_empty_body_parses_as_null() {
        assert_eq!(parse_body(204, "  ").unwrap(), Value::Null);
    }

    #[test]
    fn test_http_failure_with_html_body_is_network_error() {
        let err = parse_body(500, "<html>Internal Server Error</html>").unwrap_err();
        assert!(matches!(err, ResourceError::Network(_)));
    }

    #[test]
    fn test_ok_status_with_non_json_body_is_deserialization_error() {
        let err = parse_body(200, "not json").unwrap_err();
        assert!(matches!(err, ResourceError::Deserialization(_)));
    }

    #[test]
    fn test_http_failure_with_envelope_body_passes_through() {
        let body = parse_body(404, r#"{"stat": "does-not-exist"}"#).unwrap();
        assert_eq!(body["stat"], "does-not-exist");
    }

    #[test]
    fn test_absolute_url_join() {
        let transport = HttpTransport::new("https://reviews.example.com/").unwrap();
        let url = transport
            .absolute_url("api/users/doc/api-tokens/")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://reviews.example.com/api/users/doc/api-tokens/"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = HttpTransport::new("not a url").unwrap_err();
        assert!(matches!(err, ResourceError::Url(_)));
    }
}
