//! HttpTransport - the HTTP seam used by HTTP-based sinks
//!
//! One POST per call, no retry and no timeout. Success is decided by the
//! caller from the returned status line.

use bytes::Bytes;
use tracing::{debug, instrument};

use contracts::ContractError;

/// Status line treated as success
pub const SUCCESS_STATUS: &str = "200 OK";

/// Outgoing POST request
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub endpoint: String,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl HttpRequest {
    pub fn new(endpoint: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            endpoint: endpoint.into(),
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// First header value with the given name (case-insensitive)
    pub fn header_value(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

/// Response as seen by the sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status line, e.g. "200 OK"
    pub status: String,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        self.status == SUCCESS_STATUS
    }
}

/// HTTP client abstraction
#[trait_variant::make(HttpTransport: Send)]
pub trait LocalHttpTransport {
    /// Perform one POST
    ///
    /// # Errors
    /// Returns `Transport` when no response was received at all
    async fn post(&self, request: HttpRequest) -> Result<HttpResponse, ContractError>;
}

/// reqwest-backed transport
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl HttpTransport for ReqwestTransport {
    #[instrument(name = "http_post", skip(self, request), fields(endpoint = %request.endpoint, bytes = request.body.len()))]
    async fn post(&self, request: HttpRequest) -> Result<HttpResponse, ContractError> {
        let mut builder = self.client.post(&request.endpoint);
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }

        let response = builder
            .body(request.body)
            .send()
            .await
            .map_err(|e| ContractError::transport("http", e.to_string()))?;

        let status = response.status().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| ContractError::transport("http", e.to_string()))?;

        debug!(status = %status, "HTTP response received");
        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_is_exact_status_line() {
        let ok = HttpResponse {
            status: "200 OK".into(),
            body: String::new(),
        };
        assert!(ok.is_success());

        let created = HttpResponse {
            status: "201 Created".into(),
            body: String::new(),
        };
        assert!(!created.is_success());
    }

    #[test]
    fn test_request_headers() {
        let request = HttpRequest::new("http://localhost/v2", vec![1u8, 2, 3])
            .header("X-SF-TOKEN", "secret")
            .header("Content-Type", "application/x-protobuf");

        assert_eq!(request.header_value("x-sf-token"), Some("secret"));
        assert_eq!(request.body.len(), 3);
        assert!(request.header_value("Accept").is_none());
    }

    #[test]
    fn test_status_line_format() {
        // reqwest renders StatusCode as "<code> <reason>"
        assert_eq!(reqwest::StatusCode::OK.to_string(), SUCCESS_STATUS);
    }
}
