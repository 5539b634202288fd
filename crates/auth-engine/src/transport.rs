//! HTTP transport seam between the executor and the network.

use crate::{ApiError, ApiResult, AuthError, AuthResult};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Request failed before a response arrived (connect, timeout, TLS, ...).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        ApiError::Transport(err.message)
    }
}

/// Length and digest of a body, for logging without leaking its content.
pub(crate) fn summarize_response_body(body: &str) -> String {
    let mut hasher = DefaultHasher::new();
    body.hash(&mut hasher);
    format!("len={},digest={:016x}", body.len(), hasher.finish())
}

/// One logical API operation.
///
/// Kept intact across a renewal-retry cycle; only the credential changes.
#[derive(Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    bearer: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
            bearer: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_json<T: Serialize + ?Sized>(mut self, body: &T) -> ApiResult<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Copy of this request carrying `token` as its bearer credential.
    /// `None` sends no `Authorization` header.
    pub fn authorized(&self, token: Option<&str>) -> Self {
        Self {
            bearer: token.map(str::to_string),
            ..self.clone()
        }
    }

    pub fn bearer_token(&self) -> Option<&str> {
        self.bearer.as_deref()
    }
}

impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("query", &self.query)
            .field("has_body", &self.body.is_some())
            .field("authorized", &self.bearer.is_some())
            .finish()
    }
}

/// Status and raw body of a received response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// The server's `{"error": "..."}` message, if the body carries one.
    pub fn error_message(&self) -> Option<String> {
        serde_json::from_str::<ErrorBody>(&self.body)
            .ok()
            .map(|b| b.error)
            .filter(|m| !m.trim().is_empty())
    }

    /// Operation error for a non-success response.
    pub fn into_error(self) -> ApiError {
        let message = self.error_message().unwrap_or_else(|| {
            self.status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });
        ApiError::Operation {
            status: self.status.as_u16(),
            message,
        }
    }

    pub fn json<T: DeserializeOwned>(&self) -> ApiResult<T> {
        serde_json::from_str(&self.body).map_err(|e| {
            tracing::warn!(
                status = %self.status,
                body_summary = %summarize_response_body(&self.body),
                error = %e,
                "Undecodable response body"
            );
            ApiError::Decode(e.to_string())
        })
    }
}

/// Sends a single request. Implementations do not retry.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// [`HttpTransport`] over a shared reqwest client.
///
/// Request paths are absolute, so any path on `base_url` is replaced.
#[derive(Clone)]
pub struct ReqwestTransport {
    http_client: reqwest::Client,
    base_url: Url,
}

impl ReqwestTransport {
    pub fn new(base_url: Url, timeout: Duration) -> AuthResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http_client,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url_for(&self, request: &ApiRequest) -> Result<Url, TransportError> {
        let mut url = self
            .base_url
            .join(&request.path)
            .map_err(|e| TransportError::new(format!("Invalid request path {}: {}", request.path, e)))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }
        Ok(url)
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = self.url_for(request)?;

        let mut builder = self
            .http_client
            .request(request.method.clone(), url)
            .header(ACCEPT, "application/json");
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(token) = request.bearer_token() {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::warn!(method = %request.method, path = %request.path, error = %e, "HTTP request failed");
            TransportError::new(e.to_string())
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::new(format!("Failed to read response body: {}", e)))?;

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            status = status.as_u16(),
            "HTTP response"
        );
        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorized_copies_request() {
        let request = ApiRequest::put("/api/posts/2")
            .with_json(&serde_json::json!({"title": "C", "content": "D"}))
            .unwrap();

        let first = request.authorized(Some("old"));
        let retry = first.authorized(Some("new"));

        assert_eq!(retry.bearer_token(), Some("new"));
        assert_eq!(retry.method, Method::PUT);
        assert_eq!(retry.path, "/api/posts/2");
        assert_eq!(retry.body, first.body);
        assert_eq!(request.authorized(None).bearer_token(), None);
    }

    #[test]
    fn test_debug_omits_credential() {
        let request = ApiRequest::get("/api/posts").authorized(Some("secret-token"));
        let debug = format!("{:?}", request);
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("authorized: true"));
    }

    #[test]
    fn test_into_error_uses_server_message() {
        let response = ApiResponse::new(StatusCode::NOT_FOUND, r#"{"error": "Post not found"}"#);
        match response.into_error() {
            ApiError::Operation { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Post not found");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_into_error_falls_back_to_reason() {
        let response = ApiResponse::new(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>");
        match response.into_error() {
            ApiError::Operation { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Internal Server Error");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_json_decode_error() {
        let response = ApiResponse::new(StatusCode::OK, "not json");
        let err = response.json::<Vec<u32>>().unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn test_url_for_joins_path_and_query() {
        let transport = ReqwestTransport::new(
            Url::parse("http://localhost:5000").unwrap(),
            Duration::from_secs(5),
        )
        .unwrap();
        let request = ApiRequest::get("/api/search").with_query("q", "rust & fsm");

        let url = transport.url_for(&request).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/search?q=rust+%26+fsm");
    }

    #[test]
    fn test_summarize_response_body_hides_content() {
        let summary = summarize_response_body("access_token=abc");
        assert!(summary.starts_with("len=16,digest="));
        assert!(!summary.contains("abc"));
    }
}
