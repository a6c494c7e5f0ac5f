use crate::core::config::ClientConfig;
use crate::core::errors::ServiceError;
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{instrument, trace};
use url::Url;

/// Connection-level faults below the business layer.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("HTTP status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("maximum attempts ({attempts}) exceeded: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<TransportError>,
    },
}

impl TransportError {
    /// Whether the fault is a connection-level condition worth retrying.
    /// Business errors and protocol mismatches never are.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Connect(_) | Self::Timeout(_))
    }
}

/// The decoded response envelope every non-static endpoint wraps its payload
/// in. Exactly one of `data` present / `retcode` non-zero holds in a
/// well-formed response.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    pub retcode: i32,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

/// A fully built request, ready to send. Constructed fresh per attempt: the
/// signature header inside is time-dependent and must not be reused.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    /// Pre-serialized JSON body. Serialized once by the dispatcher so the
    /// signature and the wire can never disagree about the bytes.
    pub body: Option<String>,
    pub cookies: Vec<(String, String)>,
}

impl HttpRequest {
    #[must_use]
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
            cookies: Vec::new(),
        }
    }
}

/// Transport capability: send an HTTP request, return the decoded JSON body.
///
/// Kept as a trait so the dispatcher can be driven against a scripted
/// in-memory implementation in tests.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &HttpRequest) -> Result<Value, TransportError>;
}

/// Production transport backed by reqwest.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport").finish_non_exhaustive()
    }
}

impl ReqwestTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                ServiceError::InvalidParameters(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }

    fn classify_send_error(e: &reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout(e.to_string())
        } else {
            TransportError::Connect(e.to_string())
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn send(&self, request: &HttpRequest) -> Result<Value, TransportError> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone());

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if !request.cookies.is_empty() {
            let cookie_header = request
                .cookies
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join("; ");
            builder = builder.header(reqwest::header::COOKIE, cookie_header);
        }
        if let Some(body) = &request.body {
            builder = builder
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Self::classify_send_error(&e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::Connect(format!("Failed to read response body: {}", e)))?;

        trace!("Response body: {}", text);

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                message: text,
            });
        }

        serde_json::from_str(&text)
            .map_err(|e| TransportError::Decode(format!("Failed to parse JSON response: {}", e)))
    }
}
