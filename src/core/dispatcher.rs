use crate::core::classify::{ApiFamily, Classification};
use crate::core::config::ClientConfig;
use crate::core::errors::ServiceError;
use crate::core::kernel::retry::with_retry;
use crate::core::kernel::signer::DsSigner;
use crate::core::kernel::transport::{
    Envelope, HttpRequest, ReqwestTransport, Transport, TransportError,
};
use crate::core::pool::CredentialPool;
use crate::core::types::{Credential, Region};
use reqwest::Method;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};
use url::Url;

/// One logical API call, before a credential and a signature are applied.
///
/// The endpoint may be relative (joined against the family's per-region base
/// URL) or absolute (used as given; the event endpoints live on their own
/// hosts).
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub family: ApiFamily,
    pub region: Region,
    pub method: Method,
    pub endpoint: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
}

impl ApiRequest {
    #[must_use]
    pub fn get(family: ApiFamily, region: Region, endpoint: impl Into<String>) -> Self {
        Self {
            family,
            region,
            method: Method::GET,
            endpoint: endpoint.into(),
            query: Vec::new(),
            body: None,
            headers: Vec::new(),
        }
    }

    #[must_use]
    pub fn post(family: ApiFamily, region: Region, endpoint: impl Into<String>) -> Self {
        Self {
            method: Method::POST,
            ..Self::get(family, region, endpoint)
        }
    }

    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    const fn base_url(&self) -> &'static str {
        match self.family {
            ApiFamily::GameRecord => self.region.takumi_url(),
            ApiFamily::GachaLog => self.region.gacha_info_url(),
        }
    }
}

/// The credential-rotation request dispatcher.
///
/// Builds the full request for an [`ApiRequest`] (URL, headers, fresh
/// signature, body), sends it through the transient-fault retrier, classifies
/// the decoded envelope and applies the rotation policy: only a rate-limited
/// classification moves on to the next pooled credential; every other
/// non-success outcome is terminal for the whole call, since retrying cannot
/// fix it and would silently burn through the rest of the pool.
pub struct ApiDispatcher<T: Transport = ReqwestTransport> {
    transport: T,
    pool: Arc<CredentialPool>,
    config: ClientConfig,
}

impl ApiDispatcher<ReqwestTransport> {
    /// Dispatcher with the production transport and an empty pool.
    pub fn new(config: ClientConfig) -> Result<Self, ServiceError> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(
            transport,
            Arc::new(CredentialPool::new()),
            config,
        ))
    }
}

impl<T: Transport> ApiDispatcher<T> {
    pub fn with_transport(transport: T, pool: Arc<CredentialPool>, config: ClientConfig) -> Self {
        Self {
            transport,
            pool,
            config,
        }
    }

    #[must_use]
    pub fn pool(&self) -> &CredentialPool {
        &self.pool
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Dispatch using the shared pool, rotating past rate-limited
    /// credentials.
    ///
    /// Gacha-log requests carry their token in the query string and have no
    /// pooled cookies to rotate through, so they take a single-attempt path.
    #[instrument(skip(self, request), fields(family = ?request.family, endpoint = %request.endpoint))]
    pub async fn dispatch(&self, request: &ApiRequest) -> Result<Value, ServiceError> {
        if request.family == ApiFamily::GachaLog {
            return self.attempt(request, None).await?.into_outcome();
        }

        if self.pool.is_empty() {
            return Err(ServiceError::NotAuthenticated);
        }

        let total = self.pool.len();
        for _ in 0..total {
            let Some(credential) = self.pool.front() else {
                break;
            };
            match self.attempt(request, Some(&credential)).await? {
                Classification::Success(data) => return Ok(data),
                Classification::RateLimited(message) => {
                    // Move the rate-limited credential to the end to let the
                    // limit wear off while the others are tried.
                    debug!(%message, "credential rate limited, rotating to back");
                    self.pool.rotate_to_back(0);
                }
                other => return other.into_outcome(),
            }
        }

        Err(ServiceError::AllCredentialsRateLimited { accounts: total })
    }

    /// Dispatch with an explicit credential: exactly one attempt, no
    /// rotation, and the shared pool is never touched.
    #[instrument(skip(self, request, credential), fields(family = ?request.family, endpoint = %request.endpoint))]
    pub async fn dispatch_with(
        &self,
        request: &ApiRequest,
        credential: &Credential,
    ) -> Result<Value, ServiceError> {
        self.attempt(request, Some(credential)).await?.into_outcome()
    }

    /// Convenience for callers that take an optional credential override.
    pub async fn dispatch_as(
        &self,
        request: &ApiRequest,
        credential: Option<&Credential>,
    ) -> Result<Value, ServiceError> {
        match credential {
            Some(credential) => self.dispatch_with(request, credential).await,
            None => self.dispatch(request).await,
        }
    }

    async fn attempt(
        &self,
        request: &ApiRequest,
        credential: Option<&Credential>,
    ) -> Result<Classification, ServiceError> {
        // Built fresh per attempt: the signature embeds the time and nonce.
        let http = self.build_http_request(request, credential)?;

        let raw = with_retry(
            self.config.max_attempts,
            TransportError::is_transient,
            || self.transport.send(&http),
        )
        .await?;

        let envelope: Envelope = serde_json::from_value(raw).map_err(|e| {
            ServiceError::MalformedResponse(format!("unexpected response envelope: {}", e))
        })?;
        Ok(request.family.classify(envelope))
    }

    fn build_http_request(
        &self,
        request: &ApiRequest,
        credential: Option<&Credential>,
    ) -> Result<HttpRequest, ServiceError> {
        let base = Url::parse(request.base_url()).map_err(|e| {
            ServiceError::InvalidParameters(format!("invalid base URL: {}", e))
        })?;
        let url = base.join(&request.endpoint).map_err(|e| {
            ServiceError::InvalidParameters(format!(
                "invalid endpoint {:?}: {}",
                request.endpoint, e
            ))
        })?;

        // Serialized once; the signature below hashes these exact bytes.
        let body = request
            .body
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| {
                ServiceError::InvalidParameters(format!("failed to serialize request body: {}", e))
            })?;

        let mut headers: HashMap<String, String> = HashMap::new();
        if request.family == ApiFamily::GameRecord {
            headers.insert("x-rpc-language".to_string(), self.config.language.clone());
            let signer = DsSigner::for_region(request.region);
            for (name, value) in signer.headers(body.as_deref(), &request.query) {
                headers.insert(name, value);
            }
        }
        // Per-call headers override the defaults.
        for (name, value) in &request.headers {
            headers.insert(name.clone(), value.clone());
        }

        let mut http = HttpRequest::new(request.method.clone(), url);
        http.query = request.query.clone();
        http.headers = headers.into_iter().collect();
        http.body = body;
        if let Some(credential) = credential {
            http.cookies = credential.pairs().to_vec();
        }
        Ok(http)
    }
}

impl<T: Transport> std::fmt::Debug for ApiDispatcher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiDispatcher")
            .field("pool_len", &self.pool.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
