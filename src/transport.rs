//! HTTP transport to the two authoritative server roles.
//!
//! Every call names its [`ServerRole`] and goes out exactly once, with that
//! role's base URL and headers. Responses are classified into success,
//! [`SyncError::UpstreamValidation`] (status 422) or [`SyncError::Upstream`]
//! (any other non-2xx). Retries and deadlines belong to the caller.

use crate::config::{RoleConfig, SyncConfig};
use crate::error::{ConfigError, Result, SyncError};
use crate::metrics::SyncMetrics;
use http::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use http::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Status the authoritative server uses for semantically invalid input
pub const VALIDATION_FAILED: StatusCode = StatusCode::UNPROCESSABLE_ENTITY;

const X_API_KEY: HeaderName = HeaderName::from_static("x-api-key");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerRole {
    /// Editable primary holding zone configuration and DNSSEC keys
    Editor,
    /// Serving primary that answers queries and notifies secondaries
    Publisher,
}

impl ServerRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServerRole::Editor => "editor",
            ServerRole::Publisher => "publisher",
        }
    }
}

impl fmt::Display for ServerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A response as received from upstream, before any interpretation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: String,
}

impl UpstreamResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Parse the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// The server's `{"error": "..."}` message, if the body carries one
    pub fn error_message(&self) -> Option<String> {
        let value: serde_json::Value = serde_json::from_str(&self.body).ok()?;
        value.get("error")?.as_str().map(str::to_string)
    }

    /// Individual messages from an `{"errors": [...]}` list
    pub fn errors(&self) -> Vec<String> {
        serde_json::from_str::<serde_json::Value>(&self.body)
            .ok()
            .and_then(|value| {
                value.get("errors")?.as_array().map(|errors| {
                    errors
                        .iter()
                        .filter_map(|e| e.as_str().map(str::to_string))
                        .collect()
                })
            })
            .unwrap_or_default()
    }

    /// One-line description for logs and error display
    pub fn summary(&self) -> String {
        match self.error_message() {
            Some(message) => format!("{}: {}", self.status, message),
            None => self.status.to_string(),
        }
    }
}

/// Base URL and prepared headers for one role
#[derive(Debug, Clone)]
struct RoleEndpoint {
    base_url: String,
    headers: HeaderMap,
}

impl RoleEndpoint {
    fn new(
        role: ServerRole,
        config: &RoleConfig,
        user_agent: &str,
    ) -> std::result::Result<Self, ConfigError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .map_err(|_| ConfigError::InvalidHeader("user agent".to_string()))?,
        );
        let mut api_key = HeaderValue::from_str(&config.api_token)
            .map_err(|_| ConfigError::InvalidHeader(format!("{} API token", role)))?;
        api_key.set_sensitive(true);
        headers.insert(X_API_KEY, api_key);

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            headers,
        })
    }
}

/// Client for the authoritative server's HTTP API, shared by all callers.
///
/// Holds nothing mutable; clone it or put it behind an `Arc` freely.
#[derive(Debug, Clone)]
pub struct PdnsClient {
    client: reqwest::Client,
    editor: Arc<RoleEndpoint>,
    publisher: Arc<RoleEndpoint>,
    config: Arc<SyncConfig>,
    metrics: Option<Arc<SyncMetrics>>,
}

impl PdnsClient {
    pub fn new(
        config: SyncConfig,
        metrics: Option<Arc<SyncMetrics>>,
    ) -> std::result::Result<Self, ConfigError> {
        config.validate()?;

        let editor = RoleEndpoint::new(ServerRole::Editor, &config.editor, &config.user_agent)?;
        let publisher =
            RoleEndpoint::new(ServerRole::Publisher, &config.publisher, &config.user_agent)?;

        // 3xx is classified like any other status, never followed
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            editor: Arc::new(editor),
            publisher: Arc::new(publisher),
            config: Arc::new(config),
            metrics,
        })
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    fn endpoint(&self, role: ServerRole) -> &RoleEndpoint {
        match role {
            ServerRole::Editor => &self.editor,
            ServerRole::Publisher => &self.publisher,
        }
    }

    /// Full URL for `path` on the given role
    pub fn url(&self, role: ServerRole, path: &str) -> String {
        format!("{}{}", self.endpoint(role).base_url, path)
    }

    /// Send one request to `role` and classify the response.
    ///
    /// The body is serialized first; if it is larger than the configured
    /// maximum the call fails with [`SyncError::PayloadTooLarge`] and nothing
    /// is sent.
    pub async fn request<T>(
        &self,
        method: Method,
        role: ServerRole,
        path: &str,
        body: Option<&T>,
    ) -> Result<UpstreamResponse>
    where
        T: Serialize + ?Sized,
    {
        let body = match body {
            Some(body) => Some(serde_json::to_vec(body)?),
            None => None,
        };

        if let Some(ref data) = body {
            let max = self.config.max_body_size;
            if data.len() > max {
                warn!(
                    role = %role,
                    method = %method,
                    path = path,
                    size = data.len(),
                    max = max,
                    "Refusing to send oversized request body"
                );
                if let Some(metrics) = &self.metrics {
                    metrics.record_payload_rejection(role.as_str());
                }
                return Err(SyncError::PayloadTooLarge {
                    size: data.len(),
                    max,
                });
            }
        }

        let endpoint = self.endpoint(role);
        let url = format!("{}{}", endpoint.base_url, path);

        debug!(
            role = %role,
            method = %method,
            path = path,
            body_size = body.as_ref().map_or(0, Vec::len),
            "Sending upstream request"
        );

        let mut builder = self
            .client
            .request(method.clone(), &url)
            .headers(endpoint.headers.clone());
        if let Some(data) = body {
            builder = builder
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .body(data);
        }

        if let Some(metrics) = &self.metrics {
            metrics.record_upstream_request(role.as_str(), method.as_str());
        }
        let started = Instant::now();

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(role = %role, method = %method, path = path, error = %e, "Upstream request failed");
                if let Some(metrics) = &self.metrics {
                    metrics.record_upstream_response(
                        role.as_str(),
                        "connection_error",
                        started.elapsed(),
                    );
                }
                return Err(e.into());
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(
                    role = %role,
                    method = %method,
                    path = path,
                    status = status.as_u16(),
                    error = %e,
                    "Upstream response body was cut off"
                );
                if let Some(metrics) = &self.metrics {
                    metrics.record_upstream_response(
                        role.as_str(),
                        "connection_error",
                        started.elapsed(),
                    );
                }
                return Err(e.into());
            }
        };
        let response = UpstreamResponse::new(status, body);
        let elapsed = started.elapsed();

        debug!(
            role = %role,
            method = %method,
            path = path,
            status = status.as_u16(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Received upstream response"
        );

        let (outcome, result) = classify(response);
        if let Err(ref e) = result {
            warn!(role = %role, method = %method, path = path, error = %e, "Upstream rejected request");
        }
        if let Some(metrics) = &self.metrics {
            metrics.record_upstream_response(role.as_str(), outcome, elapsed);
        }

        result
    }

    pub async fn get(&self, role: ServerRole, path: &str) -> Result<UpstreamResponse> {
        self.request::<()>(Method::GET, role, path, None).await
    }

    pub async fn delete(&self, role: ServerRole, path: &str) -> Result<UpstreamResponse> {
        self.request::<()>(Method::DELETE, role, path, None).await
    }

    pub async fn post<T>(&self, role: ServerRole, path: &str, body: &T) -> Result<UpstreamResponse>
    where
        T: Serialize + ?Sized,
    {
        self.request(Method::POST, role, path, Some(body)).await
    }

    pub async fn patch<T>(&self, role: ServerRole, path: &str, body: &T) -> Result<UpstreamResponse>
    where
        T: Serialize + ?Sized,
    {
        self.request(Method::PATCH, role, path, Some(body)).await
    }

    pub async fn put<T>(
        &self,
        role: ServerRole,
        path: &str,
        body: Option<&T>,
    ) -> Result<UpstreamResponse>
    where
        T: Serialize + ?Sized,
    {
        self.request(Method::PUT, role, path, body).await
    }
}

/// Map a response onto success or one of the two upstream error kinds.
///
/// The validation status is checked before the general 2xx test. Returns
/// the metrics outcome label alongside the result.
fn classify(response: UpstreamResponse) -> (&'static str, Result<UpstreamResponse>) {
    if response.status == VALIDATION_FAILED {
        ("validation_error", Err(SyncError::UpstreamValidation(response)))
    } else if !response.status.is_success() {
        ("error", Err(SyncError::Upstream(response)))
    } else {
        ("success", Ok(response))
    }
}
