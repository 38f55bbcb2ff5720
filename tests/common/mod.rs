//! Common test utilities for zonesync integration tests
//!
//! `MockUpstream` stands in for one authoritative server role: it records
//! every request it receives and answers with canned responses.

#![allow(dead_code)] // These helpers are shared by several test files

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{
        HeaderMap, Method, StatusCode, Uri,
        header::{CONTENT_TYPE, LOCATION},
    },
    response::{IntoResponse, Response},
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use zonesync::{Domain, RoleConfig, SyncConfig};

pub const EDITOR_TOKEN: &str = "editor-secret";
pub const PUBLISHER_TOKEN: &str = "publisher-secret";

/// A request as seen by the mock server
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

#[derive(Clone, Default)]
struct MockState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    routes: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
    redirects: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
}

pub struct MockUpstream {
    pub base_url: String,
    state: MockState,
    handle: JoinHandle<()>,
}

impl MockUpstream {
    pub async fn start() -> Self {
        let state = MockState::default();
        let app = Router::new().fallback(record).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url: format!("http://{}/api/v1/servers/localhost", addr),
            state,
            handle,
        }
    }

    /// Answer `method path` with `status` and `body` from now on
    pub fn respond(&self, method: &str, path: &str, status: u16, body: impl Into<String>) {
        let path = format!("/api/v1/servers/localhost{}", path);
        self.state
            .routes
            .lock()
            .unwrap()
            .insert((method.to_string(), path), (status, body.into()));
    }

    /// Answer `method path` with a redirect to `location`
    pub fn redirect(&self, method: &str, path: &str, status: u16, location: impl Into<String>) {
        let path = format!("/api/v1/servers/localhost{}", path);
        self.state
            .redirects
            .lock()
            .unwrap()
            .insert((method.to_string(), path), (status, location.into()));
    }

    pub fn respond_json(&self, method: &str, path: &str, status: u16, body: serde_json::Value) {
        self.respond(method, path, status, body.to_string());
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.requests.lock().unwrap().len()
    }

    /// Path relative to the API base, as the client addressed it
    pub fn last_path(&self) -> Option<String> {
        self.requests().last().map(|r| {
            r.path
                .trim_start_matches("/api/v1/servers/localhost")
                .to_string()
        })
    }
}

impl Drop for MockUpstream {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn record(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.to_string(),
        path: path.clone(),
        headers: headers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
            .collect(),
        body: String::from_utf8_lossy(&body).to_string(),
    });

    let key = (method.to_string(), path);
    let redirect = state.redirects.lock().unwrap().get(&key).cloned();
    if let Some((status, location)) = redirect {
        return (StatusCode::from_u16(status).unwrap(), [(LOCATION, location)]).into_response();
    }

    let canned = state
        .routes
        .lock()
        .unwrap()
        .get(&key)
        .cloned();

    match canned {
        Some((status, body)) => (
            StatusCode::from_u16(status).unwrap(),
            [(CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            [(CONTENT_TYPE, "application/json")],
            r#"{"error": "Not Found"}"#,
        )
            .into_response(),
    }
}

/// Start an editor and a publisher mock
pub async fn start_upstreams() -> (MockUpstream, MockUpstream) {
    (MockUpstream::start().await, MockUpstream::start().await)
}

pub fn test_config(editor: &MockUpstream, publisher: &MockUpstream) -> SyncConfig {
    SyncConfig::new(
        RoleConfig::new(editor.base_url.clone(), EDITOR_TOKEN),
        RoleConfig::new(publisher.base_url.clone(), PUBLISHER_TOKEN),
    )
}

pub fn test_domain(name: &str) -> Domain {
    Domain::new(name, "alice@example.net")
}
