//! In-process HTTP client that drives the router without binding a socket.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use community_notes::kernel::ServerDeps;
use community_notes::server::build_router;
use serde_json::Value;
use tower::ServiceExt;

pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl ApiResponse {
    /// Message of a `{"error": ...}` body, empty when there is none.
    pub fn error(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }

    pub fn note_id(&self) -> String {
        self.body["id"]
            .as_str()
            .expect("response should carry a note id")
            .to_string()
    }
}

#[derive(Clone)]
pub struct ApiClient {
    router: Router,
}

impl ApiClient {
    pub fn new(deps: ServerDeps) -> Self {
        Self {
            router: build_router(deps),
        }
    }

    pub async fn get(&self, uri: &str) -> ApiResponse {
        self.send(Method::GET, uri, Body::empty()).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> ApiResponse {
        self.send(Method::POST, uri, Body::from(body.to_string())).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> ApiResponse {
        self.send(Method::PATCH, uri, Body::from(body.to_string())).await
    }

    /// Send a body that is not necessarily valid JSON.
    pub async fn send_raw(&self, method: Method, uri: &str, raw: &str) -> ApiResponse {
        self.send(method, uri, Body::from(raw.to_string())).await
    }

    async fn send(&self, method: Method, uri: &str, body: Body) -> ApiResponse {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router should not fail");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        ApiResponse { status, body }
    }
}
