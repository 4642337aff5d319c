use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::time::Duration;

use crate::domains::community_notes::events::NOTES_TOPIC;
use crate::server::app::AxumAppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    status: String,
    database: DatabaseHealth,
    note_stream_subscribers: usize,
}

#[derive(Serialize)]
pub struct DatabaseHealth {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Health check endpoint
///
/// Returns 200 OK when the note store answers within 5 seconds,
/// 503 Service Unavailable otherwise.
pub async fn health_handler(State(state): State<AxumAppState>) -> (StatusCode, Json<HealthResponse>) {
    let db_health = match tokio::time::timeout(
        Duration::from_secs(5),
        state.deps.note_store.ping(),
    )
    .await
    {
        Ok(Ok(())) => DatabaseHealth {
            status: "ok".to_string(),
            error: None,
        },
        Ok(Err(e)) => DatabaseHealth {
            status: "error".to_string(),
            error: Some(format!("Query failed: {}", e)),
        },
        Err(_) => DatabaseHealth {
            status: "error".to_string(),
            error: Some("Query timeout (>5s)".to_string()),
        },
    };

    let is_healthy = db_health.status == "ok";
    let status_code = if is_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(HealthResponse {
            status: if is_healthy { "healthy" } else { "unhealthy" }.to_string(),
            database: db_health,
            note_stream_subscribers: state.deps.stream_hub.subscriber_count(NOTES_TOPIC).await,
        }),
    )
}
