//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{get, patch, post},
    Router,
};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::kernel::ServerDeps;
use crate::server::routes::{
    author_tally_handler, cast_vote_handler, edit_note_handler, get_note_handler,
    health_handler, list_approved_handler, list_pending_handler, moderate_note_handler,
    note_stream_handler, patch_content_handler, submit_note_handler, update_status_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AxumAppState {
    pub deps: Arc<ServerDeps>,
}

/// Routes without transport middleware.
///
/// Tests drive this directly; `build_app` wraps it for serving.
pub fn build_router(deps: ServerDeps) -> Router {
    let state = AxumAppState {
        deps: Arc::new(deps),
    };

    Router::new()
        // Paths the existing web client calls
        .route("/api/community-notes", get(list_approved_handler))
        .route("/api/community-notes/submit", post(submit_note_handler))
        .route(
            "/api/community-notes/getPendingNotes",
            get(list_pending_handler),
        )
        .route(
            "/api/community-notes/editNote/:note_id",
            patch(edit_note_handler),
        )
        .route(
            "/api/community-notes/updateNoteStatus",
            patch(update_status_handler),
        )
        // One endpoint per operation
        .route("/api/notes/:note_id", get(get_note_handler))
        .route("/api/notes/:note_id/votes", post(cast_vote_handler))
        .route("/api/notes/:note_id/content", patch(patch_content_handler))
        .route("/api/notes/:note_id/moderate", post(moderate_note_handler))
        .route(
            "/api/members/:member_id/note-stats",
            get(author_tally_handler),
        )
        // Real-time note events
        .route("/api/streams/community-notes", get(note_stream_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Build the Axum application router with CORS, per-IP throttling, request
/// timeouts and request tracing.
pub fn build_app(deps: ServerDeps, config: &Config) -> Router {
    let allow_origin = if config.allowed_origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(
            config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse::<HeaderValue>().ok()),
        )
    };
    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    // 10 requests per second per IP with bursts up to 20
    let rate_limit_config = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .use_headers() // Report x-ratelimit-* headers; the key stays the peer IP
            .finish()
            .expect("Rate limiter configuration is valid and should never fail"),
    );
    let rate_limit_layer = GovernorLayer {
        config: rate_limit_config,
    };

    build_router(deps)
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(rate_limit_layer)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
