// Main entry point for the community notes API server

use anyhow::{Context, Result};
use community_notes::kernel::{PostgresNoteStore, ServerDeps, StreamHub, SystemClock};
use community_notes::{server::build_app, Config};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,community_notes=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting community notes API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    let rate_limit_window = chrono::Duration::from_std(config.note_rate_limit_window)
        .context("NOTE_RATE_LIMIT_WINDOW_SECS is out of range")?;
    let stream_hub = StreamHub::with_capacity(config.stream_channel_capacity);

    // Drop topics whose last SSE subscriber went away
    let hub = stream_hub.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(300));
        loop {
            interval.tick().await;
            hub.cleanup().await;
        }
    });

    let deps = ServerDeps::new(
        Arc::new(PostgresNoteStore::new(pool)),
        Arc::new(SystemClock),
        stream_hub,
        rate_limit_window,
    );

    // Build application
    let app = build_app(deps, &config);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Note stream: http://localhost:{}/api/streams/community-notes", config.port);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
