//! Test harness with testcontainers for integration testing.
//!
//! Uses one shared Postgres container across all tests. The container and
//! migrations are initialized once on first use, then reused; tests isolate
//! themselves with fresh ids rather than separate databases.

use anyhow::{Context, Result};
use chrono::Duration;
use community_notes::kernel::{
    BaseClock, MockClock, PostgresNoteStore, ServerDeps, StreamHub, SystemClock,
};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use test_context::AsyncTestContext;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

use super::ApiClient;

/// Shared test infrastructure that persists across all tests.
struct SharedTestInfra {
    db_url: String,
    // Keep the container alive for the entire test run
    _postgres: ContainerAsync<Postgres>,
}

/// Global shared infrastructure - initialized once, reused by all tests.
static SHARED_INFRA: OnceCell<SharedTestInfra> = OnceCell::const_new();

impl SharedTestInfra {
    async fn init() -> Result<Self> {
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let postgres = Postgres::default()
            .with_tag("16")
            .with_cmd(["-c", "max_connections=200"])
            .start()
            .await
            .context("Failed to start Postgres container")?;

        let pg_host = postgres.get_host().await?;
        let pg_port = postgres.get_host_port_ipv4(5432).await?;
        let db_url = format!(
            "postgresql://postgres:postgres@{}:{}/postgres",
            pg_host, pg_port
        );

        let pool = PgPool::connect(&db_url)
            .await
            .context("Failed to connect to Postgres for migrations")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;

        Ok(Self {
            db_url,
            _postgres: postgres,
        })
    }

    async fn get() -> &'static Self {
        SHARED_INFRA
            .get_or_init(|| async {
                Self::init()
                    .await
                    .expect("Failed to initialize shared test infrastructure")
            })
            .await
    }
}

/// Postgres-backed test context.
///
/// ```ignore
/// use test_context::test_context;
///
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &TestHarness) {
///     let api = ctx.api();
///     // ... test code
/// }
/// ```
pub struct TestHarness {
    pub db_pool: PgPool,
    pub stream_hub: StreamHub,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new().await.expect("Failed to create test harness")
    }

    async fn teardown(self) {
        self.db_pool.close().await;
    }
}

impl TestHarness {
    pub async fn new() -> Result<Self> {
        let infra = SharedTestInfra::get().await;

        let db_pool = PgPoolOptions::new()
            .max_connections(20)
            .connect(&infra.db_url)
            .await
            .context("Failed to connect to test database")?;

        Ok(Self {
            db_pool,
            stream_hub: StreamHub::new(),
        })
    }

    /// Postgres-backed dependencies on the system clock.
    pub fn deps(&self) -> ServerDeps {
        self.deps_with_clock(Arc::new(SystemClock))
    }

    pub fn deps_with_clock(&self, clock: Arc<dyn BaseClock>) -> ServerDeps {
        ServerDeps::new(
            Arc::new(PostgresNoteStore::new(self.db_pool.clone())),
            clock,
            self.stream_hub.clone(),
            Duration::hours(24),
        )
    }

    /// A manually driven clock, for exercising the submission window.
    pub fn mock_clock(&self) -> Arc<MockClock> {
        Arc::new(MockClock::default())
    }

    pub fn api(&self) -> ApiClient {
        ApiClient::new(self.deps())
    }
}
