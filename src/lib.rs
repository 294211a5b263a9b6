//! # pcrelay: Playthrough Collection Relay
//!
//! A single-endpoint intake service for game playthrough recordings. Clients
//! POST a form with a row identifier and, optionally, the recorded
//! playthrough file; the relay persists both to PostgreSQL.
//!
//! ## Submission protocol
//!
//! Uploads happen in two phases. When a game session starts, the client
//! POSTs its identifier without a file and a bare row is created. As the
//! session progresses it re-POSTs the same identifier together with the
//! serialized recording, which overwrites the payload for that row
//! (last write wins). An upload for an identifier that was never
//! initialized matches zero rows and stores nothing; shipping clients rely
//! on that request still answering 200.
//!
//! Responses never carry a body. 200 means accepted, 400 an unreadable form
//! body, 502 an unreachable database (configurable, see [`config`]), and
//! the non-standard 513 a failed persistence statement.
//!
//! ## Core components
//!
//! - [`api`] - the HTTP endpoint and request decoding
//! - [`db`] - repositories and row models over sqlx/PostgreSQL
//! - [`diagnostics`] - the append-only per-submission trace file
//! - [`config`] - YAML + environment configuration
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use pcrelay::{Application, Config, config::Args};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     Application::new(config)
//!         .await?
//!         .serve(std::future::pending())
//!         .await
//! }
//! ```
//!
//! Migrations run automatically on startup:
//!
//! ```no_run
//! # use sqlx::PgPool;
//! # async fn example(pool: PgPool) -> Result<(), sqlx::migrate::MigrateError> {
//! pcrelay::migrator().run(&pool).await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod db;
pub mod diagnostics;
pub mod errors;
pub mod openapi;
pub mod telemetry;

#[cfg(test)]
pub mod test_utils;

use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    routing::{get, post},
};
use bon::Builder;
pub use config::Config;
use sqlx::PgPool;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{debug, info};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::diagnostics::DiagnosticLog;
use crate::openapi::ApiDoc;

/// Shared application state for all request handlers.
///
/// Handlers receive this via axum's `State` extractor. Individual requests
/// acquire connections from `db`; nothing holds one across requests.
#[derive(Clone, Builder)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,
    /// Application configuration
    pub config: Config,
    /// Append-only submission trace
    pub diagnostics: DiagnosticLog,
}

/// Get the pcrelay database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Connect the pool with the configured settings and run migrations.
async fn setup_database(config: &Config) -> anyhow::Result<PgPool> {
    let settings = &config.database.pool;

    let mut options = sqlx::postgres::PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs));
    if settings.idle_timeout_secs > 0 {
        options = options.idle_timeout(Duration::from_secs(settings.idle_timeout_secs));
    }
    if settings.max_lifetime_secs > 0 {
        options = options.max_lifetime(Duration::from_secs(settings.max_lifetime_secs));
    }

    let pool = options.connect(&config.database.url).await?;
    migrator().run(&pool).await?;

    Ok(pool)
}

/// Build the application router.
///
/// The submission endpoint accepts POST only; every other method is
/// acknowledged with an empty 200 and never reaches the database. The body
/// limit is scoped to that route and covers the whole multipart envelope.
pub fn build_router(state: AppState) -> Router {
    let max_upload_size = state.config.limits.max_upload_size;

    let submit_router = Router::new()
        .route(
            "/submit-playthrough",
            post(api::handlers::playthroughs::submit_playthrough)
                .fallback(api::handlers::playthroughs::ignore_non_post)
                .layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .with_state(state);

    Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .merge(submit_router)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(tracing::Level::INFO))
                .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
        )
}

/// The assembled application, ready to serve.
///
/// # Lifecycle
///
/// 1. **Create**: [`Application::new`] connects the pool, runs migrations,
///    and builds the router
/// 2. **Serve**: [`Application::serve`] binds the TCP port and handles
///    requests until the shutdown future resolves
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        Self::new_with_pool(config, None).await
    }

    /// Create an application, optionally reusing an existing pool.
    ///
    /// Tests hand in the pool created by `#[sqlx::test]`, which already has
    /// migrations applied; passing `None` connects per the configuration.
    pub async fn new_with_pool(config: Config, pool: Option<PgPool>) -> anyhow::Result<Self> {
        debug!("Starting playthrough relay with configuration: {:#?}", config);

        let pool = match pool {
            Some(pool) => pool,
            None => setup_database(&config).await?,
        };

        let diagnostics = DiagnosticLog::new(&config.diagnostics.path, config.diagnostics.log_info);

        let app_state = AppState::builder()
            .db(pool.clone())
            .config(config.clone())
            .diagnostics(diagnostics)
            .build();

        let router = build_router(app_state);

        Ok(Self {
            router,
            config,
            pool,
        })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router.into_make_service())
            .expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("Playthrough relay listening on http://{}", bind_addr);

        // Run the server with graceful shutdown
        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        // Close database connections
        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::test_utils::create_test_app;
    use sqlx::PgPool;

    #[sqlx::test]
    async fn healthz_responds_ok(pool: PgPool) {
        let (app, _diag) = create_test_app(pool).await;

        let response = app.get("/healthz").await;
        response.assert_status_ok();
        assert_eq!(response.text(), "OK");
    }

    #[sqlx::test]
    async fn docs_ui_is_served(pool: PgPool) {
        let (app, _diag) = create_test_app(pool).await;

        app.get("/docs").await.assert_status_ok();
    }
}
