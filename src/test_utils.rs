//! Test utilities for integration testing.
//!
//! `create_test_app` builds the application around the pool handed out by
//! `#[sqlx::test]` (migrations already applied) and points the diagnostic
//! trace at a temp directory so tests can read it back.

use axum_test::TestServer;
use sqlx::PgPool;
use tempfile::TempDir;

use crate::config::{Config, ConnectFailurePolicy, DiagnosticsConfig, PoolSettings};

/// Build a test application around an existing pool.
///
/// Returns the in-process test server plus the temp directory holding the
/// diagnostic trace file; keep the directory alive for the test body.
pub async fn create_test_app(pool: PgPool) -> (TestServer, TempDir) {
    let (config, diag_dir) = create_test_config();
    create_test_app_with_config(pool, config, diag_dir).await
}

/// Same as [`create_test_app`] but with the connect-failure policy flipped
/// to `silent`.
pub async fn create_silent_mode_test_app(pool: PgPool) -> (TestServer, TempDir) {
    let (mut config, diag_dir) = create_test_config();
    config.on_connect_failure = ConnectFailurePolicy::Silent;
    create_test_app_with_config(pool, config, diag_dir).await
}

async fn create_test_app_with_config(
    pool: PgPool,
    config: Config,
    diag_dir: TempDir,
) -> (TestServer, TempDir) {
    let app = crate::Application::new_with_pool(config, Some(pool))
        .await
        .expect("Failed to create application");

    (app.into_test_server(), diag_dir)
}

/// Test configuration: loopback bind, tiny pool, info trace lines enabled.
pub fn create_test_config() -> (Config, TempDir) {
    let diag_dir = tempfile::tempdir().expect("Failed to create temp dir");

    let config = Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        database: crate::config::DatabaseConfig {
            // unused: tests pass their pool to new_with_pool
            url: "postgres://localhost:5432/unused".to_string(),
            pool: PoolSettings {
                max_connections: 1,
                ..Default::default()
            },
        },
        diagnostics: DiagnosticsConfig {
            path: diag_dir.path().join("submit-playthrough.log"),
            log_info: true,
        },
        ..Default::default()
    };

    (config, diag_dir)
}

/// Read back the diagnostic trace written during a test. Empty if no line
/// was ever written.
pub async fn read_diagnostic_log(diag_dir: &TempDir) -> String {
    tokio::fs::read_to_string(diag_dir.path().join("submit-playthrough.log"))
        .await
        .unwrap_or_default()
}
