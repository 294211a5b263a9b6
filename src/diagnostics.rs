//! Diagnostic trace file.
//!
//! The relay keeps a plain-text trace of each submission in a local
//! append-only file, separate from the structured `tracing` output. Lines
//! are prefixed `INFO: ` or `ERROR: `. Informational lines can be switched
//! off in configuration (and ship disabled); error lines are always
//! written. A failed append is reported to `tracing` and otherwise ignored,
//! so the trace file can never take a request down with it.

use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Append-only `INFO: `/`ERROR: ` trace log.
#[derive(Debug, Clone)]
pub struct DiagnosticLog {
    path: PathBuf,
    info_enabled: bool,
}

impl DiagnosticLog {
    pub fn new(path: impl Into<PathBuf>, info_enabled: bool) -> Self {
        Self {
            path: path.into(),
            info_enabled,
        }
    }

    /// Append an informational line. Skipped entirely while the info toggle
    /// is off.
    pub async fn info(&self, message: &str) {
        if !self.info_enabled {
            return;
        }
        self.append("INFO", message).await;
    }

    /// Append an error line, regardless of the info toggle.
    pub async fn error(&self, message: &str) {
        self.append("ERROR", message).await;
    }

    async fn append(&self, level: &str, message: &str) {
        let line = format!("{level}: {message}\n");
        if let Err(e) = self.write_line(&line).await {
            tracing::warn!(
                path = %self.path.display(),
                "failed to append diagnostic line: {e}"
            );
        }
    }

    async fn write_line(&self, line: &str) -> std::io::Result<()> {
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn error_lines_written_while_info_disabled() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trace.log");
        let log = DiagnosticLog::new(&path, false);

        log.info("dropped").await;
        log.error("kept").await;

        let contents = fs::read_to_string(&path).await.unwrap();
        assert_eq!(contents, "ERROR: kept\n");
    }

    #[tokio::test]
    async fn info_lines_written_in_order_when_enabled() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trace.log");
        let log = DiagnosticLog::new(&path, true);

        log.info("one").await;
        log.error("two").await;
        log.info("three").await;

        let contents = fs::read_to_string(&path).await.unwrap();
        assert_eq!(contents, "INFO: one\nERROR: two\nINFO: three\n");
    }

    #[tokio::test]
    async fn appends_across_instances() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trace.log");

        DiagnosticLog::new(&path, true).info("first").await;
        DiagnosticLog::new(&path, true).info("second").await;

        let contents = fs::read_to_string(&path).await.unwrap();
        assert_eq!(contents, "INFO: first\nINFO: second\n");
    }

    #[tokio::test]
    async fn unwritable_path_does_not_panic() {
        let log = DiagnosticLog::new("/nonexistent-dir/trace.log", true);
        log.info("swallowed").await;
        log.error("swallowed").await;
    }
}
