//! Submission intake handler.
//!
//! The whole wire contract lives here: one POST endpoint, empty response
//! bodies, and the status code as the only signal. The two-phase protocol
//! (initialize without a file, then upload with one) decides INSERT vs
//! UPDATE purely on file presence; row existence is never checked first.

use axum::extract::State;
use axum::http::StatusCode;

use crate::AppState;
use crate::api::models::Submission;
use crate::config::ConnectFailurePolicy;
use crate::db::handlers::Playthroughs;
use crate::errors::{Error, Result};

/// Accept a playthrough submission.
///
/// Without a file part this initializes a bare row for the id. With one, it
/// overwrites the payload of the already-initialized row; if no row exists
/// the update matches nothing and the request is still a 200.
#[utoipa::path(
    post,
    path = "/submit-playthrough",
    tag = "playthroughs",
    summary = "Submit a playthrough",
    description = "Form submission with an `id` field and, for uploads, a `playthrough` file part. \
                   Multipart or urlencoded; responses always have an empty body.",
    request_body(content_type = "multipart/form-data", description = "Fields: `id` (text), `playthrough` (file, optional). Unknown fields are ignored."),
    responses(
        (status = 200, description = "Submission accepted"),
        (status = 400, description = "Unreadable form body"),
        (status = 502, description = "Storage backend unreachable"),
        (status = 513, description = "Persistence statement failed"),
    )
)]
#[tracing::instrument(skip_all, fields(id = %submission.id, has_file = submission.playthrough.is_some()))]
pub async fn submit_playthrough(
    State(state): State<AppState>,
    submission: Submission,
) -> Result<StatusCode> {
    let diag = &state.diagnostics;
    diag.info("Start.").await;

    diag.info("Attempt to connect to database.").await;
    let mut conn = match state.db.acquire().await {
        Ok(conn) => conn,
        Err(e) => {
            return match state.config.on_connect_failure {
                ConnectFailurePolicy::Report => {
                    diag.error(&format!("Connection failed: {e}")).await;
                    Err(Error::StorageUnavailable { source: e })
                }
                ConnectFailurePolicy::Silent => {
                    diag.info(&format!("Connection failed: {e}")).await;
                    diag.info("End.").await;
                    tracing::error!("storage backend unreachable, answering 200 per policy: {e}");
                    Ok(StatusCode::OK)
                }
            };
        }
    };
    diag.info("Connection succeeded!").await;

    diag.info(&format!("We got id: {}", submission.id)).await;

    let mut repo = Playthroughs::new(&mut conn);
    match &submission.playthrough {
        Some(file) => {
            diag.info("Found file.").await;
            if let Some(name) = &file.name {
                diag.info(&format!("We got file name: {name}")).await;
            }
            diag.info(&format!("Read the file contents ({} bytes).", file.content.len()))
                .await;

            match repo.attach_payload(&submission.id, &file.content).await {
                // A zero-row update is an accepted no-op: uploads for ids
                // that were never initialized store nothing.
                Ok(updated) => {
                    if !updated {
                        tracing::warn!("payload update matched no row");
                    }
                }
                Err(e) => {
                    diag.error(&format!("Error inserting data: {e}")).await;
                    return Err(e.into());
                }
            }
        }
        None => {
            if let Err(e) = repo.create(&submission.id).await {
                diag.error(&format!("Error inserting data: {e}")).await;
                return Err(e.into());
            }
        }
    }

    diag.info("Data successfully inserted!").await;
    diag.info("End.").await;

    Ok(StatusCode::OK)
}

/// Non-POST requests on the endpoint are acknowledged with an empty 200 and
/// touch nothing: no statement, no diagnostic lines. The collector this
/// replaces traced `Start.` before looking at the method; here the trace
/// records POST submissions only.
pub async fn ignore_non_post() -> StatusCode {
    StatusCode::OK
}
