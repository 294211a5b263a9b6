//! Request model for the submission endpoint.

use axum::extract::{Form, FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use bytes::Bytes;
use std::collections::HashMap;

use crate::errors::Error;

/// One decoded submission: the row identifier plus the optional upload.
///
/// Clients send either `multipart/form-data` (the only shape that can carry
/// a file) or `application/x-www-form-urlencoded`. There is no validation on
/// `id`; a missing field decodes to the empty string. Fields other than `id`
/// and `playthrough` are accepted and ignored; game clients also send `user`
/// and `version`, which the relay does not store.
#[derive(Debug, Clone, Default)]
pub struct Submission {
    /// Row identifier, verbatim from the form
    pub id: String,
    /// Uploaded recording, present only on file-bearing requests
    pub playthrough: Option<UploadedFile>,
}

/// An uploaded `playthrough` file part.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client-supplied file name, if any
    pub name: Option<String>,
    /// Raw file bytes
    pub content: Bytes,
}

impl Submission {
    fn from_form_fields(fields: HashMap<String, String>) -> Self {
        Self {
            id: fields.get("id").cloned().unwrap_or_default(),
            playthrough: None,
        }
    }

    async fn from_multipart(mut multipart: Multipart) -> Result<Self, Error> {
        let mut submission = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(|e| Error::BadRequest {
            message: format!("Failed to parse multipart data: {e}"),
        })? {
            let field_name = field.name().unwrap_or("").to_string();
            match field_name.as_str() {
                "id" => {
                    submission.id = field.text().await.map_err(|e| Error::BadRequest {
                        message: format!("Failed to read id field: {e}"),
                    })?;
                }
                // Only a part carrying a filename counts as an upload; a bare
                // text field named `playthrough` is ignored like any other.
                "playthrough" if field.file_name().is_some() => {
                    let name = field.file_name().map(|s| s.to_string());
                    let content = field.bytes().await.map_err(|e| Error::BadRequest {
                        message: format!("Failed to read playthrough file: {e}"),
                    })?;
                    submission.playthrough = Some(UploadedFile { name, content });
                }
                _ => {
                    // Ignore unknown fields (user, version, ...)
                }
            }
        }

        Ok(submission)
    }
}

impl<S> FromRequest<S> for Submission
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart =
                Multipart::from_request(req, state)
                    .await
                    .map_err(|e| Error::BadRequest {
                        message: format!("Invalid multipart request: {e}"),
                    })?;
            Self::from_multipart(multipart).await
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|e| Error::BadRequest {
                    message: format!("Invalid form body: {e}"),
                })?;
            Ok(Self::from_form_fields(fields))
        } else {
            // Anything else decodes to the empty submission. The endpoint has
            // always inserted an empty id for bodies it cannot read, and
            // clients that send nothing rely on the 200.
            Ok(Self::default())
        }
    }
}
