use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored playthrough row.
///
/// `payload` stays NULL between the initialization request and the first
/// upload for the id.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Playthrough {
    /// Client-supplied identifier, stored verbatim
    pub id: String,
    /// Raw uploaded recording
    pub payload: Option<Vec<u8>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Playthrough {
    /// Whether an upload has landed for this row yet.
    pub fn has_payload(&self) -> bool {
        self.payload.is_some()
    }
}
