use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The lifetime of one open document, from load to close. Duplicate-icon
/// usage is tracked within a single session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSession {
    pub id: String,
    pub document_path: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}
