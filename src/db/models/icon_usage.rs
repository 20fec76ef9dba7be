use serde::{Deserialize, Serialize};

/// One icon assignment recorded during a document session. These rows feed
/// duplicate detection; they are immutable once written, so threshold
/// changes never rewrite history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IconUsage {
    pub id: Option<i64>,
    pub session_id: String,
    pub emoji_unicode: String,
    pub icon_name: String,
    /// Context summary captured at assignment time.
    pub context_text: String,
    pub line_number: usize,
    /// Whether the substitution was actually applied to the document.
    pub applied: bool,
}
