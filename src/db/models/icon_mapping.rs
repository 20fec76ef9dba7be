use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the emoji↔icon mapping relation. Many-to-many: several emoji
/// may suggest the same icon and one emoji may have several candidates.
/// `selection_count` is the learning signal fed back into ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IconMapping {
    pub id: Option<i64>,
    pub emoji_unicode: String,
    pub library_name: String,
    pub icon_name: String,
    pub selection_count: i64,
    pub last_selected: DateTime<Utc>,
}
