//! Duplicate-usage evaluation for the current document session.
//!
//! Reusing one icon for several emoji occurrences is fine when the contexts
//! agree; when they diverge below the configured similarity threshold the
//! assignment is flagged as a probable duplicate. The flag is advisory: the
//! caller must surface it and get an explicit acknowledgment, never block or
//! silently resolve. Records are immutable values, so changing the threshold
//! only affects future evaluations.

use serde::{Deserialize, Serialize};

use crate::db::models::IconUsage;
use crate::detector::{self, EmojiOccurrence};
use crate::matcher::config::MatcherConfig;
use crate::matcher::scoring::similarity_ratio;

/// Advisory warning: the same icon is being reused for contextually
/// dissimilar content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateWarning {
    pub icon_name: String,
    pub current_context: String,
    pub current_line: usize,
    pub existing_context: String,
    pub existing_line: usize,
    /// 0-100 similarity between the two normalized contexts.
    pub similarity: u8,
    /// Contexts are very different (below the critical cutoff).
    pub critical: bool,
}

/// Evaluate whether assigning `icon_name` to `occurrence` conflicts with a
/// prior usage in `records`.
///
/// All prior usages of the icon are compared; when several fall below the
/// threshold the least-similar one is reported (ties keep the earliest
/// record). `None` means consistent reuse or a first use.
pub fn evaluate_duplicate(
    icon_name: &str,
    occurrence: &EmojiOccurrence,
    records: &[IconUsage],
    config: &MatcherConfig,
) -> Option<DuplicateWarning> {
    let current_context = detector::context_summary(occurrence);
    let normalized_current = detector::normalize_context(&current_context);

    let mut worst: Option<(&IconUsage, u8)> = None;
    for record in records.iter().filter(|r| r.icon_name == icon_name) {
        let normalized_existing = detector::normalize_context(&record.context_text);
        let similarity = similarity_ratio(&normalized_current, &normalized_existing);
        if worst.map_or(true, |(_, w)| similarity < w) {
            worst = Some((record, similarity));
        }
    }

    let (record, similarity) = worst?;
    if similarity >= config.similarity_threshold {
        return None;
    }

    Some(DuplicateWarning {
        icon_name: icon_name.to_string(),
        current_context,
        current_line: occurrence.line_number,
        existing_context: record.context_text.clone(),
        existing_line: record.line_number,
        similarity,
        critical: similarity < config.critical_similarity,
    })
}
