//! In-memory tracker for the currently open document session.
//!
//! The tracker is an explicit value: an ordered list of usage records plus
//! the session identity, mirrored to the store by the caller. Keeping it a
//! plain value means duplicate detection can be exercised over any session
//! without a store or a GUI, and several sessions can be tested in
//! isolation. One document is edited by one session at a time.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::models::{DocumentSession, IconUsage};

#[derive(Debug, Default)]
pub struct SessionTracker {
    current: Option<DocumentSession>,
    records: Vec<IconUsage>,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a session for `document_path`. Any prior session is finished
    /// first; its records are discarded from memory (the store keeps them).
    pub fn begin(&mut self, document_path: &str, now: DateTime<Utc>) -> DocumentSession {
        self.finish(now);

        let session = DocumentSession {
            id: Uuid::new_v4().to_string(),
            document_path: document_path.to_string(),
            started_at: now,
            ended_at: None,
        };
        self.current = Some(session.clone());
        session
    }

    pub fn current(&self) -> Option<&DocumentSession> {
        self.current.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// Append a usage record for the open session. Returns `None` when no
    /// session is active.
    pub fn record(
        &mut self,
        emoji_unicode: &str,
        icon_name: &str,
        context_text: &str,
        line_number: usize,
        applied: bool,
    ) -> Option<&IconUsage> {
        let session = self.current.as_ref()?;

        self.records.push(IconUsage {
            id: None,
            session_id: session.id.clone(),
            emoji_unicode: emoji_unicode.to_string(),
            icon_name: icon_name.to_string(),
            context_text: context_text.to_string(),
            line_number,
            applied,
        });
        self.records.last()
    }

    /// Records for one icon, in insertion order. This is the slice the
    /// duplicate check compares against.
    pub fn records_for_icon(&self, icon_name: &str) -> Vec<IconUsage> {
        self.records
            .iter()
            .filter(|record| record.icon_name == icon_name)
            .cloned()
            .collect()
    }

    pub fn all_records(&self) -> &[IconUsage] {
        &self.records
    }

    /// Close the current session, returning it with `ended_at` set.
    pub fn finish(&mut self, now: DateTime<Utc>) -> Option<DocumentSession> {
        let mut session = self.current.take()?;
        session.ended_at = Some(now);
        self.records.clear();
        Some(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_accumulate_in_order_and_filter_by_icon() {
        let mut tracker = SessionTracker::new();
        tracker.begin("/tmp/doc.md", Utc::now());

        tracker.record("🚀", "rocket", "Heading: Getting Started", 1, true);
        tracker.record("🔥", "flame", "fix the fire", 4, true);
        tracker.record("🚀", "rocket", "Security hardening", 9, false);

        assert_eq!(tracker.all_records().len(), 3);
        let rockets = tracker.records_for_icon("rocket");
        assert_eq!(rockets.len(), 2);
        assert_eq!(rockets[0].line_number, 1);
        assert_eq!(rockets[1].line_number, 9);
    }

    #[test]
    fn recording_without_a_session_is_rejected() {
        let mut tracker = SessionTracker::new();
        assert!(tracker.record("🚀", "rocket", "ctx", 1, true).is_none());
    }

    #[test]
    fn beginning_a_new_session_clears_the_old_one() {
        let mut tracker = SessionTracker::new();
        let first = tracker.begin("/tmp/a.md", Utc::now());
        tracker.record("🚀", "rocket", "ctx", 1, true);

        let second = tracker.begin("/tmp/b.md", Utc::now());

        assert_ne!(first.id, second.id);
        assert!(tracker.all_records().is_empty());
        assert_eq!(
            tracker.current().map(|s| s.document_path.as_str()),
            Some("/tmp/b.md")
        );
    }

    #[test]
    fn finish_stamps_end_time_and_deactivates() {
        let mut tracker = SessionTracker::new();
        tracker.begin("/tmp/doc.md", Utc::now());

        let finished = tracker.finish(Utc::now()).expect("active session");
        assert!(finished.ended_at.is_some());
        assert!(!tracker.is_active());
        assert!(tracker.finish(Utc::now()).is_none());
    }
}
