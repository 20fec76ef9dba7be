//! Off-thread suggestion computation.
//!
//! Ranking a large document's occurrence against the whole knowledge base
//! must never block the GUI event loop, so each request runs on a tokio
//! task and delivers its batch over a single-consumer channel. A new
//! request for the same occurrence supersedes the in-flight one, and
//! closing the document discards everything still pending.

use std::collections::HashMap;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::db::Database;
use crate::detector::EmojiOccurrence;
use crate::matcher::{rank_suggestions, IconSuggestion, MatcherConfig};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = false;

use crate::{log_error, log_info};

/// (line number, byte offset) — stable within one open document.
pub type OccurrenceKey = (usize, usize);

/// One delivered result. A store failure is carried through rather than
/// collapsed into an empty list, so the caller can tell "no candidates"
/// apart from "store unreachable".
pub struct SuggestionBatch {
    pub key: OccurrenceKey,
    pub emoji: String,
    pub result: Result<Vec<IconSuggestion>>,
}

pub struct SuggestionController {
    db: Database,
    results_tx: mpsc::Sender<SuggestionBatch>,
    inflight: HashMap<OccurrenceKey, (CancellationToken, JoinHandle<()>)>,
}

impl SuggestionController {
    /// Returns the controller and the receiving end of its result channel.
    pub fn new(db: Database) -> (Self, mpsc::Receiver<SuggestionBatch>) {
        let (results_tx, results_rx) = mpsc::channel(32);
        (
            Self {
                db,
                results_tx,
                inflight: HashMap::new(),
            },
            results_rx,
        )
    }

    /// Compute ranked suggestions for `occurrence`, superseding any
    /// in-flight request for the same occurrence.
    pub fn request(&mut self, occurrence: EmojiOccurrence, config: MatcherConfig) {
        let key = occurrence.key();

        if let Some((token, _)) = self.inflight.remove(&key) {
            log_info!("superseding in-flight suggestion request for {key:?}");
            token.cancel();
        }

        let token = CancellationToken::new();
        let handle = tokio::spawn(suggestion_task(
            occurrence,
            self.db.clone(),
            config,
            token.clone(),
            self.results_tx.clone(),
        ));
        self.inflight.insert(key, (token, handle));
    }

    pub fn pending(&self) -> usize {
        self.inflight.len()
    }

    /// Cancel everything in flight; called when the document is closed or
    /// replaced.
    pub async fn close_document(&mut self) {
        for (_, (token, _)) in self.inflight.iter() {
            token.cancel();
        }
        for (_, (_, handle)) in self.inflight.drain() {
            let _ = handle.await;
        }
    }

    /// Wait for all in-flight requests to settle without cancelling them.
    pub async fn drain(&mut self) {
        for (_, (_, handle)) in self.inflight.drain() {
            let _ = handle.await;
        }
    }
}

async fn suggestion_task(
    occurrence: EmojiOccurrence,
    db: Database,
    config: MatcherConfig,
    cancel_token: CancellationToken,
    results_tx: mpsc::Sender<SuggestionBatch>,
) {
    let key = occurrence.key();
    let emoji = occurrence.emoji.clone();

    let work = async {
        let entries = db.list_emojis().await?;
        let mappings = db.mappings_for_emoji(&occurrence.emoji).await?;
        Ok::<_, anyhow::Error>(rank_suggestions(&occurrence, &entries, &mappings, &config))
    };

    tokio::select! {
        _ = cancel_token.cancelled() => {
            log_info!("suggestion request for {key:?} cancelled");
        }
        result = work => {
            if let Err(err) = &result {
                log_error!("suggestion ranking failed for {key:?}: {err:?}");
            }
            if results_tx.send(SuggestionBatch { key, emoji, result }).await.is_err() {
                log_info!("suggestion consumer dropped before receiving {key:?}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::EmojiEntry;
    use crate::detector::detect_emojis;

    async fn seeded_db(dir: &std::path::Path) -> Database {
        let db = Database::new(dir.join("test.sqlite3")).unwrap();
        let entry = EmojiEntry::new("🚀", "rocket")
            .with_keywords(&["rocket", "launch", "space"]);
        db.upsert_emoji(&entry).await.unwrap();
        db
    }

    #[tokio::test]
    async fn delivers_ranked_batch_for_a_request() {
        let dir = tempfile::tempdir().unwrap();
        let db = seeded_db(dir.path()).await;
        let (mut controller, mut rx) = SuggestionController::new(db);

        let occ = detect_emojis("Launch the rocket 🚀 now").remove(0);
        controller.request(occ, MatcherConfig::default());
        controller.drain().await;

        let batch = rx.recv().await.expect("batch expected");
        assert_eq!(batch.emoji, "🚀");
        let suggestions = batch.result.unwrap();
        assert_eq!(suggestions[0].icon_name, "rocket");
        assert_eq!(controller.pending(), 0);
    }

    #[tokio::test]
    async fn newer_request_for_same_occurrence_wins() {
        let dir = tempfile::tempdir().unwrap();
        let db = seeded_db(dir.path()).await;
        let (mut controller, mut rx) = SuggestionController::new(db);

        // Same document position, different content: the second request
        // supersedes the first.
        let first = detect_emojis("🚀 one").remove(0);
        let mut second = detect_emojis("🎉 two").remove(0);
        second.line_number = first.line_number;
        second.byte_position = first.byte_position;

        controller.request(first, MatcherConfig::default());
        controller.request(second, MatcherConfig::default());
        assert_eq!(controller.pending(), 1);
        controller.drain().await;
        drop(controller);

        // The superseding request always lands; the superseded one may or
        // may not have finished before cancellation took effect.
        let mut delivered = Vec::new();
        while let Some(batch) = rx.recv().await {
            delivered.push(batch.emoji);
        }
        assert!(delivered.iter().any(|emoji| emoji == "🎉"));
        assert!(delivered.len() <= 2);
    }

    #[tokio::test]
    async fn store_failure_surfaces_as_an_error_batch_not_an_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let db = seeded_db(dir.path()).await;
        db.execute(|conn| {
            conn.execute_batch("DROP TABLE emojis")?;
            Ok(())
        })
        .await
        .unwrap();

        let (mut controller, mut rx) = SuggestionController::new(db);
        let occ = detect_emojis("Launch the rocket 🚀 now").remove(0);
        controller.request(occ, MatcherConfig::default());
        controller.drain().await;

        let batch = rx.recv().await.expect("batch expected");
        assert!(batch.result.is_err());
    }

    #[tokio::test]
    async fn closing_the_document_discards_in_flight_work() {
        let dir = tempfile::tempdir().unwrap();
        let db = seeded_db(dir.path()).await;
        let (mut controller, _rx) = SuggestionController::new(db);

        let occ = detect_emojis("Launch the rocket 🚀 now").remove(0);
        controller.request(occ, MatcherConfig::default());
        controller.close_document().await;

        assert_eq!(controller.pending(), 0);
    }
}
