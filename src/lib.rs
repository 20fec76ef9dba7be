//! Core engine for replacing Markdown emoji with icon references.
//!
//! The crate detects emoji occurrences in a document, ranks icon candidates
//! against a persistent mapping store, flags contextually inconsistent icon
//! reuse within a session, and rewrites the document in place. A GUI shell
//! drives everything through [`AppCore`]; every piece underneath is also
//! usable on its own.

pub mod db;
pub mod detector;
pub mod error;
pub mod files;
pub mod matcher;
pub mod rewriter;
pub mod session;
pub mod settings;
pub mod suggest;
pub mod utils;

use std::path::Path;

use chrono::Utc;
use tokio::sync::{mpsc, Mutex};

pub use db::{Database, DocumentSession, EmojiEntry, IconMapping, IconUsage};
pub use detector::{detect_emojis, EmojiOccurrence};
pub use error::{CoreError, CoreResult};
pub use files::MarkdownDocument;
pub use matcher::{DuplicateWarning, IconSuggestion, MatcherConfig, SuggestionSource};
pub use rewriter::{Replacement, RewriteOutcome};
pub use session::SessionTracker;
pub use settings::{SettingsStore, UserSettings};
pub use suggest::{SuggestionBatch, SuggestionController};
pub use utils::logging::init_logging;

const DB_FILE: &str = "iconmark.sqlite3";
const SETTINGS_FILE: &str = "settings.json";

/// Aggregate wiring the store, settings, session tracker, and suggestion
/// controller behind one handle.
///
/// One document is open at a time; opening a new one replaces the previous
/// session. Suggestion batches arrive on the receiver returned by [`new`],
/// everything else is request/response.
///
/// [`new`]: AppCore::new
pub struct AppCore {
    db: Database,
    settings: SettingsStore,
    tracker: Mutex<SessionTracker>,
    suggestions: Mutex<SuggestionController>,
    document: Mutex<Option<MarkdownDocument>>,
}

impl AppCore {
    /// Open (or create) the store and settings under `data_dir`.
    pub fn new(data_dir: &Path) -> CoreResult<(Self, mpsc::Receiver<SuggestionBatch>)> {
        let db = Database::new(data_dir.join(DB_FILE))?;
        let settings = SettingsStore::new(data_dir.join(SETTINGS_FILE))?;
        let (suggestions, results_rx) = SuggestionController::new(db.clone());

        Ok((
            Self {
                db,
                settings,
                tracker: Mutex::new(SessionTracker::new()),
                suggestions: Mutex::new(suggestions),
                document: Mutex::new(None),
            },
            results_rx,
        ))
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    /// Ranking configuration with the user's similarity threshold applied.
    fn matcher_config(&self) -> MatcherConfig {
        MatcherConfig::default()
            .with_similarity_threshold(self.settings.current().similarity_threshold)
    }

    /// Load a document, start a session for it, and return its detected
    /// emoji occurrences. Any previously open document is replaced.
    pub async fn open_document(&self, path: &Path) -> CoreResult<Vec<EmojiOccurrence>> {
        let document = MarkdownDocument::load(path)?;
        let occurrences = detector::detect_emojis(document.content());

        self.suggestions.lock().await.close_document().await;

        let now = Utc::now();
        let mut tracker = self.tracker.lock().await;
        if let Some(previous) = tracker.current() {
            let id = previous.id.clone();
            self.db.end_session(&id, now).await?;
        }
        let session = tracker.begin(&path.to_string_lossy(), now);
        self.db.insert_session(&session).await?;

        *self.document.lock().await = Some(document);
        Ok(occurrences)
    }

    pub async fn document_content(&self) -> Option<String> {
        self.document
            .lock()
            .await
            .as_ref()
            .map(|doc| doc.content().to_string())
    }

    /// Queue suggestion ranking for `occurrence`; the batch arrives on the
    /// result channel. A repeat request for the same occurrence supersedes
    /// the earlier one.
    pub async fn request_suggestions(&self, occurrence: EmojiOccurrence) {
        let config = self.matcher_config();
        self.suggestions.lock().await.request(occurrence, config);
    }

    /// Advisory duplicate check against this session's recorded usages.
    pub async fn check_duplicate(
        &self,
        icon_name: &str,
        occurrence: &EmojiOccurrence,
    ) -> Option<DuplicateWarning> {
        let config = self.matcher_config();
        let records = self.tracker.lock().await.records_for_icon(icon_name);
        matcher::evaluate_duplicate(icon_name, occurrence, &records, &config)
    }

    /// Commit the user's icon choice for an occurrence.
    ///
    /// This is the learning step: the emoji's context words, usage count,
    /// and emoji-to-icon mapping are all updated, and the usage is recorded
    /// against the open session for later duplicate checks. On success the
    /// occurrence is marked resolved, so a replacement plan can be built
    /// from it (`rewriter::plan_for_resolved`).
    pub async fn confirm_selection(
        &self,
        occurrence: &mut EmojiOccurrence,
        icon_name: &str,
        library_name: &str,
    ) -> CoreResult<IconUsage> {
        let mut tracker = self.tracker.lock().await;
        if !tracker.is_active() {
            return Err(CoreError::NoActiveSession);
        }

        let now = Utc::now();
        let config = self.matcher_config();
        let unicode = occurrence.emoji.as_str();

        if self.db.get_emoji(unicode).await?.is_none() {
            let name = occurrence
                .name
                .clone()
                .unwrap_or_else(|| occurrence.emoji.clone());
            self.db.upsert_emoji(&EmojiEntry::new(unicode, name.as_str())).await?;
        }

        let keywords = detector::extract_keywords(occurrence);
        self.db
            .record_learned_context(unicode, keywords, config.learned_cap)
            .await?;
        self.db.increment_emoji_usage(unicode, now).await?;
        self.db
            .record_icon_selection(unicode, library_name, icon_name, now)
            .await?;

        let context = detector::context_summary(occurrence);
        let mut usage = tracker
            .record(unicode, icon_name, &context, occurrence.line_number, true)
            .cloned()
            .ok_or(CoreError::NoActiveSession)?;
        usage.id = Some(self.db.record_icon_usage(&usage).await?);
        occurrence.resolved_icon = Some(icon_name.to_string());
        Ok(usage)
    }

    /// Apply a replacement plan to the open document and save it, honoring
    /// the user's backup preference. Stale replacements are skipped and
    /// reported, never applied at the wrong offset.
    pub async fn apply_and_save(&self, plan: &[Replacement]) -> CoreResult<RewriteOutcome> {
        let mut guard = self.document.lock().await;
        let document = guard.as_mut().ok_or(CoreError::NoActiveSession)?;

        let outcome = rewriter::apply_replacements(document.content(), plan);
        document.set_content(outcome.text.clone());
        document.save(self.settings.current().auto_backup)?;
        Ok(outcome)
    }

    /// End the open session, cancel pending suggestion work, and drop the
    /// document. Returns the finished session, if one was open.
    pub async fn close_document(&self) -> CoreResult<Option<DocumentSession>> {
        self.suggestions.lock().await.close_document().await;

        let finished = self.tracker.lock().await.finish(Utc::now());
        if let Some(session) = &finished {
            let ended = session.ended_at.unwrap_or_else(Utc::now);
            self.db.end_session(&session.id, ended).await?;
        }

        *self.document.lock().await = None;
        Ok(finished)
    }
}
