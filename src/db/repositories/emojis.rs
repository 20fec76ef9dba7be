use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use crate::db::{
    connection::Database,
    helpers::{encode_word_list, parse_optional_datetime, parse_word_list},
    models::EmojiEntry,
};

fn row_to_entry(row: &Row) -> Result<EmojiEntry> {
    let keywords: String = row.get("keywords")?;
    let context_words: String = row.get("context_words")?;
    let last_used: Option<String> = row.get("last_used")?;

    Ok(EmojiEntry {
        unicode: row.get("unicode")?,
        common_name: row.get("common_name")?,
        keywords: parse_word_list(&keywords, "keywords")?,
        context_words: parse_word_list(&context_words, "context_words")?,
        usage_count: row.get("usage_count")?,
        last_used: parse_optional_datetime(last_used, "last_used")?,
    })
}

/// Starter knowledge base for a fresh store. Deliberately small; the full
/// emoji catalog is expected to be imported by the embedding application.
const STARTER_ENTRIES: &[(&str, &str, &[&str])] = &[
    ("🚀", "rocket", &["rocket", "launch", "deploy", "space", "fast"]),
    ("🔥", "flame", &["fire", "flame", "hot", "burn", "trending"]),
    ("✅", "check", &["check", "done", "complete", "success", "yes"]),
    ("❌", "cross", &["cross", "error", "fail", "wrong", "delete"]),
    ("⚠️", "warning", &["warning", "caution", "alert", "danger"]),
    ("💡", "lightbulb", &["idea", "tip", "hint", "light", "insight"]),
    ("📝", "memo", &["note", "memo", "write", "document", "edit"]),
    ("🐛", "bug", &["bug", "issue", "defect", "insect"]),
    ("🎉", "party popper", &["party", "celebrate", "release", "tada"]),
    ("⭐", "star", &["star", "favorite", "featured", "rating"]),
    ("🔒", "lock", &["lock", "secure", "security", "private"]),
    ("📚", "books", &["books", "docs", "documentation", "reading", "library"]),
    ("⚡", "zap", &["zap", "lightning", "performance", "speed", "power"]),
    ("🛠️", "tools", &["tools", "build", "setup", "configure", "maintenance"]),
];

impl Database {
    /// Insert a new emoji or update its name and keywords. Learned context
    /// words and the usage counter survive re-seeding.
    pub async fn upsert_emoji(&self, entry: &EmojiEntry) -> Result<()> {
        let record = entry.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO emojis (unicode, common_name, keywords, context_words, usage_count, last_used)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT (unicode) DO UPDATE SET
                     common_name = excluded.common_name,
                     keywords = excluded.keywords",
                params![
                    record.unicode,
                    record.common_name,
                    encode_word_list(&record.keywords)?,
                    encode_word_list(&record.context_words)?,
                    record.usage_count,
                    record.last_used.map(|dt| dt.to_rfc3339()),
                ],
            )?;
            Ok(())
        })
        .await
    }

    /// Seed the starter entries into an empty or partially filled store.
    /// Entries already present (seeded or user-edited) are left untouched.
    /// Returns the number of entries inserted.
    pub async fn seed_starter_entries(&self) -> Result<usize> {
        self.execute(|conn| {
            let mut inserted = 0;
            for (unicode, name, keywords) in STARTER_ENTRIES {
                let keywords: Vec<String> =
                    keywords.iter().map(|kw| kw.to_string()).collect();
                inserted += conn.execute(
                    "INSERT OR IGNORE INTO emojis (unicode, common_name, keywords, context_words, usage_count, last_used)
                     VALUES (?1, ?2, ?3, '[]', 0, NULL)",
                    params![unicode, name, encode_word_list(&keywords)?],
                )?;
            }
            Ok(inserted)
        })
        .await
    }

    pub async fn get_emoji(&self, unicode: &str) -> Result<Option<EmojiEntry>> {
        let unicode = unicode.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT unicode, common_name, keywords, context_words, usage_count, last_used
                 FROM emojis
                 WHERE unicode = ?1",
            )?;

            let mut rows = stmt.query(params![unicode])?;
            match rows.next()? {
                Some(row) => Ok(Some(row_to_entry(row)?)),
                None => Ok(None),
            }
        })
        .await
    }

    /// All entries, most used first; unicode ascending breaks ties so the
    /// order is deterministic.
    pub async fn list_emojis(&self) -> Result<Vec<EmojiEntry>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT unicode, common_name, keywords, context_words, usage_count, last_used
                 FROM emojis
                 ORDER BY usage_count DESC, unicode ASC",
            )?;

            let mut rows = stmt.query([])?;
            let mut entries = Vec::new();
            while let Some(row) = rows.next()? {
                entries.push(row_to_entry(row)?);
            }

            Ok(entries)
        })
        .await
    }

    pub async fn update_emoji_keywords(
        &self,
        unicode: &str,
        keywords: Vec<String>,
    ) -> Result<()> {
        let unicode = unicode.to_string();
        self.execute(move |conn| {
            let rows_affected = conn.execute(
                "UPDATE emojis SET keywords = ?1 WHERE unicode = ?2",
                params![encode_word_list(&keywords)?, unicode],
            )?;

            if rows_affected == 0 {
                return Err(anyhow::anyhow!("emoji not found: {unicode}"));
            }

            Ok(())
        })
        .await
    }

    /// Delete an emoji and its mapping rows.
    pub async fn delete_emoji(&self, unicode: &str) -> Result<()> {
        let unicode = unicode.to_string();
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "DELETE FROM icon_mappings WHERE emoji_unicode = ?1",
                params![unicode],
            )?;
            tx.execute("DELETE FROM emojis WHERE unicode = ?1", params![unicode])?;
            tx.commit()?;
            Ok(())
        })
        .await
    }

    pub async fn increment_emoji_usage(
        &self,
        unicode: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let unicode = unicode.to_string();
        self.execute(move |conn| {
            conn.execute(
                "UPDATE emojis
                 SET usage_count = usage_count + 1,
                     last_used = ?1
                 WHERE unicode = ?2",
                params![now.to_rfc3339(), unicode],
            )?;
            Ok(())
        })
        .await
    }

    /// Append learned context words to an emoji, bounded by `cap`.
    ///
    /// The stored array is ordered oldest-first. Re-learning an existing
    /// word moves it to the newest end; on overflow the oldest words are
    /// evicted from the front. Deterministic for a given input order.
    pub async fn record_learned_context(
        &self,
        unicode: &str,
        words: Vec<String>,
        cap: usize,
    ) -> Result<()> {
        let unicode = unicode.to_string();
        self.execute(move |conn| {
            let raw: Option<String> = conn
                .query_row(
                    "SELECT context_words FROM emojis WHERE unicode = ?1",
                    params![unicode],
                    |row| row.get(0),
                )
                .optional()?;

            let Some(raw) = raw else {
                return Err(anyhow::anyhow!("emoji not found: {unicode}"));
            };

            let mut learned = parse_word_list(&raw, "context_words")?;
            for word in words {
                let word = word.to_lowercase();
                learned.retain(|existing| *existing != word);
                learned.push(word);
            }
            if learned.len() > cap {
                learned.drain(..learned.len() - cap);
            }

            conn.execute(
                "UPDATE emojis SET context_words = ?1 WHERE unicode = ?2",
                params![encode_word_list(&learned)?, unicode],
            )?;
            Ok(())
        })
        .await
    }
}
