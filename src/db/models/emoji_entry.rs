use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One emoji in the knowledge base: its keyword profile plus the context
/// words learned from confirmed user choices.
///
/// `keywords` and `context_words` are unordered sets conceptually; they are
/// stored as JSON arrays with `context_words` kept oldest-first so the
/// learning cap can evict deterministically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmojiEntry {
    /// Full codepoint sequence; unique key.
    pub unicode: String,
    pub common_name: String,
    pub keywords: Vec<String>,
    pub context_words: Vec<String>,
    pub usage_count: i64,
    pub last_used: Option<DateTime<Utc>>,
}

impl EmojiEntry {
    pub fn new(unicode: impl Into<String>, common_name: impl Into<String>) -> Self {
        Self {
            unicode: unicode.into(),
            common_name: common_name.into(),
            keywords: Vec::new(),
            context_words: Vec::new(),
            usage_count: 0,
            last_used: None,
        }
    }

    pub fn with_keywords(mut self, keywords: &[&str]) -> Self {
        self.keywords = keywords.iter().map(|s| s.to_string()).collect();
        self.keywords.sort();
        self.keywords.dedup();
        self
    }
}
