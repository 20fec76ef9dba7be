//! Emoji detection and context extraction for Markdown documents.
//!
//! Detection is a pure function of the input text: running it twice over the
//! same document yields identical occurrence lists. Scanning walks grapheme
//! clusters so multi-codepoint sequences (skin tones, ZWJ families, flags,
//! keycaps) count as exactly one occurrence.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Bounded context window captured around each occurrence.
const CONTEXT_BEFORE_MAX_CHARS: usize = 50;
const CONTEXT_AFTER_MAX_CHARS: usize = 50;

/// Shorter window used for human-readable summaries.
const CONTEXT_BEFORE_PREVIEW_CHARS: usize = 30;
const CONTEXT_AFTER_PREVIEW_CHARS: usize = 30;

/// Tokens this short carry no matching signal.
const MIN_KEYWORD_CHARS: usize = 3;

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of",
    "with", "by", "from", "as", "is", "was", "are", "be", "this", "that",
];

/// One detected emoji instance at a specific document location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmojiOccurrence {
    /// The full grapheme cluster, including ZWJ/variation selectors.
    pub emoji: String,
    /// Canonical Unicode name, when known.
    pub name: Option<String>,
    /// 1-based line number in the document.
    pub line_number: usize,
    /// Byte offset of the cluster within its line.
    pub byte_position: usize,
    pub context_before: String,
    pub context_after: String,
    pub full_line: String,
    pub in_heading: bool,
    pub heading_level: u8,
    /// Icon chosen for this occurrence, absent until the user resolves it.
    pub resolved_icon: Option<String>,
}

impl EmojiOccurrence {
    /// Stable key identifying this occurrence within one document.
    pub fn key(&self) -> (usize, usize) {
        (self.line_number, self.byte_position)
    }
}

/// Classify a grapheme cluster as a Unicode emoji.
///
/// The emoji table indexes fully-qualified sequences; documents contain both
/// qualified and unqualified forms, so the lookup also tries the cluster with
/// the trailing VS-16 stripped and, for single scalars, with VS-16 appended.
fn emoji_for_cluster(cluster: &str) -> Option<&'static emojis::Emoji> {
    if let Some(found) = emojis::get(cluster) {
        return Some(found);
    }

    let trimmed = cluster.trim_end_matches('\u{FE0F}');
    if trimmed != cluster {
        if let Some(found) = emojis::get(trimmed) {
            return Some(found);
        }
    }

    if cluster.chars().count() == 1 && !cluster.is_ascii() {
        let qualified = format!("{cluster}\u{FE0F}");
        if let Some(found) = emojis::get(&qualified) {
            return Some(found);
        }
    }

    None
}

fn is_emoji_cluster(cluster: &str) -> bool {
    emoji_for_cluster(cluster).is_some()
}

/// Heading level for a Markdown line: `# ` through `###### `, else 0.
fn heading_level(line: &str) -> u8 {
    let hashes = line.chars().take_while(|&c| c == '#').count();
    if (1..=6).contains(&hashes)
        && line[hashes..]
            .chars()
            .next()
            .map(|c| c == ' ' || c == '\t')
            .unwrap_or(false)
    {
        hashes as u8
    } else {
        0
    }
}

/// Detect all emoji in `text` with their surrounding context, in document
/// order.
pub fn detect_emojis(text: &str) -> Vec<EmojiOccurrence> {
    let mut occurrences = Vec::new();

    for (line_idx, line) in text.lines().enumerate() {
        let level = heading_level(line);

        for (byte_pos, cluster) in line.grapheme_indices(true) {
            let Some(emoji) = emoji_for_cluster(cluster) else {
                continue;
            };

            occurrences.push(EmojiOccurrence {
                emoji: cluster.to_string(),
                name: Some(emoji.name().to_string()),
                line_number: line_idx + 1,
                byte_position: byte_pos,
                context_before: context_before(line, byte_pos, CONTEXT_BEFORE_MAX_CHARS),
                context_after: context_after(
                    line,
                    byte_pos + cluster.len(),
                    CONTEXT_AFTER_MAX_CHARS,
                ),
                full_line: line.to_string(),
                in_heading: level > 0,
                heading_level: level,
                resolved_icon: None,
            });
        }
    }

    occurrences
}

fn context_before(line: &str, byte_pos: usize, max_chars: usize) -> String {
    let head = &line[..byte_pos];
    let chars: Vec<char> = head.chars().collect();
    let start = chars.len().saturating_sub(max_chars);
    chars[start..].iter().collect::<String>().trim().to_string()
}

fn context_after(line: &str, byte_pos: usize, max_chars: usize) -> String {
    let tail = &line[byte_pos..];
    tail.chars()
        .take(max_chars)
        .collect::<String>()
        .trim()
        .to_string()
}

/// Remove all emoji clusters from `text`.
pub fn remove_emojis(text: &str) -> String {
    text.graphemes(true)
        .filter(|cluster| !is_emoji_cluster(cluster))
        .collect()
}

fn word_tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(|token| token.to_lowercase())
        .collect()
}

/// Extract lowercase keyword tokens from an occurrence's context for
/// matching. Heading occurrences use the full heading text; body occurrences
/// use the windows on either side. Stop-words and short tokens are dropped.
pub fn extract_keywords(occurrence: &EmojiOccurrence) -> Vec<String> {
    let source = if occurrence.in_heading {
        remove_emojis(strip_heading_markers(&occurrence.full_line))
    } else {
        let joined = format!(
            "{} {}",
            occurrence.context_before, occurrence.context_after
        );
        remove_emojis(&joined)
    };

    word_tokens(&source)
        .into_iter()
        .filter(|token| {
            token.chars().count() >= MIN_KEYWORD_CHARS
                && !STOP_WORDS.contains(&token.as_str())
        })
        .collect()
}

fn strip_heading_markers(line: &str) -> &str {
    let hashes = line.chars().take_while(|&c| c == '#').count();
    if (1..=6).contains(&hashes) {
        line[hashes..].trim_start()
    } else {
        line
    }
}

/// Human-readable context summary for display and for session usage records.
pub fn context_summary(occurrence: &EmojiOccurrence) -> String {
    if occurrence.in_heading {
        format!(
            "Heading: {}",
            strip_heading_markers(&occurrence.full_line).trim()
        )
    } else {
        let before: String = {
            let chars: Vec<char> = occurrence.context_before.chars().collect();
            let start = chars.len().saturating_sub(CONTEXT_BEFORE_PREVIEW_CHARS);
            chars[start..].iter().collect()
        };
        let after: String = occurrence
            .context_after
            .chars()
            .take(CONTEXT_AFTER_PREVIEW_CHARS)
            .collect();
        format!("{} {} {}", before, occurrence.emoji, after)
            .trim()
            .to_string()
    }
}

/// Normalize context text for duplicate comparison: emoji and Markdown
/// formatting stripped, lowercased, punctuation removed, whitespace
/// collapsed.
pub fn normalize_context(context: &str) -> String {
    let without_emoji = remove_emojis(context);
    let cleaned: String = without_emoji
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();
    cleaned
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Unique emoji clusters in first-seen order.
pub fn unique_emojis(occurrences: &[EmojiOccurrence]) -> Vec<String> {
    let mut seen = Vec::new();
    for occurrence in occurrences {
        if !seen.contains(&occurrence.emoji) {
            seen.push(occurrence.emoji.clone());
        }
    }
    seen
}

/// Group occurrences by emoji cluster, preserving document order within each
/// group.
pub fn group_by_emoji(
    occurrences: &[EmojiOccurrence],
) -> HashMap<String, Vec<EmojiOccurrence>> {
    let mut grouped: HashMap<String, Vec<EmojiOccurrence>> = HashMap::new();
    for occurrence in occurrences {
        grouped
            .entry(occurrence.emoji.clone())
            .or_default()
            .push(occurrence.clone());
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_basic_emoji_with_position() {
        let results = detect_emojis("Hello 😊 world!");

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].emoji, "😊");
        assert_eq!(results[0].line_number, 1);
        assert_eq!(results[0].byte_position, 6);
        assert!(results[0].context_before.contains("Hello"));
        assert!(results[0].context_after.contains("world"));
    }

    #[test]
    fn detects_multiple_in_document_order() {
        let results = detect_emojis("🚀 Launch 🎉 Party 🎊");

        let found: Vec<&str> = results.iter().map(|o| o.emoji.as_str()).collect();
        assert_eq!(found, vec!["🚀", "🎉", "🎊"]);
    }

    #[test]
    fn classifies_headings_with_level() {
        let results = detect_emojis("# Main Title 🚀\n## Subtitle 📝\nbody 🔥");

        assert_eq!(results.len(), 3);
        assert!(results[0].in_heading);
        assert_eq!(results[0].heading_level, 1);
        assert!(results[1].in_heading);
        assert_eq!(results[1].heading_level, 2);
        assert!(!results[2].in_heading);
        assert_eq!(results[2].heading_level, 0);
    }

    #[test]
    fn hash_without_space_is_not_a_heading() {
        let results = detect_emojis("#nostyle 🚀");
        assert_eq!(results.len(), 1);
        assert!(!results[0].in_heading);
    }

    #[test]
    fn multi_codepoint_sequences_count_once() {
        // Skin tone modifier, flag (regional indicator pair), ZWJ family,
        // and a VS-16 qualified heart.
        for (text, expected) in [
            ("ok 👍🏽 done", "👍🏽"),
            ("flag 🇺🇸 here", "🇺🇸"),
            ("family 👨\u{200D}👩\u{200D}👧 time", "👨\u{200D}👩\u{200D}👧"),
            ("love ❤️ it", "❤️"),
        ] {
            let results = detect_emojis(text);
            assert_eq!(results.len(), 1, "text: {text}");
            assert_eq!(results[0].emoji, expected);
        }
    }

    #[test]
    fn detection_is_deterministic() {
        let text = "# Doc 🚀\n\nSome 😊 body 👍 text\n🎉";
        assert_eq!(detect_emojis(text), detect_emojis(text));
    }

    #[test]
    fn plain_text_and_empty_input_yield_nothing() {
        assert!(detect_emojis("No emojis here").is_empty());
        assert!(detect_emojis("").is_empty());
    }

    #[test]
    fn keywords_from_heading_use_full_heading_text() {
        let results = detect_emojis("# Getting Started 🚀");
        let keywords = extract_keywords(&results[0]);

        assert!(keywords.contains(&"getting".to_string()));
        assert!(keywords.contains(&"started".to_string()));
    }

    #[test]
    fn keywords_drop_stop_words_and_short_tokens() {
        let results = detect_emojis("Launch the app 🚀 on a server");
        let keywords = extract_keywords(&results[0]);

        assert!(keywords.contains(&"launch".to_string()));
        assert!(keywords.contains(&"app".to_string()));
        assert!(keywords.contains(&"server".to_string()));
        assert!(!keywords.contains(&"the".to_string()));
        assert!(!keywords.contains(&"on".to_string()));
    }

    #[test]
    fn normalize_strips_emoji_markdown_and_case() {
        let normalized = normalize_context("**Getting** `Started` 🚀!");
        assert_eq!(normalized, "getting started");
    }

    #[test]
    fn summary_for_heading_and_body() {
        let results = detect_emojis("# Getting Started 🚀\nfix the 🔥 now");

        assert_eq!(context_summary(&results[0]), "Heading: Getting Started 🚀");
        assert_eq!(context_summary(&results[1]), "fix the 🔥 now");
    }

    #[test]
    fn groups_and_unique_preserve_order() {
        let results = detect_emojis("🚀 a\n🎉 b\n🚀 c");

        assert_eq!(unique_emojis(&results), vec!["🚀", "🎉"]);
        let grouped = group_by_emoji(&results);
        assert_eq!(grouped["🚀"].len(), 2);
        assert_eq!(grouped["🎉"].len(), 1);
    }
}
