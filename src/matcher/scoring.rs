//! Pure suggestion-ranking functions.
//!
//! Ranking is a function of (occurrence, entries, prior selections, config)
//! with no UI or store state, so it is unit-testable in isolation. The
//! resulting order is total and deterministic: score descending, then usage
//! count descending, then icon name ascending.

use serde::{Deserialize, Serialize};

use crate::db::models::{EmojiEntry, IconMapping};
use crate::detector::{self, EmojiOccurrence};
use crate::matcher::config::MatcherConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SuggestionSource {
    /// Matched via keyword overlap with a database entry.
    Database,
    /// Promoted because a prior session mapped this emoji to this icon.
    Learned,
    /// Matched the exact codepoint sequence without keyword overlap.
    Popular,
}

/// A ranked icon candidate for one occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IconSuggestion {
    pub icon_name: String,
    pub emoji_unicode: String,
    pub score: i64,
    pub source: SuggestionSource,
    pub keywords_matched: Vec<String>,
}

impl IconSuggestion {
    /// Human-readable explanation of why this icon was suggested.
    pub fn explanation(&self) -> String {
        match self.source {
            SuggestionSource::Learned => "Your previous choice for this emoji".to_string(),
            SuggestionSource::Popular => "Popular choice for this emoji".to_string(),
            SuggestionSource::Database => {
                if self.keywords_matched.is_empty() {
                    "Suggested by emoji match".to_string()
                } else {
                    let shown: Vec<&str> = self
                        .keywords_matched
                        .iter()
                        .take(3)
                        .map(String::as_str)
                        .collect();
                    format!("Matches: {}", shown.join(", "))
                }
            }
        }
    }
}

/// Normalized string similarity on a 0-100 scale.
pub fn similarity_ratio(a: &str, b: &str) -> u8 {
    (strsim::normalized_levenshtein(a, b) * 100.0).round() as u8
}

/// Whether a context token counts as a match for a keyword: exact
/// containment either way, or fuzzy similarity above the per-token cutoff.
fn token_matches(token: &str, keyword: &str, config: &MatcherConfig) -> bool {
    let token = token.to_lowercase();
    let keyword = keyword.to_lowercase();
    token.contains(&keyword)
        || keyword.contains(&token)
        || similarity_ratio(&token, &keyword) >= config.fuzzy_token_threshold
}

/// Icon identifier derived from an entry's common name.
pub fn icon_name_for_entry(entry: &EmojiEntry) -> String {
    entry
        .common_name
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

struct RankedCandidate {
    suggestion: IconSuggestion,
    usage_count: i64,
}

/// Rank icon candidates for one occurrence.
///
/// `prior_selections` is the emoji↔icon mapping history; rows for the same
/// emoji both boost matching candidates and surface as `Learned` suggestions
/// of their own. Entries that clear no relevance floor are dropped; an empty
/// result is a valid outcome, not an error.
pub fn rank_suggestions(
    occurrence: &EmojiOccurrence,
    entries: &[EmojiEntry],
    prior_selections: &[IconMapping],
    config: &MatcherConfig,
) -> Vec<IconSuggestion> {
    let context_tokens = detector::extract_keywords(occurrence);
    let mut candidates: Vec<RankedCandidate> = Vec::new();

    for entry in entries {
        let mut keywords_matched = Vec::new();
        let mut score = 0i64;

        for keyword in &entry.keywords {
            if context_tokens
                .iter()
                .any(|token| token_matches(token, keyword, config))
            {
                keywords_matched.push(keyword.clone());
                score += config.keyword_weight;
            }
        }

        for learned in &entry.context_words {
            if context_tokens.iter().any(|token| token == learned) {
                score += config.learned_weight;
            }
        }

        let exact = entry.unicode == occurrence.emoji;
        if exact {
            score += config.exact_emoji_weight;
        }

        score += (entry.usage_count / 10).min(config.usage_bonus_cap);

        if score < config.min_score_floor {
            continue;
        }

        let icon_name = icon_name_for_entry(entry);
        if prior_selections
            .iter()
            .any(|m| m.emoji_unicode == occurrence.emoji && m.icon_name == icon_name)
        {
            score += config.history_weight;
        }

        let source = if keywords_matched.is_empty() {
            SuggestionSource::Popular
        } else {
            SuggestionSource::Database
        };

        candidates.push(RankedCandidate {
            suggestion: IconSuggestion {
                icon_name,
                emoji_unicode: entry.unicode.clone(),
                score,
                source,
                keywords_matched,
            },
            usage_count: entry.usage_count,
        });
    }

    // Prior selections for this exact emoji surface even when no entry
    // produced the icon, weighted by how often they were chosen.
    for mapping in prior_selections {
        if mapping.emoji_unicode != occurrence.emoji {
            continue;
        }
        candidates.push(RankedCandidate {
            suggestion: IconSuggestion {
                icon_name: mapping.icon_name.clone(),
                emoji_unicode: mapping.emoji_unicode.clone(),
                score: config.history_weight * mapping.selection_count.max(1),
                source: SuggestionSource::Learned,
                keywords_matched: Vec::new(),
            },
            usage_count: mapping.selection_count,
        });
    }

    candidates.sort_by(|a, b| {
        b.suggestion
            .score
            .cmp(&a.suggestion.score)
            .then_with(|| b.usage_count.cmp(&a.usage_count))
            .then_with(|| a.suggestion.icon_name.cmp(&b.suggestion.icon_name))
    });

    let mut seen = Vec::new();
    let mut suggestions = Vec::new();
    for candidate in candidates {
        if seen.contains(&candidate.suggestion.icon_name) {
            continue;
        }
        seen.push(candidate.suggestion.icon_name.clone());
        suggestions.push(candidate.suggestion);
        if suggestions.len() == config.suggestion_limit {
            break;
        }
    }

    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::detect_emojis;

    fn entry(unicode: &str, name: &str, keywords: &[&str], usage: i64) -> EmojiEntry {
        EmojiEntry {
            unicode: unicode.to_string(),
            common_name: name.to_string(),
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            context_words: Vec::new(),
            usage_count: usage,
            last_used: None,
        }
    }

    fn occurrence(text: &str) -> EmojiOccurrence {
        detect_emojis(text).remove(0)
    }

    #[test]
    fn keyword_overlap_outranks_unrelated_entries() {
        let occ = occurrence("Launch the rocket 🚀 into space");
        let entries = vec![
            entry("🚀", "rocket", &["rocket", "launch", "space"], 0),
            entry("🎉", "party popper", &["party", "celebrate"], 0),
        ];

        let ranked = rank_suggestions(&occ, &entries, &[], &MatcherConfig::default());

        assert_eq!(ranked[0].icon_name, "rocket");
        assert!(ranked
            .iter()
            .all(|s| s.icon_name != "party-popper"));
    }

    #[test]
    fn exact_emoji_match_scores_without_keywords() {
        let occ = occurrence("zz 🚀 zz");
        let entries = vec![entry("🚀", "rocket", &["unrelated"], 0)];

        let ranked = rank_suggestions(&occ, &entries, &[], &MatcherConfig::default());

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].source, SuggestionSource::Popular);
    }

    #[test]
    fn fuzzy_token_matches_near_misses() {
        let occ = occurrence("deployd 🚀 now");
        let entries = vec![entry("🎯", "target", &["deployed"], 0)];

        let ranked = rank_suggestions(&occ, &entries, &[], &MatcherConfig::default());

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].keywords_matched, vec!["deployed".to_string()]);
    }

    #[test]
    fn ties_break_by_usage_then_name() {
        let occ = occurrence("fire 🔥 drill");
        // Identical keyword signal; usage differs.
        let entries = vec![
            entry("🔥", "blaze", &["fire"], 5),
            entry("🕯️", "candle", &["fire"], 50),
        ];
        let config = MatcherConfig {
            exact_emoji_weight: 0,
            usage_bonus_cap: 0,
            ..MatcherConfig::default()
        };

        let ranked = rank_suggestions(&occ, &entries, &[], &config);
        assert_eq!(ranked[0].icon_name, "candle");
        assert_eq!(ranked[1].icon_name, "blaze");

        // Equal usage too: name ascending decides.
        let entries = vec![
            entry("🔥", "blaze", &["fire"], 5),
            entry("🕯️", "candle", &["fire"], 5),
        ];
        let ranked = rank_suggestions(&occ, &entries, &[], &config);
        assert_eq!(ranked[0].icon_name, "blaze");
    }

    #[test]
    fn no_signal_yields_empty_list() {
        let occ = occurrence("completely unrelated 🚀 words");
        let entries = vec![entry("🎉", "party popper", &["party"], 0)];

        let ranked = rank_suggestions(&occ, &entries, &[], &MatcherConfig::default());
        assert!(ranked.is_empty());
    }

    #[test]
    fn prior_selection_promotes_learned_icon() {
        let occ = occurrence("zz 🚀 zz");
        let mapping = IconMapping {
            id: None,
            emoji_unicode: "🚀".to_string(),
            library_name: "lucide".to_string(),
            icon_name: "rocket-ship".to_string(),
            selection_count: 3,
            last_selected: chrono::Utc::now(),
        };

        let ranked = rank_suggestions(&occ, &[], &[mapping], &MatcherConfig::default());

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].icon_name, "rocket-ship");
        assert_eq!(ranked[0].source, SuggestionSource::Learned);
        assert_eq!(
            ranked[0].explanation(),
            "Your previous choice for this emoji"
        );
    }

    #[test]
    fn learned_context_words_add_bonus() {
        let occ = occurrence("deploy 🚀 pipeline");
        let mut plain = entry("🚀", "rocket", &[], 0);
        plain.context_words = vec!["pipeline".to_string()];
        let other = entry("🛰️", "satellite", &[], 0);

        let config = MatcherConfig::default();
        let ranked = rank_suggestions(&occ, &[plain, other], &[], &config);

        // Only the entry with the learned word survives the floor with a
        // learned bonus on top of the exact-emoji bonus.
        assert_eq!(ranked[0].icon_name, "rocket");
        assert_eq!(
            ranked[0].score,
            config.exact_emoji_weight + config.learned_weight
        );
    }
}
