/// Tunable weights and thresholds for suggestion ranking and duplicate
/// detection. Scores are abstract units; only relative order is meaningful.
#[derive(Debug, Clone)]
pub struct MatcherConfig {
    /// Context-similarity percentage (0-100) below which reusing an icon is
    /// flagged as a probable duplicate. User-configurable; default 50.
    pub similarity_threshold: u8,

    /// Below this similarity the conflict is reported as critical.
    pub critical_similarity: u8,

    /// Per-token fuzzy match cutoff (0-100) for keyword overlap.
    pub fuzzy_token_threshold: u8,

    /// Score contributed by each matched keyword.
    pub keyword_weight: i64,

    /// Bonus when a learned context word appears in the current window.
    pub learned_weight: i64,

    /// Bonus when a prior session mapped this emoji to the same icon.
    pub history_weight: i64,

    /// Bonus when the entry's codepoint sequence matches the occurrence.
    pub exact_emoji_weight: i64,

    /// Usage-count bonus is `usage_count / 10` capped at this value.
    pub usage_bonus_cap: i64,

    /// Entries scoring below this floor are dropped from the suggestion
    /// list. An empty list is a valid, non-error outcome.
    pub min_score_floor: i64,

    /// Maximum learned context words kept per emoji; oldest evicted first.
    pub learned_cap: usize,

    /// Maximum suggestions returned per occurrence.
    pub suggestion_limit: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 50,
            critical_similarity: 30,
            fuzzy_token_threshold: 80,
            keyword_weight: 10,
            learned_weight: 15,
            history_weight: 25,
            exact_emoji_weight: 100,
            usage_bonus_cap: 5,
            min_score_floor: 1,
            learned_cap: 64,
            suggestion_limit: 10,
        }
    }
}

impl MatcherConfig {
    /// Clamp an externally supplied threshold into the valid 0-100 range.
    pub fn with_similarity_threshold(mut self, threshold: u8) -> Self {
        self.similarity_threshold = threshold.min(100);
        self
    }
}
