pub mod config;
pub mod duplicates;
pub mod scoring;

pub use config::MatcherConfig;
pub use duplicates::{evaluate_duplicate, DuplicateWarning};
pub use scoring::{
    icon_name_for_entry, rank_suggestions, similarity_ratio, IconSuggestion,
    SuggestionSource,
};
