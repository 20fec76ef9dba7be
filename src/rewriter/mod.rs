//! Applies emoji→icon substitutions to document text.
//!
//! The rewriter works on values: it takes the document text and a plan of
//! position-anchored replacements and returns the rewritten text, leaving
//! file persistence to `files`. Replacements within a line are applied
//! back-to-front so earlier byte offsets stay valid.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::detector::EmojiOccurrence;

/// One resolved substitution: which emoji at which position becomes which
/// icon embed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Replacement {
    pub line_number: usize,
    pub byte_position: usize,
    pub emoji: String,
    pub icon_path: String,
    pub alt_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RewriteOutcome {
    pub text: String,
    pub replaced: usize,
    /// Plan entries whose position no longer held the expected emoji.
    pub skipped: Vec<Replacement>,
}

/// Markdown image-embed syntax for an icon. The alt text defaults to the
/// icon file stem.
pub fn replacement_markdown(icon_path: &str, alt_text: Option<&str>) -> String {
    let alt = match alt_text {
        Some(alt) => alt.to_string(),
        None => Path::new(icon_path)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };
    format!("![{alt}]({icon_path})")
}

/// Build a replacement plan from the occurrences the user has resolved to
/// an icon. Unresolved occurrences are left out. `icon_dir` and `extension`
/// come from the caller's asset layout and format setting.
pub fn plan_for_resolved(
    occurrences: &[EmojiOccurrence],
    icon_dir: &str,
    extension: &str,
) -> Vec<Replacement> {
    occurrences
        .iter()
        .filter_map(|occ| {
            let icon = occ.resolved_icon.as_ref()?;
            Some(Replacement {
                line_number: occ.line_number,
                byte_position: occ.byte_position,
                emoji: occ.emoji.clone(),
                icon_path: format!("{icon_dir}/{icon}.{extension}"),
                alt_text: None,
            })
        })
        .collect()
}

/// Apply all substitutions in one pass.
///
/// Entries that do not match the document anymore (wrong line, or the
/// expected emoji is not at the recorded offset) are skipped and reported,
/// never silently mangled.
pub fn apply_replacements(text: &str, plan: &[Replacement]) -> RewriteOutcome {
    let mut lines: Vec<String> = text.split('\n').map(str::to_string).collect();
    let mut replaced = 0;
    let mut skipped = Vec::new();

    // Descending position order within each pass keeps byte offsets stable.
    let mut ordered: Vec<&Replacement> = plan.iter().collect();
    ordered.sort_by(|a, b| {
        a.line_number
            .cmp(&b.line_number)
            .then_with(|| b.byte_position.cmp(&a.byte_position))
    });

    for replacement in ordered {
        let Some(line) = lines.get_mut(replacement.line_number.saturating_sub(1)) else {
            skipped.push(replacement.clone());
            continue;
        };

        // A stale offset can land anywhere, including inside a multi-byte
        // character; the boundary check must come before slicing.
        let pos = replacement.byte_position;
        if replacement.line_number == 0
            || !line.is_char_boundary(pos)
            || !line[pos..].starts_with(replacement.emoji.as_str())
        {
            skipped.push(replacement.clone());
            continue;
        }

        let embed = replacement_markdown(
            &replacement.icon_path,
            replacement.alt_text.as_deref(),
        );
        line.replace_range(pos..pos + replacement.emoji.len(), &embed);
        replaced += 1;
    }

    RewriteOutcome {
        text: lines.join("\n"),
        replaced,
        skipped,
    }
}

/// Replace every occurrence of one emoji in the document. Returns the
/// rewritten text and the replacement count.
pub fn replace_all(
    text: &str,
    emoji: &str,
    icon_path: &str,
    alt_text: Option<&str>,
) -> (String, usize) {
    let count = text.matches(emoji).count();
    let embed = replacement_markdown(icon_path, alt_text);
    (text.replace(emoji, &embed), count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::detect_emojis;

    fn plan_from_document(text: &str, icon_path: &str) -> Vec<Replacement> {
        detect_emojis(text)
            .into_iter()
            .map(|occ| Replacement {
                line_number: occ.line_number,
                byte_position: occ.byte_position,
                emoji: occ.emoji,
                icon_path: icon_path.to_string(),
                alt_text: None,
            })
            .collect()
    }

    #[test]
    fn embed_syntax_defaults_alt_to_file_stem() {
        assert_eq!(
            replacement_markdown("assets/icons/rocket.svg", None),
            "![rocket](assets/icons/rocket.svg)"
        );
        assert_eq!(
            replacement_markdown("assets/icons/rocket.svg", Some("Launch")),
            "![Launch](assets/icons/rocket.svg)"
        );
    }

    #[test]
    fn round_trip_leaves_no_replaced_emoji_behind() {
        let text = "# Title 🚀\n\nLaunch 🚀 now, party 🎉 later\n🚀 end";
        let plan = plan_from_document(text, "icons/x.svg");

        let outcome = apply_replacements(text, &plan);

        assert_eq!(outcome.replaced, 4);
        assert!(outcome.skipped.is_empty());
        assert!(detect_emojis(&outcome.text).is_empty());
        assert!(outcome.text.contains("![x](icons/x.svg)"));
    }

    #[test]
    fn multiple_replacements_on_one_line_keep_offsets_valid() {
        let text = "🚀 and 🚀 and 🚀";
        let plan = plan_from_document(text, "r.svg");

        let outcome = apply_replacements(text, &plan);

        assert_eq!(outcome.replaced, 3);
        assert_eq!(outcome.text, "![r](r.svg) and ![r](r.svg) and ![r](r.svg)");
    }

    #[test]
    fn stale_positions_are_skipped_not_mangled() {
        let text = "plain line without emoji";
        let plan = vec![Replacement {
            line_number: 1,
            byte_position: 0,
            emoji: "🚀".to_string(),
            icon_path: "r.svg".to_string(),
            alt_text: None,
        }];

        let outcome = apply_replacements(text, &plan);

        assert_eq!(outcome.replaced, 0);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.text, text);
    }

    #[test]
    fn stale_position_inside_a_multibyte_char_is_skipped() {
        // byte 2 of "héllo" falls inside the two-byte "é"
        let text = "héllo 🚀";
        let plan = vec![Replacement {
            line_number: 1,
            byte_position: 2,
            emoji: "🚀".to_string(),
            icon_path: "r.svg".to_string(),
            alt_text: None,
        }];

        let outcome = apply_replacements(text, &plan);

        assert_eq!(outcome.replaced, 0);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.text, text);
    }

    #[test]
    fn plan_includes_only_resolved_occurrences() {
        let mut occurrences = detect_emojis("Launch 🚀 then party 🎉");
        occurrences[0].resolved_icon = Some("rocket".to_string());

        let plan = plan_for_resolved(&occurrences, "icons", "svg");

        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].icon_path, "icons/rocket.svg");
        assert_eq!(plan[0].byte_position, occurrences[0].byte_position);

        let outcome = apply_replacements("Launch 🚀 then party 🎉", &plan);
        assert_eq!(outcome.text, "Launch ![rocket](icons/rocket.svg) then party 🎉");
    }

    #[test]
    fn replace_all_counts_occurrences() {
        let (rewritten, count) = replace_all("🔥 hot 🔥", "🔥", "flame.svg", None);

        assert_eq!(count, 2);
        assert_eq!(rewritten, "![flame](flame.svg) hot ![flame](flame.svg)");
        assert!(detect_emojis(&rewritten).is_empty());
    }

    #[test]
    fn untouched_lines_survive_byte_for_byte() {
        let text = "keep ☑ this line\n🚀 replace here";
        // Only plan the rocket.
        let plan: Vec<Replacement> = plan_from_document(text, "r.svg")
            .into_iter()
            .filter(|r| r.emoji == "🚀")
            .collect();

        let outcome = apply_replacements(text, &plan);
        assert!(outcome.text.starts_with("keep ☑ this line\n"));
    }
}
