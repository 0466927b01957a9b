//! Scene-heading autocomplete rules.
//!
//! [`suggest`] is a pure function of the block type, its text, the cursor
//! offset and the [`KnownLocations`] projection of the document. Stages are
//! evaluated in priority order and the first stage whose trigger matches
//! decides the outcome, even when it filters down to nothing:
//!
//! 1. **Prefix**: short text without a `.` completes to `INT. ` / `EXT. ` /
//!    `INT./EXT. `.
//! 2. **Time**: text containing ` - ` completes the time of day after the
//!    last separator.
//! 3. **Location**: text starting with a heading prefix completes to a
//!    location already used elsewhere in the document.
//!
//! All offsets are character offsets into the block content.

use serde::{Deserialize, Serialize};

use crate::editing::document::{BlockType, KnownLocations};

pub const HEADING_PREFIXES: [&str; 3] = ["INT. ", "EXT. ", "INT./EXT. "];

pub const TIMES_OF_DAY: [&str; 5] = ["DAY", "NIGHT", "LATER", "CONTINUOUS", "MOMENTS LATER"];

pub const TIME_SEPARATOR: &str = " - ";

/// Prefix-stage text must be shorter than this to trigger
const PREFIX_STAGE_MAX_LEN: usize = 5;

/// Span of block content, in characters, that a chosen suggestion replaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRange {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Prefix,
    Time,
    Location,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestions {
    pub stage: Stage,
    pub options: Vec<String>,
    pub range: MatchRange,
}

/// Compute suggestions for the text before `cursor`.
///
/// Returns `None` when the popup should be closed.
pub fn suggest(
    block_type: BlockType,
    content: &str,
    cursor: usize,
    known_locations: &KnownLocations,
) -> Option<Suggestions> {
    if block_type != BlockType::SceneHeading {
        return None;
    }

    let end = cursor.min(content.chars().count());
    let text = &content[..byte_offset(content, end)];
    let upper = text.to_uppercase();

    let (stage, start, options): (Stage, usize, Vec<String>) =
        if upper.chars().count() < PREFIX_STAGE_MAX_LEN && !upper.contains('.') {
            let options = HEADING_PREFIXES
                .iter()
                .filter(|prefix| prefix.starts_with(upper.as_str()))
                .map(|prefix| prefix.to_string())
                .collect();
            (Stage::Prefix, 0, options)
        } else if let Some(separator_at) = text.rfind(TIME_SEPARATOR) {
            let time_start = separator_at + TIME_SEPARATOR.len();
            let time_prefix = text[time_start..].to_uppercase();
            let options = TIMES_OF_DAY
                .iter()
                .filter(|time| time.starts_with(time_prefix.as_str()))
                .map(|time| time.to_string())
                .collect();
            (Stage::Time, text[..time_start].chars().count(), options)
        } else if let Some(prefix) = matching_heading_prefix(text) {
            let remainder = text[prefix.len()..].to_uppercase();
            let options = known_locations
                .iter()
                .filter(|location| location.starts_with(remainder.as_str()) && *location != remainder)
                .map(str::to_string)
                .collect();
            (Stage::Location, prefix.chars().count(), options)
        } else {
            return None;
        };

    if options.is_empty() {
        return None;
    }

    Some(Suggestions {
        stage,
        options,
        range: MatchRange { start, end },
    })
}

/// Content after choosing `option`: everything before the span start, then
/// the option. Text after the span start is dropped.
pub fn apply_suggestion(content: &str, range: MatchRange, option: &str) -> String {
    let keep = byte_offset(content, range.start);
    let mut result = String::with_capacity(keep + option.len());
    result.push_str(&content[..keep]);
    result.push_str(option);
    result
}

fn matching_heading_prefix(text: &str) -> Option<&'static str> {
    HEADING_PREFIXES.into_iter().find(|prefix| {
        text.get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    })
}

/// Byte index of the `chars`-th character, clamped to the end of `text`
pub(crate) fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map_or(text.len(), |(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn options_for(text: &str, known: &KnownLocations) -> Option<Vec<String>> {
        suggest(BlockType::SceneHeading, text, text.chars().count(), known)
            .map(|suggestions| suggestions.options)
    }

    fn known(locations: &[&str]) -> KnownLocations {
        locations.iter().copied().collect()
    }

    #[rstest]
    #[case("", &["INT. ", "EXT. ", "INT./EXT. "])]
    #[case("I", &["INT. ", "INT./EXT. "])]
    #[case("in", &["INT. ", "INT./EXT. "])]
    #[case("e", &["EXT. "])]
    #[case("ext", &["EXT. "])]
    fn test_prefix_stage(#[case] text: &str, #[case] expected: &[&str]) {
        let result = suggest(BlockType::SceneHeading, text, text.chars().count(), &known(&[]))
            .expect("prefix stage should open");
        assert_eq!(result.stage, Stage::Prefix);
        assert_eq!(result.options, expected);
        assert_eq!(
            result.range,
            MatchRange {
                start: 0,
                end: text.chars().count()
            }
        );
    }

    #[test]
    fn test_prefix_stage_with_no_match_closes() {
        assert_eq!(options_for("X", &known(&[])), None);
        assert_eq!(options_for("INTX", &known(&[])), None);
    }

    #[test]
    fn test_time_stage_filters_by_suffix() {
        let result = suggest(
            BlockType::SceneHeading,
            "INT. COFFEE SHOP - D",
            20,
            &known(&["COFFEE SHOP"]),
        )
        .unwrap();
        assert_eq!(result.stage, Stage::Time);
        assert_eq!(result.options, vec!["DAY"]);
        assert_eq!(result.range, MatchRange { start: 19, end: 20 });
    }

    #[test]
    fn test_time_stage_uses_last_separator() {
        let text = "INT. HOUSE - KITCHEN - m";
        let result = suggest(BlockType::SceneHeading, text, text.len(), &known(&[])).unwrap();
        assert_eq!(result.options, vec!["MOMENTS LATER"]);
        assert_eq!(result.range.start, 23);
    }

    #[test]
    fn test_time_stage_empty_suffix_offers_everything() {
        assert_eq!(
            options_for("EXT. PARK - ", &known(&[])).unwrap(),
            TIMES_OF_DAY.to_vec()
        );
    }

    #[test]
    fn test_time_stage_without_match_does_not_fall_through() {
        // Location stage would match "INT. " but the time stage wins
        assert_eq!(options_for("INT. PARK - X", &known(&["PARK"])), None);
    }

    #[test]
    fn test_location_stage_offers_known_locations() {
        let known = known(&["COFFEE SHOP", "CAR", "PARK"]);
        assert_eq!(
            options_for("INT. C", &known).unwrap(),
            vec!["CAR", "COFFEE SHOP"]
        );
        assert_eq!(
            options_for("ext. co", &known).unwrap(),
            vec!["COFFEE SHOP"]
        );
    }

    #[test]
    fn test_location_stage_empty_remainder_lists_all() {
        let result =
            suggest(BlockType::SceneHeading, "INT. ", 5, &known(&["COFFEE SHOP"])).unwrap();
        assert_eq!(result.stage, Stage::Location);
        assert_eq!(result.options, vec!["COFFEE SHOP"]);
        assert_eq!(result.range, MatchRange { start: 5, end: 5 });
    }

    #[test]
    fn test_location_stage_skips_exact_match() {
        let known = known(&["CAR", "CARNIVAL"]);
        assert_eq!(options_for("INT. CAR", &known).unwrap(), vec!["CARNIVAL"]);
        assert_eq!(options_for("INT. CARNIVAL", &known), None);
    }

    #[test]
    fn test_location_stage_after_combined_prefix() {
        let result = suggest(
            BlockType::SceneHeading,
            "INT./EXT. C",
            11,
            &known(&["CAR"]),
        )
        .unwrap();
        assert_eq!(result.range.start, 10);
        assert_eq!(result.options, vec!["CAR"]);
    }

    #[rstest]
    #[case("INT.")]
    #[case("HELLO")]
    #[case("THE END.")]
    fn test_no_stage_matches(#[case] text: &str) {
        assert_eq!(options_for(text, &known(&["HELLO"])), None);
    }

    #[rstest]
    #[case(BlockType::Action)]
    #[case(BlockType::Character)]
    #[case(BlockType::Dialogue)]
    #[case(BlockType::Parenthetical)]
    #[case(BlockType::Transition)]
    fn test_only_scene_headings_trigger(#[case] block_type: BlockType) {
        assert_eq!(suggest(block_type, "I", 1, &KnownLocations::default()), None);
    }

    #[test]
    fn test_cursor_limits_evaluated_text() {
        // Cursor right after "I": only that character is considered
        let result = suggest(
            BlockType::SceneHeading,
            "I was here",
            1,
            &KnownLocations::default(),
        )
        .unwrap();
        assert_eq!(result.stage, Stage::Prefix);
        assert_eq!(result.range, MatchRange { start: 0, end: 1 });
    }

    #[test]
    fn test_cursor_past_end_is_clamped() {
        let result = suggest(BlockType::SceneHeading, "EX", 99, &KnownLocations::default()).unwrap();
        assert_eq!(result.range, MatchRange { start: 0, end: 2 });
    }

    #[test]
    fn test_apply_suggestion_discards_text_after_span_start() {
        let range = MatchRange { start: 19, end: 20 };
        assert_eq!(
            apply_suggestion("INT. COFFEE SHOP - D and more", range, "DAY"),
            "INT. COFFEE SHOP - DAY"
        );
        assert_eq!(
            apply_suggestion("in", MatchRange { start: 0, end: 2 }, "INT. "),
            "INT. "
        );
    }

    #[test]
    fn test_apply_suggestion_counts_characters_not_bytes() {
        let range = MatchRange { start: 5, end: 7 };
        assert_eq!(apply_suggestion("INT. Ça", range, "ÇAFÉ"), "INT. ÇAFÉ");
    }
}
