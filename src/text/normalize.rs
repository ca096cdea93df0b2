//! Deterministic transcript normalization.
//!
//! [`normalize`] runs a fixed four-stage pipeline over the transcript:
//!
//! 1. vocabulary substitution (library order, enabled rules only),
//! 2. CJK/Latin boundary spacing,
//! 3. punctuation-style conversion,
//! 4. whitespace cleanup.
//!
//! The order is load-bearing: substitution runs first so replaced text gets
//! spaced, spacing runs before punctuation conversion so inserted spaces
//! cannot interfere with the mapping keys, and cleanup always runs last.
//! Every stage is a pure function of its inputs.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PunctuationStyle
// ---------------------------------------------------------------------------

/// Punctuation conversion applied to the final transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PunctuationStyle {
    /// Map `, . ! ? : ; ( )` to their fullwidth equivalents.
    FullWidth,
    /// Map fullwidth punctuation back to ASCII.
    HalfWidth,
    /// Leave punctuation exactly as the provider returned it.
    Keep,
}

/// Fullwidth mapping table, applied in this order.
const HALF_TO_FULL: [(&str, &str); 8] = [
    (",", "，"),
    (".", "。"),
    ("!", "！"),
    ("?", "？"),
    (":", "："),
    (";", "；"),
    ("(", "（"),
    (")", "）"),
];

// ---------------------------------------------------------------------------
// NormalizeOptions
// ---------------------------------------------------------------------------

/// The subset of the settings the normalizer consumes.
#[derive(Debug, Clone, Copy)]
pub struct NormalizeOptions {
    /// Insert a space at every CJK/Latin script boundary.
    pub cjk_latin_spacing: bool,
    /// Punctuation conversion style.
    pub punctuation: PunctuationStyle,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            cjk_latin_spacing: true,
            punctuation: PunctuationStyle::Keep,
        }
    }
}

// ---------------------------------------------------------------------------
// normalize
// ---------------------------------------------------------------------------

/// Run the full normalization pipeline.
///
/// `rules` is the enabled subset of the vocabulary, in library order — see
/// [`crate::text::VocabularyLibrary::active_rules`].
///
/// Idempotent at a fixed punctuation style:
/// `normalize(normalize(x)) == normalize(x)`.
///
/// ```
/// use talktype::text::{normalize, NormalizeOptions};
///
/// let out = normalize("使用React框架", &[], &NormalizeOptions::default());
/// assert_eq!(out, "使用 React 框架");
/// ```
pub fn normalize(text: &str, rules: &[(String, String)], opts: &NormalizeOptions) -> String {
    let mut result = apply_vocabulary(text, rules);

    if opts.cjk_latin_spacing {
        result = space_cjk_latin(&result);
    }

    result = convert_punctuation(&result, opts.punctuation);

    collapse_whitespace(&result)
}

// ---------------------------------------------------------------------------
// Stage 1: vocabulary substitution
// ---------------------------------------------------------------------------

/// Replace every literal occurrence of each rule's source with its target,
/// one rule at a time in slice order.
pub fn apply_vocabulary(text: &str, rules: &[(String, String)]) -> String {
    let mut result = text.to_string();
    for (source, target) in rules {
        if source.is_empty() {
            continue;
        }
        result = result.replace(source.as_str(), target);
    }
    result
}

// ---------------------------------------------------------------------------
// Stage 2: script-boundary spacing
// ---------------------------------------------------------------------------

/// Insert a single space at every adjacent pair where one character is in a
/// CJK range and the other is an ASCII letter or digit. Both directions are
/// covered; spaces are only ever inserted, never removed.
pub fn space_cjk_latin(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut result = String::with_capacity(text.len() + chars.len() / 4);

    for (i, &c) in chars.iter().enumerate() {
        result.push(c);

        if let Some(&next) = chars.get(i + 1) {
            let boundary = (is_cjk(c) && is_ascii_alnum(next))
                || (is_ascii_alnum(c) && is_cjk(next));
            if boundary {
                result.push(' ');
            }
        }
    }

    result
}

/// CJK ranges that take spacing against Latin text: Han ideographs (unified
/// plus Extension A), Hiragana, Katakana, Hangul syllables, and the
/// fullwidth/halfwidth letter and digit forms.
///
/// Punctuation blocks (CJK symbols 3000–303F, the fullwidth punctuation
/// slots of FF00–FFEF) are excluded: the punctuation converter writes into
/// those blocks, and treating its output as a spacing boundary would let a
/// second normalize pass insert spaces the first one did not.
fn is_cjk(c: char) -> bool {
    matches!(u32::from(c),
        0x4E00..=0x9FFF
        | 0x3400..=0x4DBF
        | 0x3040..=0x309F
        | 0x30A0..=0x30FF
        | 0xAC00..=0xD7AF
        // Fullwidth digits and Latin letters
        | 0xFF10..=0xFF19
        | 0xFF21..=0xFF3A
        | 0xFF41..=0xFF5A
        // Halfwidth Katakana and Hangul
        | 0xFF66..=0xFFDC)
}

fn is_ascii_alnum(c: char) -> bool {
    c.is_ascii_alphanumeric()
}

// ---------------------------------------------------------------------------
// Stage 3: punctuation conversion
// ---------------------------------------------------------------------------

/// Apply the punctuation mapping for `style` as literal substring
/// replacements in the table's fixed order.
pub fn convert_punctuation(text: &str, style: PunctuationStyle) -> String {
    match style {
        PunctuationStyle::Keep => text.to_string(),
        PunctuationStyle::FullWidth => {
            let mut result = text.to_string();
            for (half, full) in HALF_TO_FULL {
                result = result.replace(half, full);
            }
            result
        }
        PunctuationStyle::HalfWidth => {
            let mut result = text.to_string();
            for (half, full) in HALF_TO_FULL {
                result = result.replace(full, half);
            }
            result
        }
    }
}

// ---------------------------------------------------------------------------
// Stage 4: whitespace cleanup
// ---------------------------------------------------------------------------

/// Collapse any run of two or more spaces to a single space, then trim
/// leading/trailing whitespace.
pub fn collapse_whitespace(text: &str) -> String {
    let mut result = text.to_string();
    while result.contains("  ") {
        result = result.replace("  ", " ");
    }
    result.trim().to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(s, t)| (s.to_string(), t.to_string()))
            .collect()
    }

    fn opts(spacing: bool, punctuation: PunctuationStyle) -> NormalizeOptions {
        NormalizeOptions {
            cjk_latin_spacing: spacing,
            punctuation,
        }
    }

    // ---- vocabulary substitution ----

    #[test]
    fn vocabulary_replaces_all_occurrences() {
        let out = apply_vocabulary("rust 與 rust", &rules(&[("rust", "Rust")]));
        assert_eq!(out, "Rust 與 Rust");
    }

    #[test]
    fn vocabulary_applies_rules_in_order() {
        // The first rule rewrites "ab" before the second ever sees it.
        let out = apply_vocabulary("ab", &rules(&[("ab", "x"), ("x", "y")]));
        assert_eq!(out, "y");
    }

    #[test]
    fn vocabulary_empty_source_is_skipped() {
        let out = apply_vocabulary("abc", &rules(&[("", "oops")]));
        assert_eq!(out, "abc");
    }

    // ---- script-boundary spacing ----

    #[test]
    fn spacing_inserts_once_between_cjk_and_latin() {
        let out = space_cjk_latin("使用React框架");
        assert_eq!(out, "使用 React 框架");
        assert_eq!(out.matches("使用 React 框架").count(), 1);
    }

    #[test]
    fn spacing_is_idempotent_with_cleanup() {
        let once = normalize("使用React框架", &[], &opts(true, PunctuationStyle::Keep));
        let twice = normalize(&once, &[], &opts(true, PunctuationStyle::Keep));
        assert_eq!(once, twice);
        assert_eq!(once, "使用 React 框架");
    }

    #[test]
    fn spacing_covers_both_directions_and_digits() {
        assert_eq!(space_cjk_latin("版本2發佈"), "版本 2 發佈");
        assert_eq!(space_cjk_latin("iPhone手機"), "iPhone 手機");
    }

    #[test]
    fn spacing_handles_kana_and_hangul() {
        assert_eq!(space_cjk_latin("カタカナtest"), "カタカナ test");
        assert_eq!(space_cjk_latin("한글test"), "한글 test");
    }

    #[test]
    fn spacing_leaves_existing_spaces_alone() {
        assert_eq!(space_cjk_latin("使用 React 框架"), "使用 React 框架");
    }

    #[test]
    fn spacing_ignores_latin_only_and_cjk_only_text() {
        assert_eq!(space_cjk_latin("plain ascii text"), "plain ascii text");
        assert_eq!(space_cjk_latin("純中文句子"), "純中文句子");
    }

    #[test]
    fn spacing_skips_cjk_punctuation() {
        // Fullwidth punctuation (what the converter emits) is not a spacing
        // boundary, so re-spacing converted text changes nothing.
        assert_eq!(space_cjk_latin("Hello，世界"), "Hello，世界");
        assert_eq!(space_cjk_latin("結束。End"), "結束。End");
        assert_eq!(space_cjk_latin("（abc）"), "（abc）");
    }

    // ---- punctuation conversion ----

    #[test]
    fn punctuation_full_width_maps_table() {
        let out = convert_punctuation("a,b.c!d?e:f;g(h)", PunctuationStyle::FullWidth);
        assert_eq!(out, "a，b。c！d？e：f；g（h）");
    }

    #[test]
    fn punctuation_round_trip_restores_ascii() {
        let original = "a,b.c!d?e:f;g(h)i";
        let full = convert_punctuation(original, PunctuationStyle::FullWidth);
        let back = convert_punctuation(&full, PunctuationStyle::HalfWidth);
        assert_eq!(back, original);
    }

    #[test]
    fn punctuation_keep_is_noop() {
        let text = "都不變,也不變。";
        assert_eq!(convert_punctuation(text, PunctuationStyle::Keep), text);
    }

    // ---- whitespace cleanup ----

    #[test]
    fn cleanup_collapses_runs_and_trims() {
        assert_eq!(collapse_whitespace("  a    b  "), "a b");
        assert_eq!(collapse_whitespace("a b"), "a b");
        assert_eq!(collapse_whitespace("   "), "");
    }

    // ---- full pipeline ----

    #[test]
    fn pipeline_runs_substitution_before_spacing() {
        // The rule's target contains a CJK/Latin boundary that must get
        // spaced afterwards.
        let out = normalize(
            "用瑞亞克特寫",
            &rules(&[("瑞亞克特", "React")]),
            &opts(true, PunctuationStyle::Keep),
        );
        assert_eq!(out, "用 React 寫");
    }

    #[test]
    fn pipeline_spacing_runs_before_punctuation() {
        // Fullwidth conversion must not break on the spaces spacing inserted.
        let out = normalize(
            "你好World,再見",
            &[],
            &opts(true, PunctuationStyle::FullWidth),
        );
        assert_eq!(out, "你好 World，再見");
    }

    #[test]
    fn pipeline_fullwidth_next_to_latin_is_stable() {
        // The converted punctuation sits directly against Latin text; a
        // second pass must not space it.
        let o = opts(true, PunctuationStyle::FullWidth);
        let once = normalize("測試Hello,world!", &[], &o);
        assert_eq!(once, "測試 Hello，world！");
        assert_eq!(normalize(&once, &[], &o), once);
    }

    #[test]
    fn pipeline_is_idempotent_at_fixed_style() {
        for style in [
            PunctuationStyle::FullWidth,
            PunctuationStyle::HalfWidth,
            PunctuationStyle::Keep,
        ] {
            let o = opts(true, style);
            let v = rules(&[("錯字", "對字")]);
            let input = "錯字和English,混雜  的句子。";
            let once = normalize(input, &v, &o);
            let twice = normalize(&once, &v, &o);
            assert_eq!(once, twice, "style {style:?} not idempotent");
        }
    }

    #[test]
    fn pipeline_output_contains_no_rule_source() {
        let v = rules(&[("特斯拉", "Tesla"), ("馬克", "Mark")]);
        let out = normalize("特斯拉的馬克", &v, &opts(true, PunctuationStyle::Keep));
        assert!(!out.contains("特斯拉"));
        assert!(!out.contains("馬克"));
        assert_eq!(out, "Tesla 的 Mark");
    }

    #[test]
    fn pipeline_empty_input_stays_empty() {
        assert_eq!(normalize("", &[], &NormalizeOptions::default()), "");
    }
}
