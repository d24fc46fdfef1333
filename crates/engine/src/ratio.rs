//! Script-weighted visual width estimation.
//!
//! Translated text rarely occupies the same width as the source: a CJK
//! glyph renders roughly 1.85x as wide as a Latin letter. The visual
//! length ratio drives both font scaling and the overcrowding check.

use regex::Regex;
use std::sync::LazyLock;

/// Width of one CJK glyph relative to a Latin letter.
const CJK_WIDTH_WEIGHT: f64 = 1.85;

/// Fraction of non-whitespace characters that must be CJK for the
/// whole text to be classified as CJK.
const CJK_CLASSIFY_THRESHOLD: f64 = 0.2;

/// CJK unified ideographs, hiragana, katakana, and hangul syllables.
static CJK_CHAR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\u{4e00}-\u{9fff}\u{3040}-\u{309f}\u{30a0}-\u{30ff}\u{ac00}-\u{d7af}]").unwrap()
});

/// Dominant script of a text, for width weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    Cjk,
    Latin,
}

/// Classify a text as CJK when more than 20% of its non-whitespace
/// characters fall into the CJK ranges.
pub fn classify_script(text: &str) -> Script {
    let total = text.chars().filter(|c| !c.is_whitespace()).count();
    if total == 0 {
        return Script::Latin;
    }

    let cjk = CJK_CHAR_REGEX.find_iter(text).count();
    if cjk as f64 / total as f64 > CJK_CLASSIFY_THRESHOLD {
        Script::Cjk
    } else {
        Script::Latin
    }
}

/// Script-weighted character length.
fn visual_length(text: &str) -> f64 {
    let weight = match classify_script(text) {
        Script::Cjk => CJK_WIDTH_WEIGHT,
        Script::Latin => 1.0,
    };
    text.chars().count() as f64 * weight
}

/// Visual length of the translated text divided by the visual length
/// of the original. 1.0 when the original has no visual width.
pub fn visual_width_ratio(original: &str, translated: &str) -> f64 {
    let original_len = visual_length(original);
    if original_len == 0.0 {
        return 1.0;
    }
    visual_length(translated) / original_len
}
