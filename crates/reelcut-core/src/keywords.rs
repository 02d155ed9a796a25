//! Keyword tables and constants behind the suggestion and highlight heuristics.
//!
//! Matching is a case-insensitive substring test against the note text.

/// Key moments that mark a strong opening.
pub const OPENING_KEYWORDS: &[&str] = &["hook", "strong", "energy", "engaging", "good"];

/// Key moments that mark the natural end of the video.
pub const CLOSING_KEYWORDS: &[&str] = &["call-to-action", "cta", "ending", "close"];

/// Category notes that point at a stretch worth cutting.
pub const NEGATIVE_KEYWORDS: &[&str] = &[
    "dip", "awkward", "slow", "pause", "hesitat", "drop", "weak",
];

/// A group of synonyms contributing one weight when any of them matches.
#[derive(Debug, Clone, Copy)]
pub struct WeightedKeyword {
    pub terms: &'static [&'static str],
    pub weight: i32,
}

const fn kw(terms: &'static [&'static str], weight: i32) -> WeightedKeyword {
    WeightedKeyword { terms, weight }
}

pub const HIGHLIGHT_WEIGHTS: &[WeightedKeyword] = &[
    kw(&["strong"], 3),
    kw(&["hook"], 3),
    kw(&["great"], 3),
    kw(&["energy"], 2),
    kw(&["engaging"], 2),
    kw(&["good"], 2),
    kw(&["call-to-action", "cta"], 2),
    kw(&["authentic"], 2),
    kw(&["dip"], -2),
    kw(&["weak"], -2),
    kw(&["awkward"], -2),
    kw(&["consider re-recording"], -3),
];

/// Trim-start is only suggested when delivery scores below this.
pub const TRIM_START_MAX_DELIVERY: u8 = 7;
/// Cuts are only suggested for categories scoring below this.
pub const CUT_MAX_CATEGORY_SCORE: u8 = 6;
/// Opening moment must lie after this many seconds...
pub const TRIM_START_MIN_SECS: f64 = 1.0;
/// ...and before this fraction of the duration.
pub const TRIM_START_MAX_FRACTION: f64 = 0.3;
pub const TRIM_START_CONFIDENCE: f64 = 0.8;
pub const TRIM_END_CONFIDENCE: f64 = 0.7;
/// The closing moment must end at least this far before the video does.
pub const TRIM_END_MIN_TAIL_SECS: f64 = 2.0;
/// Length assumed for point timestamps without an explicit end.
pub const DEFAULT_NOTE_SPAN_SECS: f64 = 3.0;
/// Lead-in kept before an anchored moment.
pub const LEAD_IN_SECS: f64 = 0.5;

pub const MAX_HIGHLIGHTS: usize = 5;
pub const DEFAULT_CLIP_SECS: f64 = 5.0;

pub fn contains_any(text: &str, keywords: &[&str]) -> bool {
    let text = text.to_lowercase();
    keywords.iter().any(|k| text.contains(k))
}

/// Sum of the weights of every keyword group found in `text`.
pub fn weighted_score(text: &str, table: &[WeightedKeyword]) -> i32 {
    let text = text.to_lowercase();
    table
        .iter()
        .filter(|entry| entry.terms.iter().any(|t| text.contains(t)))
        .map(|entry| entry.weight)
        .sum()
}
