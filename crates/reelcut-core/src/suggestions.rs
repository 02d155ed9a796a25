//! Ranked edit suggestions derived from an analysis report.

use serde::{Deserialize, Serialize};

use crate::{
    keywords::{
        CLOSING_KEYWORDS, CUT_MAX_CATEGORY_SCORE, DEFAULT_NOTE_SPAN_SECS, LEAD_IN_SECS,
        NEGATIVE_KEYWORDS, OPENING_KEYWORDS, TRIM_END_CONFIDENCE, TRIM_END_MIN_TAIL_SECS,
        TRIM_START_CONFIDENCE, TRIM_START_MAX_DELIVERY, TRIM_START_MAX_FRACTION,
        TRIM_START_MIN_SECS, contains_any,
    },
    report::{AnalysisReport, Category},
    timestamp,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuggestionKind {
    TrimStart,
    TrimEnd,
    Cut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SuggestionSource {
    Delivery,
    Pacing,
    Content,
    Engagement,
    KeyMoment,
}

impl From<Category> for SuggestionSource {
    fn from(category: Category) -> Self {
        match category {
            Category::Delivery => SuggestionSource::Delivery,
            Category::Pacing => SuggestionSource::Pacing,
            Category::Content => SuggestionSource::Content,
            Category::Engagement => SuggestionSource::Engagement,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditSuggestion {
    pub id: String,
    pub kind: SuggestionKind,
    pub start_time: f64,
    pub end_time: Option<f64>,
    pub reason: String,
    pub confidence: f64,
    pub source: SuggestionSource,
    pub original_timestamp: String,
}

/// Derive edit suggestions for a video of `duration` seconds.
///
/// The result is sorted by confidence, highest first. Equal confidences keep
/// generation order: trim-start, trim-end, then cuts by category and note.
pub fn generate(report: &AnalysisReport, duration: f64) -> Vec<EditSuggestion> {
    let mut suggestions = Vec::new();

    suggestions.extend(trim_start(report, duration));
    suggestions.extend(trim_end(report, duration));
    suggestions.extend(cuts(report));

    // stable: ties keep insertion order
    suggestions.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    suggestions
}

fn trim_start(report: &AnalysisReport, duration: f64) -> Option<EditSuggestion> {
    let delivery = report.delivery.as_ref()?;
    if delivery.score >= TRIM_START_MAX_DELIVERY {
        return None;
    }

    let moment = report
        .key_moments
        .iter()
        .find(|m| contains_any(&m.note, OPENING_KEYWORDS))?;
    let span = timestamp::parse(&moment.timestamp);

    if span.start <= TRIM_START_MIN_SECS || span.start >= duration * TRIM_START_MAX_FRACTION {
        return None;
    }

    Some(EditSuggestion {
        id: "trim-start".to_string(),
        kind: SuggestionKind::TrimStart,
        start_time: (span.start - LEAD_IN_SECS).max(0.0),
        end_time: None,
        reason: moment.note.clone(),
        confidence: TRIM_START_CONFIDENCE,
        source: SuggestionSource::KeyMoment,
        original_timestamp: moment.timestamp.clone(),
    })
}

fn trim_end(report: &AnalysisReport, duration: f64) -> Option<EditSuggestion> {
    let moment = report
        .key_moments
        .iter()
        .rev()
        .find(|m| contains_any(&m.note, CLOSING_KEYWORDS))?;
    let span = timestamp::parse(&moment.timestamp);
    let end_time = span.end_or(DEFAULT_NOTE_SPAN_SECS);

    if end_time >= duration - TRIM_END_MIN_TAIL_SECS {
        return None;
    }

    Some(EditSuggestion {
        id: "trim-end".to_string(),
        kind: SuggestionKind::TrimEnd,
        start_time: end_time + 1.0,
        end_time: None,
        reason: moment.note.clone(),
        confidence: TRIM_END_CONFIDENCE,
        source: SuggestionSource::KeyMoment,
        original_timestamp: moment.timestamp.clone(),
    })
}

fn cuts(report: &AnalysisReport) -> Vec<EditSuggestion> {
    let mut cuts = Vec::new();

    for category in Category::ALL {
        let Some(section) = report.category(category) else {
            continue;
        };
        if section.score >= CUT_MAX_CATEGORY_SCORE {
            continue;
        }

        let confidence = f64::from(10u8.saturating_sub(section.score)) / 10.0;

        for (index, note) in section.timestamps.iter().enumerate() {
            if !contains_any(&note.note, NEGATIVE_KEYWORDS) {
                continue;
            }
            let span = timestamp::parse(&note.timestamp);
            cuts.push(EditSuggestion {
                id: format!("cut-{}-{}", category.name(), index),
                kind: SuggestionKind::Cut,
                start_time: span.start,
                end_time: Some(span.end_or(DEFAULT_NOTE_SPAN_SECS)),
                reason: note.note.clone(),
                confidence,
                source: category.into(),
                original_timestamp: note.timestamp.clone(),
            });
        }
    }

    cuts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{CategoryReport, TimestampedNote};

    fn category(score: u8, notes: &[(&str, &str)]) -> Option<CategoryReport> {
        Some(CategoryReport {
            score,
            timestamps: notes
                .iter()
                .map(|(ts, note)| TimestampedNote::new(*ts, *note))
                .collect(),
            ..Default::default()
        })
    }

    fn moments(notes: &[(&str, &str)]) -> Vec<TimestampedNote> {
        notes
            .iter()
            .map(|(ts, note)| TimestampedNote::new(*ts, *note))
            .collect()
    }

    #[test]
    fn weak_delivery_with_hook_and_cta_yields_both_trims() {
        let report = AnalysisReport {
            delivery: category(5, &[]),
            key_moments: moments(&[("0:03", "Strong opening hook"), ("0:45", "Great call-to-action")]),
            ..Default::default()
        };

        let suggestions = generate(&report, 60.0);

        assert_eq!(suggestions.len(), 2);
        let start = &suggestions[0];
        assert_eq!(start.kind, SuggestionKind::TrimStart);
        assert_eq!(start.start_time, 2.5);
        assert_eq!(start.confidence, 0.8);
        assert_eq!(start.source, SuggestionSource::KeyMoment);
        assert_eq!(start.reason, "Strong opening hook");

        let end = &suggestions[1];
        assert_eq!(end.kind, SuggestionKind::TrimEnd);
        assert_eq!(end.start_time, 49.0);
        assert_eq!(end.confidence, 0.7);
        assert_eq!(end.original_timestamp, "0:45");
    }

    #[test]
    fn good_delivery_suppresses_trim_start() {
        let report = AnalysisReport {
            delivery: category(7, &[]),
            key_moments: moments(&[("0:03", "Strong opening hook")]),
            ..Default::default()
        };

        assert!(generate(&report, 60.0).is_empty());
    }

    #[test]
    fn trim_start_requires_moment_inside_opening_window() {
        let report = AnalysisReport {
            delivery: category(3, &[]),
            key_moments: moments(&[("0:01", "Good energy")]),
            ..Default::default()
        };
        assert!(generate(&report, 60.0).is_empty());

        let report = AnalysisReport {
            delivery: category(3, &[]),
            key_moments: moments(&[("0:18", "Good energy")]),
            ..Default::default()
        };
        // 18s is exactly 30% of 60s
        assert!(generate(&report, 60.0).is_empty());
    }

    #[test]
    fn only_first_opening_moment_is_considered() {
        let report = AnalysisReport {
            delivery: category(3, &[]),
            key_moments: moments(&[("0:40", "Engaging story"), ("0:05", "Strong hook")]),
            ..Default::default()
        };

        assert!(generate(&report, 60.0).is_empty());
    }

    #[test]
    fn trim_end_uses_last_closing_moment_and_range_end() {
        let report = AnalysisReport {
            key_moments: moments(&[
                ("0:20", "Early cta"),
                ("0:40-0:50", "Clear ending"),
                ("0:30", "Nothing special"),
            ]),
            ..Default::default()
        };

        let suggestions = generate(&report, 120.0);

        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].kind, SuggestionKind::TrimEnd);
        assert_eq!(suggestions[0].start_time, 51.0);
        assert_eq!(suggestions[0].reason, "Clear ending");
    }

    #[test]
    fn trim_end_skipped_when_close_is_near_the_end() {
        let report = AnalysisReport {
            key_moments: moments(&[("0:55", "Strong close")]),
            ..Default::default()
        };

        // 55 + 3 = 58 is not before 60 - 2
        assert!(generate(&report, 60.0).is_empty());
    }

    #[test]
    fn low_pacing_dip_becomes_cut() {
        let report = AnalysisReport {
            pacing: category(4, &[("0:20-0:24", "Energy dip")]),
            ..Default::default()
        };

        let suggestions = generate(&report, 60.0);

        assert_eq!(suggestions.len(), 1);
        let cut = &suggestions[0];
        assert_eq!(cut.kind, SuggestionKind::Cut);
        assert_eq!(cut.start_time, 20.0);
        assert_eq!(cut.end_time, Some(24.0));
        assert!((cut.confidence - 0.6).abs() < 1e-9);
        assert_eq!(cut.source, SuggestionSource::Pacing);
    }

    #[test]
    fn cuts_ignore_passing_categories_and_neutral_notes() {
        let report = AnalysisReport {
            content: category(6, &[("0:10", "Slow section")]),
            engagement: category(2, &[("0:10", "Nice example"), ("0:30", "Awkward pause")]),
            ..Default::default()
        };

        let suggestions = generate(&report, 60.0);

        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].source, SuggestionSource::Engagement);
        assert_eq!(suggestions[0].end_time, Some(33.0));
        assert_eq!(suggestions[0].id, "cut-engagement-1");
    }

    #[test]
    fn sorted_by_confidence_with_stable_ties() {
        let report = AnalysisReport {
            delivery: category(2, &[("0:50", "Weak delivery")]),
            pacing: category(3, &[("0:10", "Slow"), ("0:15", "Long pause")]),
            content: category(3, &[("0:05", "Hesitation")]),
            key_moments: moments(&[("0:10", "Strong hook"), ("1:00", "cta")]),
            ..Default::default()
        };

        let suggestions = generate(&report, 120.0);
        let ids: Vec<&str> = suggestions.iter().map(|s| s.id.as_str()).collect();

        assert_eq!(
            ids,
            [
                "trim-start",
                "cut-delivery-0",
                "trim-end",
                "cut-pacing-0",
                "cut-pacing-1",
                "cut-content-0",
            ]
        );
        assert!(
            suggestions
                .windows(2)
                .all(|w| w[0].confidence >= w[1].confidence)
        );
    }

    #[test]
    fn empty_report_yields_nothing() {
        assert!(generate(&AnalysisReport::default(), 60.0).is_empty());
    }

    #[test]
    fn generation_is_deterministic() {
        let report = AnalysisReport {
            delivery: category(4, &[("0:12", "awkward")]),
            key_moments: moments(&[("0:04", "good hook"), ("0:30", "ending")]),
            ..Default::default()
        };

        assert_eq!(generate(&report, 90.0), generate(&report, 90.0));
    }
}
