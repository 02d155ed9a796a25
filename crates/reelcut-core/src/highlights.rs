//! Highlight clip selection from positively scored key moments.

use serde::{Deserialize, Serialize};

use crate::{
    keywords::{DEFAULT_CLIP_SECS, HIGHLIGHT_WEIGHTS, LEAD_IN_SECS, MAX_HIGHLIGHTS, weighted_score},
    report::AnalysisReport,
    timestamp,
};

/// A `[start, end)` range of the source media, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipRange {
    pub start: f64,
    pub end: f64,
}

impl ClipRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightClip {
    pub id: String,
    pub start_time: f64,
    pub end_time: f64,
    pub note: String,
    pub selected: bool,
}

impl HighlightClip {
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    pub fn range(&self) -> ClipRange {
        ClipRange::new(self.start_time, self.end_time)
    }

    pub fn toggle(&mut self) {
        self.selected = !self.selected;
    }
}

/// Select up to five distinct highlight clips, ordered by start time.
///
/// A moment whose clip covers exactly the range of a better-scored one is
/// dropped before the cap applies.
pub fn select(report: &AnalysisReport, duration: f64) -> Vec<HighlightClip> {
    let mut scored: Vec<(usize, i32)> = report
        .key_moments
        .iter()
        .enumerate()
        .map(|(index, moment)| (index, weighted_score(&moment.note, HIGHLIGHT_WEIGHTS)))
        .filter(|(_, score)| *score > 0)
        .collect();
    scored.sort_by(|a, b| b.1.cmp(&a.1));

    let mut seen: Vec<ClipRange> = Vec::new();
    let mut clips: Vec<HighlightClip> = scored
        .into_iter()
        .filter_map(|(index, _)| {
            let moment = &report.key_moments[index];
            let span = timestamp::parse(&moment.timestamp);
            // explicit ranges already carry their length
            let clip_len = if span.end.is_some() { 0.0 } else { DEFAULT_CLIP_SECS };

            let start_time = (span.start - LEAD_IN_SECS).max(0.0);
            let end_time = (span.end.unwrap_or(span.start) + clip_len + LEAD_IN_SECS).min(duration);

            if start_time >= end_time {
                tracing::debug!(
                    timestamp = moment.timestamp.as_str(),
                    "key moment lies outside the video, skipping highlight"
                );
                return None;
            }

            let range = ClipRange::new(start_time, end_time);
            if seen.contains(&range) {
                tracing::debug!(
                    timestamp = moment.timestamp.as_str(),
                    "duplicate highlight range, skipping"
                );
                return None;
            }
            seen.push(range);

            Some(HighlightClip {
                id: format!("highlight-{}", index),
                start_time,
                end_time,
                note: moment.note.clone(),
                selected: true,
            })
        })
        .take(MAX_HIGHLIGHTS)
        .collect();

    clips.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
    clips
}

/// Ranges of the selected clips, in display order.
pub fn selected_ranges(clips: &[HighlightClip]) -> Vec<ClipRange> {
    clips
        .iter()
        .filter(|c| c.selected)
        .map(HighlightClip::range)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::TimestampedNote;

    fn report(notes: &[(&str, &str)]) -> AnalysisReport {
        AnalysisReport {
            key_moments: notes
                .iter()
                .map(|(ts, note)| TimestampedNote::new(*ts, *note))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn no_key_moments_means_no_highlights() {
        assert!(select(&AnalysisReport::default(), 60.0).is_empty());
    }

    #[test]
    fn point_moment_gets_default_length_and_padding() {
        let clips = select(&report(&[("0:10", "Great example")]), 60.0);

        assert_eq!(clips.len(), 1);
        assert_eq!(clips[0].start_time, 9.5);
        assert_eq!(clips[0].end_time, 15.5);
        assert!(clips[0].selected);
        assert_eq!(clips[0].note, "Great example");
    }

    #[test]
    fn range_moment_keeps_its_end() {
        let clips = select(&report(&[("0:10-0:20", "Authentic story")]), 60.0);

        assert_eq!(clips[0].start_time, 9.5);
        assert_eq!(clips[0].end_time, 20.5);
    }

    #[test]
    fn clips_are_clamped_to_the_video() {
        let clips = select(&report(&[("0:00", "Strong hook"), ("0:58", "Good cta")]), 60.0);

        assert_eq!(clips[0].start_time, 0.0);
        assert_eq!(clips[1].end_time, 60.0);
    }

    #[test]
    fn non_positive_moments_are_dropped() {
        let clips = select(
            &report(&[
                ("0:05", "Energy dip"),
                ("0:10", "Weak transition"),
                ("0:20", "Awkward, consider re-recording"),
                ("0:30", "Nothing notable"),
            ]),
            60.0,
        );

        assert!(clips.is_empty());
    }

    #[test]
    fn keeps_top_five_and_sorts_by_start() {
        let clips = select(
            &report(&[
                ("0:50", "good"),
                ("0:40", "Strong hook"),
                ("0:30", "great energy"),
                ("0:20", "authentic"),
                ("0:10", "Strong, great hook"),
                ("0:05", "engaging"),
                ("0:01", "good energy"),
            ]),
            120.0,
        );

        assert_eq!(clips.len(), 5);
        assert!(clips.windows(2).all(|w| w[0].start_time <= w[1].start_time));
        assert!(clips.iter().all(|c| c.start_time < c.end_time));

        let notes: Vec<&str> = clips.iter().map(|c| c.note.as_str()).collect();
        // score 2 moments at 0:50, 0:20 and 0:05 tie; the earliest listed wins
        assert_eq!(
            notes,
            ["good energy", "Strong, great hook", "great energy", "Strong hook", "good"]
        );
    }

    #[test]
    fn repeated_timestamps_yield_one_clip() {
        let clips = select(
            &report(&[
                ("0:10", "Great hook"),
                ("0:10", "Great hook"),
                ("0:10", "good energy"),
                ("0:30", "Strong finish"),
            ]),
            60.0,
        );

        let ranges: Vec<(f64, f64)> = clips.iter().map(|c| (c.start_time, c.end_time)).collect();
        assert_eq!(ranges, [(9.5, 15.5), (29.5, 35.5)]);
        assert_eq!(clips[0].id, "highlight-0");
    }

    #[test]
    fn duplicates_do_not_use_up_the_cap() {
        let clips = select(
            &report(&[
                ("0:05", "Strong hook"),
                ("0:05", "Strong hook"),
                ("0:05", "Strong hook"),
                ("0:20", "great"),
                ("0:30", "great"),
                ("0:40", "great"),
                ("0:50", "great"),
            ]),
            120.0,
        );

        assert_eq!(clips.len(), 5);
        assert_eq!(clips.last().map(|c| c.start_time), Some(49.5));
    }

    #[test]
    fn moments_past_the_end_are_skipped() {
        let clips = select(&report(&[("2:00", "Great ending")]), 60.0);
        assert!(clips.is_empty());
    }

    #[test]
    fn selected_ranges_follow_the_flag() {
        let mut clips = select(&report(&[("0:10", "great"), ("0:30", "great")]), 60.0);
        clips[0].toggle();

        let ranges = selected_ranges(&clips);

        assert_eq!(ranges, vec![ClipRange::new(29.5, 35.5)]);
        assert_eq!(ranges[0].duration(), 6.0);
    }
}
