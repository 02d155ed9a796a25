//! Trim boundaries and cuts for one editing session.

use serde::{Deserialize, Serialize};

use crate::{
    error::{ReelcutError, Result},
    highlights::ClipRange,
    keywords::DEFAULT_NOTE_SPAN_SECS,
    suggestions::{EditSuggestion, SuggestionKind},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditPlan {
    pub original_duration: f64,
    pub trim_start: f64,
    pub trim_end: f64,
    cuts: Vec<ClipRange>,
}

impl EditPlan {
    /// An untrimmed plan covering the whole video.
    pub fn new(original_duration: f64) -> Self {
        let original_duration = original_duration.max(0.0);
        Self {
            original_duration,
            trim_start: 0.0,
            trim_end: original_duration,
            cuts: Vec::new(),
        }
    }

    /// A plan with explicit trims, rejecting boundaries outside
    /// `0 <= trim_start < trim_end <= original_duration`.
    pub fn with_trim(original_duration: f64, trim_start: f64, trim_end: f64) -> Result<Self> {
        if trim_start < 0.0 || trim_end <= trim_start || trim_end > original_duration {
            return Err(ReelcutError::validation(format!(
                "trim [{trim_start}, {trim_end}] does not fit a {original_duration}s video"
            )));
        }
        Ok(Self {
            original_duration,
            trim_start,
            trim_end,
            cuts: Vec::new(),
        })
    }

    pub fn cuts(&self) -> &[ClipRange] {
        &self.cuts
    }

    /// Add a cut, merging it with any cut it overlaps or touches.
    pub fn add_cut(&mut self, start: f64, end: f64) {
        if end <= start {
            return;
        }
        let mut merged = ClipRange::new(start, end);
        self.cuts.retain(|cut| {
            if cut.start <= merged.end && merged.start <= cut.end {
                merged.start = merged.start.min(cut.start);
                merged.end = merged.end.max(cut.end);
                false
            } else {
                true
            }
        });
        let at = self
            .cuts
            .partition_point(|cut| cut.start < merged.start);
        self.cuts.insert(at, merged);
    }

    /// Apply a suggestion: trims move the boundaries, cuts join the cut list.
    pub fn apply(&mut self, suggestion: &EditSuggestion) {
        match suggestion.kind {
            SuggestionKind::TrimStart => {
                self.trim_start = suggestion.start_time.max(0.0);
            }
            SuggestionKind::TrimEnd => {
                self.trim_end = suggestion.start_time.min(self.original_duration);
            }
            SuggestionKind::Cut => {
                let end = suggestion
                    .end_time
                    .unwrap_or(suggestion.start_time + DEFAULT_NOTE_SPAN_SECS);
                self.add_cut(suggestion.start_time, end);
            }
        }
    }

    /// Cuts clipped to the trim window, dropping the ones that fall outside it.
    fn effective_cuts(&self) -> impl Iterator<Item = ClipRange> + '_ {
        self.cuts.iter().filter_map(|cut| {
            let start = cut.start.max(self.trim_start);
            let end = cut.end.min(self.trim_end);
            (end > start).then(|| ClipRange::new(start, end))
        })
    }

    pub fn has_effective_cuts(&self) -> bool {
        self.effective_cuts().next().is_some()
    }

    /// Length of the edited video. Never negative.
    pub fn compute_duration(&self) -> f64 {
        let kept = self.trim_end - self.trim_start;
        let removed: f64 = self.effective_cuts().map(|cut| cut.duration()).sum();
        (kept - removed).max(0.0)
    }

    /// Ranges of the source that survive trims and cuts, in order.
    pub fn segments(&self) -> Vec<ClipRange> {
        let mut segments = Vec::new();
        let mut cursor = self.trim_start;

        for cut in self.effective_cuts() {
            if cut.start > cursor {
                segments.push(ClipRange::new(cursor, cut.start));
            }
            cursor = cursor.max(cut.end);
        }
        if self.trim_end > cursor {
            segments.push(ClipRange::new(cursor, self.trim_end));
        }

        segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suggestions::SuggestionSource;

    fn suggestion(kind: SuggestionKind, start: f64, end: Option<f64>) -> EditSuggestion {
        EditSuggestion {
            id: "s".to_string(),
            kind,
            start_time: start,
            end_time: end,
            reason: String::new(),
            confidence: 0.5,
            source: SuggestionSource::KeyMoment,
            original_timestamp: String::new(),
        }
    }

    #[test]
    fn duration_without_cuts_is_trim_window() {
        let plan = EditPlan::with_trim(60.0, 5.0, 50.0).unwrap();
        assert_eq!(plan.compute_duration(), 45.0);
        assert_eq!(EditPlan::new(30.0).compute_duration(), 30.0);
    }

    #[test]
    fn cuts_are_intersected_with_trim_window() {
        let mut plan = EditPlan::with_trim(60.0, 10.0, 40.0).unwrap();
        plan.add_cut(5.0, 15.0); // 5s inside
        plan.add_cut(20.0, 25.0); // 5s inside
        plan.add_cut(45.0, 50.0); // outside

        assert_eq!(plan.compute_duration(), 20.0);
        assert_eq!(
            plan.segments(),
            vec![ClipRange::new(15.0, 20.0), ClipRange::new(25.0, 40.0)]
        );
    }

    #[test]
    fn duration_never_negative_for_inverted_trims() {
        let mut plan = EditPlan::new(30.0);
        plan.trim_start = 20.0;
        plan.trim_end = 10.0;

        assert_eq!(plan.compute_duration(), 0.0);
        assert!(plan.segments().is_empty());
    }

    #[test]
    fn strict_construction_rejects_bad_trims() {
        assert!(EditPlan::with_trim(30.0, 10.0, 10.0).is_err());
        assert!(EditPlan::with_trim(30.0, -1.0, 10.0).is_err());
        assert!(EditPlan::with_trim(30.0, 0.0, 31.0).is_err());
    }

    #[test]
    fn overlapping_cuts_merge() {
        let mut plan = EditPlan::new(60.0);
        plan.add_cut(30.0, 35.0);
        plan.add_cut(10.0, 12.0);
        plan.add_cut(11.0, 20.0);
        plan.add_cut(20.0, 22.0);

        assert_eq!(
            plan.cuts(),
            &[ClipRange::new(10.0, 22.0), ClipRange::new(30.0, 35.0)]
        );
        assert_eq!(plan.compute_duration(), 43.0);
    }

    #[test]
    fn applying_suggestions_moves_boundaries_and_adds_cuts() {
        let mut plan = EditPlan::new(60.0);
        plan.apply(&suggestion(SuggestionKind::TrimStart, 2.5, None));
        plan.apply(&suggestion(SuggestionKind::TrimEnd, 49.0, None));
        plan.apply(&suggestion(SuggestionKind::Cut, 20.0, Some(24.0)));
        plan.apply(&suggestion(SuggestionKind::Cut, 30.0, None));

        assert_eq!(plan.trim_start, 2.5);
        assert_eq!(plan.trim_end, 49.0);
        assert_eq!(plan.cuts().len(), 2);
        assert_eq!(plan.compute_duration(), 46.5 - 4.0 - 3.0);
    }

    #[test]
    fn trim_end_suggestion_is_clamped_to_original_duration() {
        let mut plan = EditPlan::new(60.0);
        plan.apply(&suggestion(SuggestionKind::TrimEnd, 75.0, None));
        assert_eq!(plan.trim_end, 60.0);
    }

    #[test]
    fn segments_sum_to_duration() {
        let mut plan = EditPlan::with_trim(100.0, 3.0, 90.0).unwrap();
        plan.add_cut(0.0, 5.0);
        plan.add_cut(40.0, 41.5);
        plan.add_cut(88.0, 95.0);

        let total: f64 = plan.segments().iter().map(|s| s.duration()).sum();
        assert!((total - plan.compute_duration()).abs() < 1e-9);
    }
}
