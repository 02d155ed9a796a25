use crate::{
    edit_plan::EditPlan,
    highlights::HighlightClip,
    suggestions::{EditSuggestion, SuggestionKind},
    timestamp,
};

fn kind_label(kind: SuggestionKind) -> &'static str {
    match kind {
        SuggestionKind::TrimStart => "Trim start",
        SuggestionKind::TrimEnd => "Trim end",
        SuggestionKind::Cut => "Cut",
    }
}

/// Format edit suggestions as a human-readable ranked list
pub fn format_suggestions_readable(suggestions: &[EditSuggestion]) -> String {
    let mut output = String::new();
    output.push_str("## Edit suggestions\n\n");

    if suggestions.is_empty() {
        output.push_str("No edits suggested.\n");
        return output;
    }

    for (i, s) in suggestions.iter().enumerate() {
        let at = match s.end_time {
            Some(end) => format!("{}–{}", timestamp::format(s.start_time), timestamp::format(end)),
            None => timestamp::format(s.start_time),
        };
        output.push_str(&format!(
            "{}. {} at [{}] ({:.0}% confidence)\n   {}\n",
            i + 1,
            kind_label(s.kind),
            at,
            s.confidence * 100.0,
            s.reason
        ));
    }
    output.push('\n');

    output
}

/// Format highlight clips in display order
pub fn format_highlights_readable(clips: &[HighlightClip]) -> String {
    let mut output = String::new();
    output.push_str("## Highlights\n\n");

    if clips.is_empty() {
        output.push_str("No highlights found.\n");
        return output;
    }

    for clip in clips {
        let mark = if clip.selected { "x" } else { " " };
        output.push_str(&format!(
            "- [{}] [{}–{}] {}\n",
            mark,
            timestamp::format(clip.start_time),
            timestamp::format(clip.end_time),
            clip.note
        ));
    }
    let total: f64 = clips.iter().filter(|c| c.selected).map(|c| c.duration()).sum();
    output.push_str(&format!("\n**Reel length:** {:.1}s\n", total));

    output
}

pub fn format_plan_readable(plan: &EditPlan) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "**Keep:** [{}–{}] of {}\n",
        timestamp::format(plan.trim_start),
        timestamp::format(plan.trim_end),
        timestamp::format(plan.original_duration)
    ));
    for cut in plan.cuts() {
        output.push_str(&format!(
            "• cut [{}–{}]\n",
            timestamp::format(cut.start),
            timestamp::format(cut.end)
        ));
    }
    output.push_str(&format!(
        "**Result:** {:.1}s\n",
        plan.compute_duration()
    ));
    output
}
