//! Free-text timestamp parsing for critique notes.
//!
//! Accepted shapes are `M:SS`, `H:MM:SS` and ranges `A-B` of those. Anything
//! else parses to `0` seconds; the span remembers that it fell back so callers
//! can warn about it instead of silently trusting the value.

use serde::{Deserialize, Serialize};

/// One side of a parsed timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeValue {
    Exact(f64),
    /// Unparseable text, read as `0` seconds.
    Fallback,
}

impl TimeValue {
    pub fn seconds(self) -> f64 {
        match self {
            TimeValue::Exact(secs) => secs,
            TimeValue::Fallback => 0.0,
        }
    }

    pub fn is_fallback(self) -> bool {
        matches!(self, TimeValue::Fallback)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParsedSpan {
    pub start: f64,
    pub end: Option<f64>,
    #[serde(skip)]
    fallback: bool,
}

impl ParsedSpan {
    pub fn at(start: f64) -> Self {
        Self {
            start,
            end: None,
            fallback: false,
        }
    }

    pub fn range(start: f64, end: f64) -> Self {
        Self {
            start,
            end: Some(end),
            fallback: false,
        }
    }

    /// True when either side of the span could not be parsed.
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    /// End of the span, or `start + default_len` for point timestamps.
    pub fn end_or(&self, default_len: f64) -> f64 {
        self.end.unwrap_or(self.start + default_len)
    }
}

/// Parse `"M:SS"`, `"H:MM:SS"` or `"A-B"` into a span of seconds.
pub fn parse(text: &str) -> ParsedSpan {
    let parts: Vec<&str> = text.split('-').collect();

    let span = if let [start, end] = parts.as_slice() {
        let start = parse_time(start);
        let end = parse_time(end);
        ParsedSpan {
            start: start.seconds(),
            end: Some(end.seconds()),
            fallback: start.is_fallback() || end.is_fallback(),
        }
    } else {
        let start = parse_time(text);
        ParsedSpan {
            start: start.seconds(),
            end: None,
            fallback: start.is_fallback(),
        }
    };

    if span.fallback {
        tracing::debug!(timestamp = text, "unparseable timestamp, using 0s");
    }
    span
}

/// Convert a single `M:SS` / `H:MM:SS` value to seconds.
pub fn parse_time(text: &str) -> TimeValue {
    let components: Option<Vec<f64>> = text.trim().split(':').map(parse_component).collect();

    match components.as_deref() {
        Some([minutes, seconds]) => TimeValue::Exact(minutes * 60.0 + seconds),
        Some([hours, minutes, seconds]) => {
            TimeValue::Exact(hours * 3600.0 + minutes * 60.0 + seconds)
        }
        _ => TimeValue::Fallback,
    }
}

fn parse_component(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    text.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
}

/// Format seconds as `M:SS`. Sub-second precision is dropped.
pub fn format(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let mins = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    format!("{}:{:02}", mins, secs)
}
