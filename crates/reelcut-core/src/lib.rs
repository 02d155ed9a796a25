//! Reelcut Core Library
//!
//! Turns a structured AI critique of a recorded video into ranked edit
//! suggestions and highlight clips, and executes trims and concatenations
//! on the media through ffmpeg.

pub mod config;
pub mod edit_plan;
pub mod engine;
pub mod error;
pub mod format;
pub mod highlights;
pub mod keywords;
pub mod report;
pub mod suggestions;
pub mod timestamp;

// Re-export commonly used items at crate root
pub use config::EngineConfig;
pub use edit_plan::EditPlan;
pub use engine::{
    FfmpegToolchain, JobPhase, MediaAsset, MediaEngine, ProcessingJob, ToolOutput, Toolchain,
};
pub use error::{ReelcutError, Result};
pub use format::{format_highlights_readable, format_plan_readable, format_suggestions_readable};
pub use highlights::{ClipRange, HighlightClip, selected_ranges};
pub use report::{
    AnalysisReport, Category, CategoryReport, TimestampedNote, load_report, save_report,
};
pub use suggestions::{EditSuggestion, SuggestionKind, SuggestionSource};
pub use timestamp::ParsedSpan;
