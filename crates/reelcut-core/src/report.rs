//! Input model: the structured critique produced by the external analyzer.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::Result;

/// A `(timestamp, note)` pair anchoring feedback to a moment in the video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimestampedNote {
    pub timestamp: String,
    pub note: String,
}

impl TimestampedNote {
    pub fn new(timestamp: impl Into<String>, note: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            note: note.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryReport {
    pub score: u8,
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub tips: Vec<String>,
    #[serde(default)]
    pub timestamps: Vec<TimestampedNote>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Delivery,
    Pacing,
    Content,
    Engagement,
}

impl Category {
    /// Report order; cut suggestions are generated in this order.
    pub const ALL: [Category; 4] = [
        Category::Delivery,
        Category::Pacing,
        Category::Content,
        Category::Engagement,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Category::Delivery => "delivery",
            Category::Pacing => "pacing",
            Category::Content => "content",
            Category::Engagement => "engagement",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    #[serde(default)]
    pub overall_score: Option<u8>,
    #[serde(default)]
    pub delivery: Option<CategoryReport>,
    #[serde(default)]
    pub pacing: Option<CategoryReport>,
    #[serde(default)]
    pub content: Option<CategoryReport>,
    #[serde(default)]
    pub engagement: Option<CategoryReport>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub improvements: Vec<String>,
    #[serde(default)]
    pub key_moments: Vec<TimestampedNote>,
}

impl AnalysisReport {
    pub fn category(&self, category: Category) -> Option<&CategoryReport> {
        match category {
            Category::Delivery => self.delivery.as_ref(),
            Category::Pacing => self.pacing.as_ref(),
            Category::Content => self.content.as_ref(),
            Category::Engagement => self.engagement.as_ref(),
        }
    }
}

/// Load a report from a JSON file
pub async fn load_report(path: &Path) -> Result<AnalysisReport> {
    let json_content = fs::read_to_string(path).await?;
    let report: AnalysisReport = serde_json::from_str(&json_content)?;
    Ok(report)
}

/// Save a report to a file
pub async fn save_report(report: &AnalysisReport, path: &Path) -> Result<()> {
    let pretty_json = serde_json::to_string_pretty(report)?;
    fs::write(path, &pretty_json).await?;
    Ok(())
}
