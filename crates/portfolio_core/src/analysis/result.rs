//! Analysis result shapes shared by the AI and fallback paths.

use crate::model::project::ProjectStatus;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Portfolio analysis returned to callers. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Markdown text shown when structured data is unavailable.
    pub raw_text: String,
    pub structured_sections: Option<StructuredSections>,
    pub timestamp: DateTime<Utc>,
    pub is_fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_count: Option<usize>,
}

impl AnalysisResult {
    pub fn with_error_note(mut self, note: impl Into<String>) -> Self {
        self.error_note = Some(note.into());
        self
    }
}

/// Structured payload; the variant depends on which path produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StructuredSections {
    Ai(AiSections),
    Fallback(FallbackReport),
}

/// The five sections extracted from AI markdown. `None` when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiSections {
    pub overview: Option<String>,
    pub status_analysis: Option<String>,
    pub trends: Option<String>,
    pub risks: Option<String>,
    pub recommendations: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineStats {
    pub upcoming_deadlines: usize,
    pub overdue_projects: usize,
}

/// Rule-based report produced without the AI service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackReport {
    pub state_distribution: BTreeMap<ProjectStatus, usize>,
    pub timeline_analysis: TimelineStats,
    pub risk_projects: Vec<String>,
    pub recommendations: Vec<String>,
}
