//! Single entry point for portfolio analysis.
//!
//! # Responsibility
//! - Choose between the AI path and the rule-based fallback per request.
//! - Convert every AI-path failure into a successful, labeled result.
//!
//! # Invariants
//! - Empty input never reaches the AI client.
//! - Public methods never return errors; callers always get a result.

use super::ai_client::AiClient;
use super::error::AiError;
use super::fallback::{empty_portfolio_analysis, generate_basic_analysis};
use super::result::AnalysisResult;
use crate::model::project::Project;
use chrono::Utc;
use log::{info, warn};
use std::sync::Arc;

const ANALYSIS_NOTE_PREFIX: &str = "AI service temporarily unavailable: ";
const REGENERATE_NOTE_PREFIX: &str = "Could not regenerate analysis: ";

pub struct AnalysisOrchestrator {
    ai: Arc<AiClient>,
}

impl AnalysisOrchestrator {
    pub fn new(ai: Arc<AiClient>) -> Self {
        Self { ai }
    }

    pub fn ai_client(&self) -> &AiClient {
        &self.ai
    }

    /// Returns the AI analysis, or the degraded fallback on any AI failure.
    pub async fn get_project_analysis(&self, projects: &[Project]) -> AnalysisResult {
        self.run("analysis", projects, ANALYSIS_NOTE_PREFIX).await
    }

    /// Same as [`Self::get_project_analysis`] but bypasses any cached result.
    ///
    /// No cache exists today, so both paths call the AI client.
    pub async fn regenerate_analysis(&self, projects: &[Project]) -> AnalysisResult {
        self.run("regenerate", projects, REGENERATE_NOTE_PREFIX).await
    }

    /// Acknowledges a cache clear. Results are never cached.
    pub fn clear_cache(&self) {
        info!("event=analysis_cache_clear module=analysis status=ok cached_entries=0");
    }

    pub async fn health_check(&self) -> Result<String, AiError> {
        self.ai.health_check().await
    }

    async fn run(
        &self,
        operation: &'static str,
        projects: &[Project],
        note_prefix: &str,
    ) -> AnalysisResult {
        if projects.is_empty() {
            info!("event=analysis module=analysis operation={operation} status=ok path=empty");
            return empty_portfolio_analysis(Utc::now());
        }

        match self.ai.try_generate_summary(projects).await {
            Ok(result) => {
                info!(
                    "event=analysis module=analysis operation={operation} status=ok path=ai project_count={}",
                    projects.len()
                );
                result
            }
            Err(err) => {
                warn!(
                    "event=analysis module=analysis operation={operation} status=degraded path=fallback project_count={} error_kind={}",
                    projects.len(),
                    err.kind().as_str()
                );
                generate_basic_analysis(projects).with_error_note(format!("{note_prefix}{err}"))
            }
        }
    }
}
