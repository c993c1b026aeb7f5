//! AI-backed portfolio summaries.
//!
//! # Responsibility
//! - Turn a project list into a chat-completion request.
//! - Enforce the local rate limit and the retry policy around the transport.
//! - Parse the free-text answer into structured sections.
//!
//! # Invariants
//! - A rate-limited call never reaches the transport.
//! - `generate_project_summary` never fails; errors become a labeled
//!   "analysis unavailable" result.

use super::error::AiError;
use super::fallback::empty_portfolio_analysis;
use super::prompt::{build_project_prompt, HEALTH_PROMPT, SYSTEM_INSTRUCTION};
use super::rate_limit::{RateLimitConfig, RateLimiter};
use super::result::{AnalysisResult, StructuredSections};
use super::retry::RetryPolicy;
use super::sections::parse_sections;
use super::transport::{ChatCompletionRequest, ChatMessage, CompletionTransport};
use crate::model::project::Project;
use chrono::Utc;
use log::{info, warn};
use std::sync::Arc;
use std::time::Instant;

/// Generation and resilience settings for [`AiClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct AiClientConfig {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub retry: RetryPolicy,
    pub rate_limit: RateLimitConfig,
}

impl Default for AiClientConfig {
    fn default() -> Self {
        Self {
            model: "deepseek-chat".to_string(),
            max_tokens: 1500,
            temperature: 0.7,
            top_p: 0.9,
            retry: RetryPolicy::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

pub struct AiClient {
    config: AiClientConfig,
    transport: Arc<dyn CompletionTransport>,
    limiter: RateLimiter,
}

impl AiClient {
    pub fn new(config: AiClientConfig, transport: Arc<dyn CompletionTransport>) -> Self {
        let limiter = RateLimiter::new(config.rate_limit);
        Self {
            config,
            transport,
            limiter,
        }
    }

    pub fn config(&self) -> &AiClientConfig {
        &self.config
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Generates an AI summary, surfacing every failure to the caller.
    pub async fn try_generate_summary(
        &self,
        projects: &[Project],
    ) -> Result<AnalysisResult, AiError> {
        self.limiter.try_acquire()?;

        if projects.is_empty() {
            return Ok(empty_portfolio_analysis(Utc::now()));
        }

        let started_at = Instant::now();
        let prompt = build_project_prompt(projects);
        let text = self.execute_with_retry(&prompt, &self.config.retry).await?;
        info!(
            "event=ai_summary module=analysis status=ok project_count={} duration_ms={} response_chars={}",
            projects.len(),
            started_at.elapsed().as_millis(),
            text.chars().count()
        );
        Ok(Self::parse_response(text))
    }

    /// Generates an AI summary, converting failures into a labeled result.
    pub async fn generate_project_summary(&self, projects: &[Project]) -> AnalysisResult {
        match self.try_generate_summary(projects).await {
            Ok(result) => result,
            Err(err) => Self::handle_ai_error(&err),
        }
    }

    /// Sends `prompt` through the transport under `policy`.
    pub async fn execute_with_retry(
        &self,
        prompt: &str,
        policy: &RetryPolicy,
    ) -> Result<String, AiError> {
        let request = self.build_request(prompt);
        policy
            .execute(|_attempt| self.transport.complete(&request))
            .await
    }

    /// Single-attempt reachability probe. Does not consume rate-limit budget.
    pub async fn health_check(&self) -> Result<String, AiError> {
        self.execute_with_retry(HEALTH_PROMPT, &RetryPolicy::single_attempt())
            .await
    }

    /// Wraps raw AI text into a result with parsed sections.
    pub fn parse_response(text: String) -> AnalysisResult {
        let structured_sections = parse_sections(&text).map(StructuredSections::Ai);
        if structured_sections.is_none() {
            warn!("event=ai_parse module=analysis status=degraded reason=unrecognized_layout");
        }
        let word_count = text.split_whitespace().count();

        AnalysisResult {
            raw_text: text,
            structured_sections,
            timestamp: Utc::now(),
            is_fallback: false,
            error_note: None,
            word_count: Some(word_count),
        }
    }

    /// Maps an error to a user-facing "analysis unavailable" result.
    pub fn handle_ai_error(err: &AiError) -> AnalysisResult {
        let kind = err.kind();
        warn!(
            "event=ai_summary module=analysis status=error error_kind={} error={}",
            kind.as_str(),
            err
        );
        let message = kind.user_message();

        AnalysisResult {
            raw_text: format!(
                "## Analysis Unavailable\n\n{message}\n\n**Suggestion:** Please try again in a few minutes."
            ),
            structured_sections: None,
            timestamp: Utc::now(),
            is_fallback: true,
            error_note: Some(message.to_string()),
            word_count: None,
        }
    }

    fn build_request(&self, prompt: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_INSTRUCTION),
                ChatMessage::user(prompt),
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            top_p: self.config.top_p,
        }
    }
}
