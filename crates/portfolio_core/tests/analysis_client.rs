use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use portfolio_core::analysis::ChatCompletionRequest;
use portfolio_core::{
    AiClient, AiClientConfig, AiError, AnalysisOrchestrator, CompletionTransport, Project,
    ProjectStatus, RateLimitConfig, RetryPolicy, StructuredSections,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

const AI_ANSWER: &str = "## OVERVIEW\nTwo projects.\n## STATUS ANALYSIS\nBalanced.\n## TIMELINE TRENDS\nOn time.\n## IDENTIFIED RISKS\nNone.\n## RECOMMENDATIONS\nKeep going.";

/// Replays queued outcomes in order and records every request.
#[derive(Default)]
struct ScriptedTransport {
    outcomes: Mutex<VecDeque<Result<String, AiError>>>,
    requests: Mutex<Vec<ChatCompletionRequest>>,
    calls: AtomicU32,
}

impl ScriptedTransport {
    fn new(outcomes: Vec<Result<String, AiError>>) -> Arc<Self> {
        Arc::new(Self {
            outcomes: Mutex::new(outcomes.into()),
            ..Self::default()
        })
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionTransport for ScriptedTransport {
    async fn complete(&self, request: &ChatCompletionRequest) -> Result<String, AiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AiError::Transport("script exhausted".to_string())))
    }
}

fn projects() -> Vec<Project> {
    let start = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
    ProjectStatus::ALL
        .iter()
        .enumerate()
        .map(|(index, status)| Project {
            id: index as i64 + 1,
            name: format!("Project {}", index + 1),
            description: "A sample portfolio project".to_string(),
            status: *status,
            start_date: start,
            end_date: Some(start + Duration::days(30)),
            created_at: start,
            updated_at: start,
        })
        .collect()
}

fn client_with(transport: Arc<ScriptedTransport>, config: AiClientConfig) -> Arc<AiClient> {
    Arc::new(AiClient::new(config, transport))
}

fn unreachable() -> AiError {
    AiError::Connection("connection refused".to_string())
}

#[tokio::test(start_paused = true)]
async fn two_failures_then_success_returns_ai_result() {
    let transport = ScriptedTransport::new(vec![
        Err(unreachable()),
        Err(AiError::Status {
            status: 503,
            body: "busy".to_string(),
        }),
        Ok(AI_ANSWER.to_string()),
    ]);
    let orchestrator = AnalysisOrchestrator::new(client_with(
        transport.clone(),
        AiClientConfig::default(),
    ));

    let result = orchestrator.get_project_analysis(&projects()).await;

    assert_eq!(transport.calls(), 3);
    assert!(!result.is_fallback);
    assert_eq!(result.error_note, None);
    assert_eq!(result.word_count, Some(AI_ANSWER.split_whitespace().count()));
    let Some(StructuredSections::Ai(sections)) = result.structured_sections else {
        panic!("expected parsed AI sections");
    };
    assert_eq!(sections.overview.as_deref(), Some("Two projects.\n##"));
    assert_eq!(sections.recommendations.as_deref(), Some("Keep going."));
}

#[tokio::test(start_paused = true)]
async fn exhausted_retries_degrade_to_labeled_fallback() {
    let transport = ScriptedTransport::new(vec![
        Err(unreachable()),
        Err(unreachable()),
        Err(unreachable()),
    ]);
    let orchestrator = AnalysisOrchestrator::new(client_with(
        transport.clone(),
        AiClientConfig::default(),
    ));

    let result = orchestrator.get_project_analysis(&projects()).await;

    assert_eq!(transport.calls(), 3);
    assert!(result.is_fallback);
    assert!(matches!(
        result.structured_sections,
        Some(StructuredSections::Fallback(_))
    ));
    let note = result.error_note.unwrap();
    assert!(note.starts_with("AI service temporarily unavailable: "));
    assert!(note.contains("connection refused"));
}

#[tokio::test(start_paused = true)]
async fn regenerate_uses_its_own_note_prefix() {
    let transport = ScriptedTransport::new(vec![Err(AiError::Timeout)]);
    let config = AiClientConfig {
        retry: RetryPolicy::single_attempt(),
        ..AiClientConfig::default()
    };
    let orchestrator = AnalysisOrchestrator::new(client_with(transport.clone(), config));

    let result = orchestrator.regenerate_analysis(&projects()).await;

    assert_eq!(transport.calls(), 1);
    assert!(result.is_fallback);
    assert!(result
        .error_note
        .unwrap()
        .starts_with("Could not regenerate analysis: "));
}

#[tokio::test]
async fn authentication_failure_is_not_retried() {
    let transport = ScriptedTransport::new(vec![Err(AiError::Status {
        status: 401,
        body: "bad key".to_string(),
    })]);
    let client = client_with(transport.clone(), AiClientConfig::default());

    let err = client.try_generate_summary(&projects()).await.unwrap_err();

    assert_eq!(transport.calls(), 1);
    assert_eq!(err.user_message(), "Authentication with the AI service failed");
}

#[tokio::test]
async fn rate_limited_calls_never_reach_the_transport() {
    let transport = ScriptedTransport::new(vec![
        Ok(AI_ANSWER.to_string()),
        Ok(AI_ANSWER.to_string()),
    ]);
    let config = AiClientConfig {
        rate_limit: RateLimitConfig {
            max_requests: 2,
            window: std::time::Duration::from_secs(60),
        },
        ..AiClientConfig::default()
    };
    let client = client_with(transport.clone(), config);

    client.try_generate_summary(&projects()).await.unwrap();
    client.try_generate_summary(&projects()).await.unwrap();
    let err = client.try_generate_summary(&projects()).await.unwrap_err();

    assert_eq!(err, AiError::RateLimitExceeded);
    assert_eq!(transport.calls(), 2);
    assert_eq!(client.rate_limiter().snapshot().request_count, 2);
}

#[tokio::test]
async fn rate_limit_rejection_still_yields_a_result() {
    let transport = ScriptedTransport::new(Vec::new());
    let config = AiClientConfig {
        rate_limit: RateLimitConfig {
            max_requests: 0,
            window: std::time::Duration::from_secs(60),
        },
        ..AiClientConfig::default()
    };
    let client = client_with(transport.clone(), config);

    let summary = client.generate_project_summary(&projects()).await;
    assert!(summary.is_fallback);
    assert!(summary.raw_text.starts_with("## Analysis Unavailable"));
    assert_eq!(summary.structured_sections, None);

    let orchestrator = AnalysisOrchestrator::new(client);
    let analysis = orchestrator.get_project_analysis(&projects()).await;
    assert!(analysis.is_fallback);
    assert!(analysis.error_note.unwrap().contains("rate limit exceeded"));
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn empty_portfolio_skips_the_ai_service() {
    let transport = ScriptedTransport::new(vec![Ok(AI_ANSWER.to_string())]);
    let orchestrator = AnalysisOrchestrator::new(client_with(
        transport.clone(),
        AiClientConfig::default(),
    ));

    let result = orchestrator.get_project_analysis(&[]).await;
    let regenerated = orchestrator.regenerate_analysis(&[]).await;

    assert_eq!(transport.calls(), 0);
    assert!(result.is_fallback);
    assert_eq!(result.structured_sections, None);
    assert_eq!(regenerated.raw_text, result.raw_text);
}

#[tokio::test]
async fn request_carries_generation_settings_and_project_data() {
    let transport = ScriptedTransport::new(vec![Ok(AI_ANSWER.to_string())]);
    let client = client_with(transport.clone(), AiClientConfig::default());

    client.try_generate_summary(&projects()).await.unwrap();

    let requests = transport.requests.lock().unwrap();
    let request = &requests[0];
    assert_eq!(request.model, "deepseek-chat");
    assert_eq!(request.max_tokens, 1500);
    assert_eq!(request.messages.len(), 2);
    assert_eq!(request.messages[0].role, "system");
    assert!(request.messages[1].content.contains("- Name: Project 1"));
    assert!(request.messages[1].content.contains("- Status: CANCELLED"));
}

#[tokio::test]
async fn health_check_is_single_attempt_and_free_of_rate_limit() {
    let transport = ScriptedTransport::new(vec![Err(unreachable()), Ok("OK".to_string())]);
    let config = AiClientConfig {
        rate_limit: RateLimitConfig {
            max_requests: 0,
            window: std::time::Duration::from_secs(60),
        },
        ..AiClientConfig::default()
    };
    let orchestrator = AnalysisOrchestrator::new(client_with(transport.clone(), config));

    assert!(orchestrator.health_check().await.is_err());
    assert_eq!(transport.calls(), 1);
    assert_eq!(orchestrator.health_check().await.unwrap(), "OK");
    assert_eq!(transport.calls(), 2);
}
