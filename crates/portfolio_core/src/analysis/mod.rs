//! Portfolio analysis: AI summaries with a rule-based fallback.
//!
//! # Responsibility
//! - Produce an [`AnalysisResult`] for any project list, degrading instead
//!   of failing when the AI service is unavailable.
//!
//! # Invariants
//! - Only [`AnalysisOrchestrator`] converts AI failures into successful
//!   degraded results.
//! - Outbound calls go through a [`CompletionTransport`], so tests never
//!   need the network.

pub mod ai_client;
pub mod error;
pub mod fallback;
pub mod orchestrator;
pub mod prompt;
pub mod rate_limit;
pub mod result;
pub mod retry;
pub mod sections;
pub mod transport;

pub use ai_client::{AiClient, AiClientConfig};
pub use error::{AiError, AiErrorKind};
pub use orchestrator::AnalysisOrchestrator;
pub use rate_limit::{RateLimitConfig, RateLimitWindow, RateLimiter};
pub use result::{AiSections, AnalysisResult, FallbackReport, StructuredSections, TimelineStats};
pub use retry::RetryPolicy;
pub use transport::{
    ChatCompletionRequest, ChatMessage, CompletionTransport, HttpCompletionTransport,
    HttpTransportConfig,
};
