//! Core domain logic for the project portfolio service.
//! Storage, use-case services and portfolio analysis live here; the HTTP
//! boundary is a separate crate.

pub mod analysis;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use analysis::{
    AiClient, AiClientConfig, AiError, AiErrorKind, AnalysisOrchestrator, AnalysisResult,
    CompletionTransport, HttpCompletionTransport, HttpTransportConfig, RateLimitConfig,
    RetryPolicy, StructuredSections,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::project::{
    NewProject, Project, ProjectId, ProjectPatch, ProjectStatus, ProjectValidationError,
};
pub use repo::project_repo::{
    ProjectListQuery, ProjectRepository, ProjectSortField, RepoError, RepoResult,
    SortOrder, SqliteProjectRepository,
};
pub use service::chart_service::ChartSummary;
pub use service::project_service::ProjectService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
