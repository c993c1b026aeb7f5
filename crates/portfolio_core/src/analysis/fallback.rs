//! Rule-based portfolio analysis used when the AI service is unavailable.
//!
//! # Responsibility
//! - Summarize a project list deterministically, without I/O.
//! - Produce both a markdown rendering and a structured report.
//!
//! # Invariants
//! - Every function is total; there are no error paths.
//! - The recommendation list is never empty.
//! - Risk names keep input order.

use super::result::{AnalysisResult, FallbackReport, StructuredSections, TimelineStats};
use crate::model::project::{Project, ProjectStatus};
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// In-progress projects older than this are flagged as long-running.
pub const LONG_RUNNING_THRESHOLD_DAYS: i64 = 90;

/// Completion-focus is recommended below this many finished projects.
const MIN_DONE_PROJECTS: usize = 2;

const EMPTY_PORTFOLIO_TEXT: &str = "## Welcome to Project Portfolio Analysis

There are no projects to analyze yet.

**To get started:**
1. Add new projects using the project form
2. Set realistic statuses and dates
3. Come back to this section for an AI-powered analysis

**What the AI analysis gives you:**
- Proactive risk identification
- Tailored recommendations
- Trend insights
- Resource optimization";

const REBALANCE_RECOMMENDATION: &str =
    "• Consider starting more pending projects to balance the workload";
const COMPLETION_RECOMMENDATION: &str = "• Focus on finishing projects to demonstrate progress";
const HEALTHY_RECOMMENDATION: &str = "• The portfolio looks healthy overall";

/// Counts projects per status. Only occurring statuses get a key.
pub fn compute_state_distribution(projects: &[Project]) -> BTreeMap<ProjectStatus, usize> {
    let mut distribution = BTreeMap::new();
    for project in projects {
        *distribution.entry(project.status).or_insert(0) += 1;
    }
    distribution
}

pub fn compute_timeline_stats(projects: &[Project], now: DateTime<Utc>) -> TimelineStats {
    let upcoming_deadlines = projects
        .iter()
        .filter(|project| project.end_date.is_some_and(|end| end > now))
        .count();
    let overdue_projects = projects.iter().filter(|project| is_overdue(project, now)).count();

    TimelineStats {
        upcoming_deadlines,
        overdue_projects,
    }
}

/// Names of projects matching any risk heuristic, in input order.
///
/// A project is at risk when it has no end date, is overdue and not done,
/// or has been in progress for more than [`LONG_RUNNING_THRESHOLD_DAYS`].
pub fn identify_risk_projects(projects: &[Project], now: DateTime<Utc>) -> Vec<String> {
    projects
        .iter()
        .filter(|project| is_at_risk(project, now))
        .map(|project| project.name.clone())
        .collect()
}

pub fn generate_recommendations(
    distribution: &BTreeMap<ProjectStatus, usize>,
    risks: &[String],
) -> Vec<String> {
    let count = |status| distribution.get(&status).copied().unwrap_or(0);
    let mut recommendations = Vec::new();

    if count(ProjectStatus::Pending) > count(ProjectStatus::InProgress) {
        recommendations.push(REBALANCE_RECOMMENDATION.to_string());
    }
    if !risks.is_empty() {
        recommendations.push(format!(
            "• Review the {} projects flagged with potential risks",
            risks.len()
        ));
    }
    if count(ProjectStatus::Done) < MIN_DONE_PROJECTS {
        recommendations.push(COMPLETION_RECOMMENDATION.to_string());
    }

    if recommendations.is_empty() {
        recommendations.push(HEALTHY_RECOMMENDATION.to_string());
    }
    recommendations
}

/// Builds the fallback analysis evaluated at `now`.
pub fn generate_basic_analysis_at(projects: &[Project], now: DateTime<Utc>) -> AnalysisResult {
    if projects.is_empty() {
        return empty_portfolio_analysis(now);
    }

    let state_distribution = compute_state_distribution(projects);
    let timeline_analysis = compute_timeline_stats(projects, now);
    let risk_projects = identify_risk_projects(projects, now);
    let recommendations = generate_recommendations(&state_distribution, &risk_projects);

    let report = FallbackReport {
        state_distribution,
        timeline_analysis,
        risk_projects,
        recommendations,
    };

    AnalysisResult {
        raw_text: format_basic_analysis(&report),
        structured_sections: Some(StructuredSections::Fallback(report)),
        timestamp: now,
        is_fallback: true,
        error_note: None,
        word_count: None,
    }
}

/// Builds the fallback analysis against the wall clock.
pub fn generate_basic_analysis(projects: &[Project]) -> AnalysisResult {
    generate_basic_analysis_at(projects, Utc::now())
}

/// Fixed onboarding result for an empty portfolio.
pub fn empty_portfolio_analysis(now: DateTime<Utc>) -> AnalysisResult {
    AnalysisResult {
        raw_text: EMPTY_PORTFOLIO_TEXT.to_string(),
        structured_sections: None,
        timestamp: now,
        is_fallback: true,
        error_note: None,
        word_count: None,
    }
}

/// Renders a report as markdown.
pub fn format_basic_analysis(report: &FallbackReport) -> String {
    let mut text = String::from("## Basic Project Analysis\n\n### Status Distribution\n");
    for (status, count) in &report.state_distribution {
        let _ = writeln!(text, "- **{}**: {} projects", status.as_str(), count);
    }

    let _ = write!(
        text,
        "\n### Deadlines\n- **Upcoming deadlines**: {} projects\n- **Overdue projects**: {} projects\n",
        report.timeline_analysis.upcoming_deadlines, report.timeline_analysis.overdue_projects
    );

    text.push_str("\n### Projects at Risk\n");
    if report.risk_projects.is_empty() {
        text.push_str("- No critical risks identified\n");
    } else {
        for name in &report.risk_projects {
            let _ = writeln!(text, "- {name}");
        }
    }

    text.push_str("\n### Recommendations\n");
    text.push_str(&report.recommendations.join("\n"));
    text.push_str(
        "\n\n*Note: this is an automatic basic analysis. Use the AI service when it is available for deeper insights.*",
    );
    text
}

fn is_overdue(project: &Project, now: DateTime<Utc>) -> bool {
    project
        .end_date
        .is_some_and(|end| end < now && project.status != ProjectStatus::Done)
}

fn is_at_risk(project: &Project, now: DateTime<Utc>) -> bool {
    if project.end_date.is_none() || is_overdue(project, now) {
        return true;
    }
    project.status == ProjectStatus::InProgress
        && now - project.start_date > Duration::days(LONG_RUNNING_THRESHOLD_DAYS)
}

#[cfg(test)]
mod tests {
    use super::{format_basic_analysis, generate_recommendations, is_at_risk};
    use crate::analysis::result::{FallbackReport, TimelineStats};
    use crate::model::project::{Project, ProjectStatus};
    use chrono::{Duration, TimeZone, Utc};
    use std::collections::BTreeMap;

    fn project(status: ProjectStatus, start_offset_days: i64, end_offset_days: Option<i64>) -> Project {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        Project {
            id: 1,
            name: "Sample".to_string(),
            description: "A sample project".to_string(),
            status,
            start_date: now + Duration::days(start_offset_days),
            end_date: end_offset_days.map(|days| now + Duration::days(days)),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn done_project_past_end_date_is_not_at_risk() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        assert!(!is_at_risk(&project(ProjectStatus::Done, -30, Some(-10)), now));
        assert!(is_at_risk(&project(ProjectStatus::Pending, -30, Some(-10)), now));
    }

    #[test]
    fn healthy_recommendation_only_when_other_rules_are_silent() {
        let mut distribution = BTreeMap::new();
        distribution.insert(ProjectStatus::Done, 3);
        distribution.insert(ProjectStatus::InProgress, 1);
        assert_eq!(
            generate_recommendations(&distribution, &[]),
            vec!["• The portfolio looks healthy overall".to_string()]
        );

        let risks = vec!["Late".to_string()];
        let recommendations = generate_recommendations(&distribution, &risks);
        assert_eq!(recommendations.len(), 1);
        assert!(recommendations[0].contains("Review the 1 projects"));
    }

    #[test]
    fn markdown_lists_placeholder_when_no_risks() {
        let report = FallbackReport {
            state_distribution: BTreeMap::from([(ProjectStatus::Done, 2)]),
            timeline_analysis: TimelineStats::default(),
            risk_projects: Vec::new(),
            recommendations: vec!["• The portfolio looks healthy overall".to_string()],
        };
        let text = format_basic_analysis(&report);
        assert!(text.contains("- **DONE**: 2 projects"));
        assert!(text.contains("No critical risks identified"));
    }
}
