//! Chart statistics for the portfolio dashboard.
//!
//! # Responsibility
//! - Aggregate per-status counts into a pie-chart friendly shape.
//! - Provide headline totals for dashboard cards.

use crate::model::project::{Project, ProjectStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;

fn status_color(status: ProjectStatus) -> &'static str {
    match status {
        ProjectStatus::Pending => "#FF6384",
        ProjectStatus::InProgress => "#36A2EB",
        ProjectStatus::Done => "#4BC0C0",
        ProjectStatus::Cancelled => "#FFCE56",
    }
}

/// One slice of the status pie chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSlice {
    pub status: ProjectStatus,
    pub label: &'static str,
    pub count: usize,
    pub color: &'static str,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioTotals {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub pending: usize,
    pub cancelled: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSummary {
    /// Only statuses with at least one project, in status order.
    pub status_slices: Vec<StatusSlice>,
    pub stats: PortfolioTotals,
    pub last_updated: DateTime<Utc>,
}

impl ChartSummary {
    pub fn from_projects(projects: &[Project], now: DateTime<Utc>) -> Self {
        let count_of = |status: ProjectStatus| {
            projects
                .iter()
                .filter(|project| project.status == status)
                .count()
        };

        let status_slices = ProjectStatus::ALL
            .into_iter()
            .map(|status| StatusSlice {
                status,
                label: status.label(),
                count: count_of(status),
                color: status_color(status),
            })
            .filter(|slice| slice.count > 0)
            .collect();

        Self {
            status_slices,
            stats: PortfolioTotals {
                total: projects.len(),
                completed: count_of(ProjectStatus::Done),
                in_progress: count_of(ProjectStatus::InProgress),
                pending: count_of(ProjectStatus::Pending),
                cancelled: count_of(ProjectStatus::Cancelled),
            },
            last_updated: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ChartSummary;
    use crate::model::project::{Project, ProjectStatus};
    use chrono::{TimeZone, Utc};

    fn project(id: i64, status: ProjectStatus) -> Project {
        let start = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        Project {
            id,
            name: format!("Project {id}"),
            description: "Chart sample project".to_string(),
            status,
            start_date: start,
            end_date: None,
            created_at: start,
            updated_at: start,
        }
    }

    #[test]
    fn slices_skip_empty_statuses_and_totals_add_up() {
        let now = Utc::now();
        let projects = vec![
            project(1, ProjectStatus::Done),
            project(2, ProjectStatus::Done),
            project(3, ProjectStatus::Pending),
        ];
        let summary = ChartSummary::from_projects(&projects, now);

        let statuses: Vec<ProjectStatus> = summary
            .status_slices
            .iter()
            .map(|slice| slice.status)
            .collect();
        assert_eq!(statuses, vec![ProjectStatus::Pending, ProjectStatus::Done]);
        assert_eq!(summary.status_slices[1].count, 2);
        assert_eq!(summary.status_slices[1].color, "#4BC0C0");
        assert_eq!(summary.stats.total, 3);
        assert_eq!(summary.stats.completed, 2);
        assert_eq!(summary.stats.in_progress, 0);
        assert_eq!(summary.last_updated, now);
    }
}
