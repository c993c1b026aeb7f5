//! Prompt construction for portfolio analysis.

use crate::model::project::Project;
use chrono::{DateTime, Utc};
use std::fmt::Write as _;

/// Descriptions longer than this are cut in the prompt.
const PROMPT_DESCRIPTION_MAX_CHARS: usize = 200;

pub const SYSTEM_INSTRUCTION: &str = "You are an expert assistant for business project analysis. \
You provide valuable insights and practical recommendations based on data.";

/// Minimal prompt used by the reachability probe.
pub const HEALTH_PROMPT: &str = "Reply with \"OK\" if you are working.";

/// Builds the analysis request for `projects`.
///
/// The five section headers here are the markers the response parser
/// looks for, so they must stay in sync with `sections::SECTION_MARKERS`.
pub fn build_project_prompt(projects: &[Project]) -> String {
    let mut details = String::new();
    for (index, project) in projects.iter().enumerate() {
        if index > 0 {
            details.push_str("\n\n");
        }
        let _ = write!(
            details,
            "Project {number}:\n- Name: {name}\n- Status: {status}\n- Description: {description}\n- Start date: {start}\n- End date: {end}\n- Duration: {duration}",
            number = index + 1,
            name = project.name,
            status = project.status.as_str(),
            description = truncate_description(&project.description),
            start = format_date(project.start_date),
            end = project.end_date.map_or_else(|| "not set".to_string(), format_date),
            duration = project.end_date.map_or_else(
                || "open-ended".to_string(),
                |end| format!("{} days", (end - project.start_date).num_days())
            ),
        );
    }

    format!(
        "You are an expert in project management and business analysis.
Analyze the following list of {count} projects and write an executive summary that includes:

**SPECIFIC INSTRUCTIONS:**
1. **OVERVIEW**: A concise summary of the whole portfolio
2. **STATUS ANALYSIS**: Distribution and meaning of the current statuses
3. **TIMELINE TRENDS**: Patterns in dates and deadlines
4. **IDENTIFIED RISKS**: Potential problems or areas needing attention
5. **RECOMMENDATIONS**: 3-5 specific, actionable suggestions for improvement

**REQUIRED RESPONSE FORMAT:**
- Use markdown for readability
- At most 500 words
- Professional but accessible language
- Focused on actionable insights

**PROJECT DATA:**
{details}

Please produce an analysis that is useful for executive decision making:",
        count = projects.len(),
    )
}

fn format_date(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%d").to_string()
}

fn truncate_description(description: &str) -> String {
    if description.chars().count() <= PROMPT_DESCRIPTION_MAX_CHARS {
        return description.to_string();
    }
    let mut truncated: String = description.chars().take(PROMPT_DESCRIPTION_MAX_CHARS).collect();
    truncated.push_str("...");
    truncated
}

#[cfg(test)]
mod tests {
    use super::{build_project_prompt, truncate_description};
    use crate::analysis::sections::SECTION_MARKERS;
    use crate::model::project::{Project, ProjectStatus};
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn prompt_lists_every_project_and_section_header() {
        let start = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        let projects = vec![
            Project {
                id: 1,
                name: "Billing revamp".to_string(),
                description: "Rebuild invoicing".to_string(),
                status: ProjectStatus::InProgress,
                start_date: start,
                end_date: Some(start + Duration::days(30)),
                created_at: start,
                updated_at: start,
            },
            Project {
                id: 2,
                name: "Mobile app".to_string(),
                description: "Delivery app".to_string(),
                status: ProjectStatus::Pending,
                start_date: start,
                end_date: None,
                created_at: start,
                updated_at: start,
            },
        ];

        let prompt = build_project_prompt(&projects);
        assert!(prompt.contains("Project 1:\n- Name: Billing revamp"));
        assert!(prompt.contains("- Status: IN_PROGRESS"));
        assert!(prompt.contains("- Duration: 30 days"));
        assert!(prompt.contains("- End date: not set"));
        for (marker, _) in SECTION_MARKERS {
            assert!(prompt.contains(marker), "missing marker {marker}");
        }
    }

    #[test]
    fn long_descriptions_are_truncated() {
        let long = "x".repeat(250);
        let truncated = truncate_description(&long);
        assert_eq!(truncated.chars().count(), 203);
        assert!(truncated.ends_with("..."));
    }
}
