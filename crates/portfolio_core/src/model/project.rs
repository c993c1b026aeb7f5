//! Project domain model.
//!
//! # Responsibility
//! - Define the canonical project record and its lifecycle status.
//! - Provide create/patch request shapes used by the service layer.
//! - Own field-level validation rules shared by storage and HTTP layers.
//!
//! # Invariants
//! - `end_date` must be strictly later than `start_date` when set.
//! - `name` is 3..=255 characters and `description` 10..=2000 characters
//!   after trimming.
//! - `created_at`/`updated_at` are assigned by storage, never by callers.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned integer identity.
pub type ProjectId = i64;

pub const NAME_MIN_CHARS: usize = 3;
pub const NAME_MAX_CHARS: usize = 255;
pub const DESCRIPTION_MIN_CHARS: usize = 10;
pub const DESCRIPTION_MAX_CHARS: usize = 2000;

/// Lifecycle state of a project.
///
/// Declaration order is also the display order used by reports.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    /// Accepted but not started.
    #[default]
    Pending,
    /// Work is ongoing.
    InProgress,
    /// Finished.
    Done,
    /// Abandoned before completion.
    Cancelled,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 4] = [
        ProjectStatus::Pending,
        ProjectStatus::InProgress,
        ProjectStatus::Done,
        ProjectStatus::Cancelled,
    ];

    /// Wire name, e.g. `IN_PROGRESS`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::InProgress => "IN_PROGRESS",
            Self::Done => "DONE",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Human-readable label for charts and reports.
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Done => "Done",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Parses a wire name, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
    }
}

impl Display for ProjectStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical persisted project record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub start_date: DateTime<Utc>,
    /// Strictly after `start_date` when set.
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Validates field constraints and the date window.
    pub fn validate(&self) -> Result<(), ProjectValidationError> {
        validate_name(&self.name)?;
        validate_description(&self.description)?;
        validate_date_window(self.start_date, self.end_date)
    }
}

/// Validated input for creating a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
}

impl NewProject {
    /// Creates a pending project without an end date.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        start_date: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            status: ProjectStatus::default(),
            start_date,
            end_date: None,
        }
    }

    pub fn with_status(mut self, status: ProjectStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_end_date(mut self, end_date: DateTime<Utc>) -> Self {
        self.end_date = Some(end_date);
        self
    }

    /// Returns a copy with surrounding whitespace removed from text fields.
    pub fn normalized(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            ..self.clone()
        }
    }

    pub fn validate(&self) -> Result<(), ProjectValidationError> {
        validate_name(&self.name)?;
        validate_description(&self.description)?;
        validate_date_window(self.start_date, self.end_date)
    }
}

/// Partial update request.
///
/// `None` leaves a field unchanged. For `end_date`, `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<Option<DateTime<Utc>>>,
}

impl ProjectPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
    }

    /// Merges this patch into `project`. Does not validate the result.
    pub fn apply_to(&self, project: &mut Project) {
        if let Some(name) = &self.name {
            project.name = name.trim().to_string();
        }
        if let Some(description) = &self.description {
            project.description = description.trim().to_string();
        }
        if let Some(status) = self.status {
            project.status = status;
        }
        if let Some(start_date) = self.start_date {
            project.start_date = start_date;
        }
        if let Some(end_date) = self.end_date {
            project.end_date = end_date;
        }
    }
}

/// Field-level validation failure for project input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectValidationError {
    /// A required field is absent or blank.
    MissingField(&'static str),
    NameLength { chars: usize },
    DescriptionLength { chars: usize },
    InvalidStatus(String),
    InvalidDate { field: &'static str, value: String },
    /// `end_date` is not strictly after `start_date`.
    InvalidDateWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl ProjectValidationError {
    /// Wire name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingField(field) => field,
            Self::NameLength { .. } => "name",
            Self::DescriptionLength { .. } => "description",
            Self::InvalidStatus(_) => "status",
            Self::InvalidDate { field, .. } => field,
            Self::InvalidDateWindow { .. } => "endDate",
        }
    }
}

impl Display for ProjectValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "`{field}` is required"),
            Self::NameLength { chars } => write!(
                f,
                "name must be between {NAME_MIN_CHARS} and {NAME_MAX_CHARS} characters (got {chars})"
            ),
            Self::DescriptionLength { chars } => write!(
                f,
                "description must be between {DESCRIPTION_MIN_CHARS} and {DESCRIPTION_MAX_CHARS} characters (got {chars})"
            ),
            Self::InvalidStatus(value) => write!(
                f,
                "invalid status `{value}`; expected one of PENDING, IN_PROGRESS, DONE, CANCELLED"
            ),
            Self::InvalidDate { field, value } => write!(
                f,
                "`{field}` must be an ISO 8601 date or timestamp (got `{value}`)"
            ),
            Self::InvalidDateWindow { start, end } => write!(
                f,
                "endDate ({}) must be after startDate ({})",
                end.to_rfc3339(),
                start.to_rfc3339()
            ),
        }
    }
}

impl Error for ProjectValidationError {}

pub fn validate_name(name: &str) -> Result<(), ProjectValidationError> {
    let chars = name.trim().chars().count();
    if chars == 0 {
        return Err(ProjectValidationError::MissingField("name"));
    }
    if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&chars) {
        return Err(ProjectValidationError::NameLength { chars });
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), ProjectValidationError> {
    let chars = description.trim().chars().count();
    if chars == 0 {
        return Err(ProjectValidationError::MissingField("description"));
    }
    if !(DESCRIPTION_MIN_CHARS..=DESCRIPTION_MAX_CHARS).contains(&chars) {
        return Err(ProjectValidationError::DescriptionLength { chars });
    }
    Ok(())
}

pub fn validate_date_window(
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
) -> Result<(), ProjectValidationError> {
    match end {
        Some(end) if end <= start => Err(ProjectValidationError::InvalidDateWindow { start, end }),
        _ => Ok(()),
    }
}

/// Parses a status wire name into a typed status.
pub fn parse_status(value: &str) -> Result<ProjectStatus, ProjectValidationError> {
    ProjectStatus::parse(value).ok_or_else(|| ProjectValidationError::InvalidStatus(value.to_string()))
}

/// Parses an RFC 3339 timestamp or a `YYYY-MM-DD` date (UTC midnight).
pub fn parse_date_input(
    field: &'static str,
    value: &str,
) -> Result<DateTime<Utc>, ProjectValidationError> {
    let trimmed = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ProjectValidationError::InvalidDate {
            field,
            value: trimmed.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::{parse_date_input, ProjectStatus};
    use chrono::{TimeZone, Utc};

    #[test]
    fn status_parse_is_case_insensitive() {
        assert_eq!(ProjectStatus::parse("in_progress"), Some(ProjectStatus::InProgress));
        assert_eq!(ProjectStatus::parse(" DONE "), Some(ProjectStatus::Done));
        assert_eq!(ProjectStatus::parse("finished"), None);
    }

    #[test]
    fn date_input_accepts_plain_dates_and_timestamps() {
        let plain = parse_date_input("startDate", "2024-01-15").unwrap();
        assert_eq!(plain, Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap());

        let stamped = parse_date_input("startDate", "2024-01-15T10:30:00+02:00").unwrap();
        assert_eq!(stamped, Utc.with_ymd_and_hms(2024, 1, 15, 8, 30, 0).unwrap());

        let err = parse_date_input("endDate", "15/01/2024").unwrap_err();
        assert_eq!(err.field(), "endDate");
    }
}
