//! Request payload parsing and sanitization.
//!
//! # Responsibility
//! - Turn raw JSON bodies and query strings into typed core requests.
//! - Collect every field problem of one request into a single error.
//!
//! # Invariants
//! - String inputs are trimmed; angle brackets are removed from every
//!   field except `description`.
//! - Parsing never touches storage.

use crate::error::{ApiError, FieldError};
use portfolio_core::model::project::{
    parse_date_input, parse_status, validate_date_window, validate_description, validate_name,
    ProjectValidationError,
};
use portfolio_core::repo::project_repo::LIST_LIMIT_MAX;
use portfolio_core::{
    NewProject, ProjectId, ProjectListQuery, ProjectPatch, ProjectSortField, SortOrder,
};
use serde::{Deserialize, Deserializer};

/// Page size applied when `page` is given without `limit`.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Trims `value` and strips `<`/`>`.
pub fn sanitize_text(value: &str) -> String {
    value.trim().replace(['<', '>'], "")
}

/// Trims `value` only. Descriptions keep their angle brackets.
pub fn sanitize_description(value: &str) -> String {
    value.trim().to_string()
}

/// Distinguishes an absent field from an explicit `null`.
fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Body of `POST /api/projects`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectBody {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Body of `PUT /api/projects/{id}`.
///
/// `endDate: null` clears the end date; an absent `endDate` keeps it.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectBody {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub end_date: Option<Option<String>>,
}

/// Query string of `GET /api/projects`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListProjectsParams {
    pub status: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub limit: Option<String>,
    pub page: Option<String>,
}

/// Accumulates field errors across one request.
#[derive(Default)]
struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    fn check<T>(&mut self, result: Result<T, ProjectValidationError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.0.push(FieldError::from(&err));
                None
            }
        }
    }

    fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    fn finish(self) -> Result<(), ApiError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self.into_error())
        }
    }

    fn into_error(self) -> ApiError {
        ApiError::Validation(self.0)
    }
}

impl CreateProjectBody {
    pub fn into_new_project(self) -> Result<NewProject, ApiError> {
        let mut errors = FieldErrors::default();

        let name = sanitize_text(self.name.as_deref().unwrap_or_default());
        errors.check(validate_name(&name));
        let description = sanitize_description(self.description.as_deref().unwrap_or_default());
        errors.check(validate_description(&description));

        let status = match self.status.as_deref().map(sanitize_text) {
            Some(raw) if !raw.is_empty() => errors.check(parse_status(&raw)),
            _ => Some(Default::default()),
        };

        let start_date = match self.start_date.as_deref().map(sanitize_text) {
            Some(raw) if !raw.is_empty() => errors.check(parse_date_input("startDate", &raw)),
            _ => errors.check(Err(ProjectValidationError::MissingField("startDate"))),
        };
        let end_date = match self.end_date.as_deref().map(sanitize_text) {
            Some(raw) if !raw.is_empty() => errors.check(parse_date_input("endDate", &raw)).map(Some),
            _ => Some(None),
        };

        if let (Some(start), Some(end)) = (start_date, end_date) {
            errors.check(validate_date_window(start, end));
        }

        // A `None` here always has a recorded field error.
        let (Some(status), Some(start_date), Some(end_date)) = (status, start_date, end_date)
        else {
            return Err(errors.into_error());
        };
        errors.finish()?;

        Ok(NewProject {
            name,
            description,
            status,
            start_date,
            end_date,
        })
    }
}

impl UpdateProjectBody {
    /// Parses present fields. The merged record is validated by the service.
    pub fn into_patch(self) -> Result<ProjectPatch, ApiError> {
        let mut errors = FieldErrors::default();
        let mut patch = ProjectPatch::default();

        if let Some(raw) = self.name.as_deref() {
            let name = sanitize_text(raw);
            if errors.check(validate_name(&name)).is_some() {
                patch.name = Some(name);
            }
        }
        if let Some(raw) = self.description.as_deref() {
            let description = sanitize_description(raw);
            if errors.check(validate_description(&description)).is_some() {
                patch.description = Some(description);
            }
        }
        if let Some(raw) = self.status.as_deref() {
            patch.status = errors.check(parse_status(&sanitize_text(raw)));
        }
        if let Some(raw) = self.start_date.as_deref() {
            patch.start_date = errors.check(parse_date_input("startDate", &sanitize_text(raw)));
        }
        match self.end_date {
            None => {}
            Some(None) => patch.end_date = Some(None),
            Some(Some(raw)) => {
                let raw = sanitize_text(&raw);
                if raw.is_empty() {
                    patch.end_date = Some(None);
                } else {
                    patch.end_date = errors.check(parse_date_input("endDate", &raw)).map(Some);
                }
            }
        }

        errors.finish()?;
        Ok(patch)
    }
}

impl ListProjectsParams {
    pub fn into_query(self) -> Result<ProjectListQuery, ApiError> {
        let mut errors = FieldErrors::default();
        let mut query = ProjectListQuery::default();

        if let Some(raw) = non_blank(self.status.as_deref()) {
            query.status = errors.check(parse_status(&raw));
        }
        if let Some(raw) = non_blank(self.sort_by.as_deref()) {
            match ProjectSortField::parse(&raw) {
                Some(field) => query.sort_by = field,
                None => errors.push(
                    "sortBy",
                    "sortBy must be one of name, status, startDate, endDate, createdAt, updatedAt",
                ),
            }
        }
        if let Some(raw) = non_blank(self.sort_order.as_deref()) {
            match SortOrder::parse(&raw) {
                Some(order) => query.order = order,
                None => errors.push("sortOrder", "sortOrder must be asc or desc"),
            }
        }

        let limit = match non_blank(self.limit.as_deref()) {
            None => None,
            Some(raw) => match raw.parse::<u32>() {
                Ok(limit) if (1..=LIST_LIMIT_MAX).contains(&limit) => Some(limit),
                _ => {
                    errors.push("limit", format!("limit must be between 1 and {LIST_LIMIT_MAX}"));
                    None
                }
            },
        };
        let page = match non_blank(self.page.as_deref()) {
            None => None,
            Some(raw) => match raw.parse::<u32>() {
                Ok(page) if page >= 1 => Some(page),
                _ => {
                    errors.push("page", "page must be a positive integer");
                    None
                }
            },
        };

        errors.finish()?;

        query.limit = limit;
        if let Some(page) = page {
            let page_size = limit.unwrap_or(DEFAULT_PAGE_SIZE);
            query.limit = Some(page_size);
            query.offset = (page - 1).saturating_mul(page_size);
        }
        Ok(query)
    }
}

/// Parses a path id. Only positive integers name a project.
pub fn parse_project_id(raw: &str) -> Result<ProjectId, ApiError> {
    match sanitize_text(raw).parse::<ProjectId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::Validation(vec![FieldError {
            field: "id".to_string(),
            message: format!("`{}` is not a valid project id", sanitize_text(raw)),
        }])),
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(sanitize_text).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{
        parse_project_id, sanitize_text, CreateProjectBody, ListProjectsParams, UpdateProjectBody,
    };
    use crate::error::ApiError;
    use portfolio_core::{ProjectSortField, ProjectStatus, SortOrder};

    #[test]
    fn sanitize_trims_and_strips_angle_brackets() {
        assert_eq!(sanitize_text("  <b>Launch</b>  "), "bLaunch/b");
    }

    #[test]
    fn create_body_defaults_status_and_keeps_description_markup() {
        let body = CreateProjectBody {
            name: Some(" <Alpha> ".to_string()),
            description: Some("  Uses <tags> in text  ".to_string()),
            start_date: Some("2024-01-15".to_string()),
            ..CreateProjectBody::default()
        };
        let project = body.into_new_project().unwrap();

        assert_eq!(project.name, "Alpha");
        assert_eq!(project.description, "Uses <tags> in text");
        assert_eq!(project.status, ProjectStatus::Pending);
        assert_eq!(project.end_date, None);
    }

    #[test]
    fn create_body_reports_every_bad_field() {
        let body = CreateProjectBody {
            name: Some("ab".to_string()),
            status: Some("archived".to_string()),
            ..CreateProjectBody::default()
        };
        let ApiError::Validation(details) = body.into_new_project().unwrap_err() else {
            panic!("expected validation error");
        };
        let fields: Vec<&str> = details.iter().map(|detail| detail.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "description", "status", "startDate"]);
    }

    #[test]
    fn create_body_rejects_reversed_window() {
        let body = CreateProjectBody {
            name: Some("Alpha".to_string()),
            description: Some("Long enough text".to_string()),
            start_date: Some("2024-02-01".to_string()),
            end_date: Some("2024-01-01".to_string()),
            ..CreateProjectBody::default()
        };
        let ApiError::Validation(details) = body.into_new_project().unwrap_err() else {
            panic!("expected validation error");
        };
        assert_eq!(details[0].field, "endDate");
    }

    #[test]
    fn create_body_with_only_a_bad_status_is_a_validation_error() {
        let body = CreateProjectBody {
            name: Some("Alpha".to_string()),
            description: Some("Long enough text".to_string()),
            status: Some("archived".to_string()),
            start_date: Some("2024-02-01".to_string()),
            end_date: Some("2024-01-01".to_string()),
        };
        let ApiError::Validation(details) = body.into_new_project().unwrap_err() else {
            panic!("expected validation error");
        };
        let fields: Vec<&str> = details.iter().map(|detail| detail.field.as_str()).collect();
        assert_eq!(fields, vec!["status", "endDate"]);
    }

    #[test]
    fn update_body_distinguishes_null_from_absent_end_date() {
        let cleared: UpdateProjectBody = serde_json::from_str(r#"{"endDate": null}"#).unwrap();
        assert_eq!(cleared.into_patch().unwrap().end_date, Some(None));

        let untouched: UpdateProjectBody = serde_json::from_str(r#"{"name": "Renamed"}"#).unwrap();
        let patch = untouched.into_patch().unwrap();
        assert_eq!(patch.end_date, None);
        assert_eq!(patch.name.as_deref(), Some("Renamed"));
    }

    #[test]
    fn list_params_map_to_query() {
        let params = ListProjectsParams {
            status: Some("done".to_string()),
            sort_by: Some("name".to_string()),
            sort_order: Some("ASC".to_string()),
            limit: Some("5".to_string()),
            page: Some("3".to_string()),
        };
        let query = params.into_query().unwrap();

        assert_eq!(query.status, Some(ProjectStatus::Done));
        assert_eq!(query.sort_by, ProjectSortField::Name);
        assert_eq!(query.order, SortOrder::Asc);
        assert_eq!(query.limit, Some(5));
        assert_eq!(query.offset, 10);
    }

    #[test]
    fn list_params_reject_out_of_range_limit() {
        let params = ListProjectsParams {
            limit: Some("101".to_string()),
            ..ListProjectsParams::default()
        };
        assert!(matches!(
            params.into_query().unwrap_err(),
            ApiError::Validation(_)
        ));
    }

    #[test]
    fn project_ids_must_be_positive_integers() {
        assert_eq!(parse_project_id("12").unwrap(), 12);
        assert!(parse_project_id("0").is_err());
        assert!(parse_project_id("abc").is_err());
    }
}
