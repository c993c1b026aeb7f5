//! Project repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over the `projects` table.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - `updated_at` never moves backwards for a given row.

use crate::db::DbError;
use crate::model::project::{
    NewProject, Project, ProjectId, ProjectStatus, ProjectValidationError,
};
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const PROJECT_SELECT_SQL: &str = "SELECT
    id,
    name,
    description,
    status,
    start_date,
    end_date,
    created_at,
    updated_at
FROM projects";

/// Upper bound accepted for `ProjectListQuery::limit`.
pub const LIST_LIMIT_MAX: u32 = 100;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for project persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ProjectValidationError),
    Db(DbError),
    NotFound(ProjectId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "project not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted project data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<ProjectValidationError> for RepoError {
    fn from(value: ProjectValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Sortable project columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProjectSortField {
    Name,
    Status,
    StartDate,
    EndDate,
    #[default]
    CreatedAt,
    UpdatedAt,
}

impl ProjectSortField {
    /// Parses the wire (camelCase) field name.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "name" => Some(Self::Name),
            "status" => Some(Self::Status),
            "startDate" => Some(Self::StartDate),
            "endDate" => Some(Self::EndDate),
            "createdAt" => Some(Self::CreatedAt),
            "updatedAt" => Some(Self::UpdatedAt),
            _ => None,
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Status => "status",
            Self::StartDate => "start_date",
            Self::EndDate => "end_date",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Query options for listing projects.
///
/// The default lists every project, newest first.
#[derive(Debug, Clone, Default)]
pub struct ProjectListQuery {
    pub status: Option<ProjectStatus>,
    pub sort_by: ProjectSortField,
    pub order: SortOrder,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for project CRUD operations.
pub trait ProjectRepository {
    fn create_project(&self, project: &NewProject) -> RepoResult<Project>;
    fn update_project(&self, project: &Project) -> RepoResult<Project>;
    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>>;
    fn list_projects(&self, query: &ProjectListQuery) -> RepoResult<Vec<Project>>;
    fn delete_project(&self, id: ProjectId) -> RepoResult<()>;
    fn count_projects(&self) -> RepoResult<u64>;
}

/// SQLite-backed project repository.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn require_project(&self, id: ProjectId) -> RepoResult<Project> {
        self.get_project(id)?.ok_or(RepoError::NotFound(id))
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn create_project(&self, project: &NewProject) -> RepoResult<Project> {
        project.validate()?;
        let now_ms = Utc::now().timestamp_millis();

        self.conn.execute(
            "INSERT INTO projects (
                name,
                description,
                status,
                start_date,
                end_date,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6);",
            params![
                project.name.as_str(),
                project.description.as_str(),
                status_to_db(project.status),
                project.start_date.timestamp_millis(),
                project.end_date.map(|end| end.timestamp_millis()),
                now_ms,
            ],
        )?;

        self.require_project(self.conn.last_insert_rowid())
    }

    fn update_project(&self, project: &Project) -> RepoResult<Project> {
        project.validate()?;
        let now_ms = Utc::now().timestamp_millis();

        let changed = self.conn.execute(
            "UPDATE projects
             SET
                name = ?1,
                description = ?2,
                status = ?3,
                start_date = ?4,
                end_date = ?5,
                updated_at = MAX(updated_at, ?6)
             WHERE id = ?7;",
            params![
                project.name.as_str(),
                project.description.as_str(),
                status_to_db(project.status),
                project.start_date.timestamp_millis(),
                project.end_date.map(|end| end.timestamp_millis()),
                now_ms,
                project.id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(project.id));
        }

        self.require_project(project.id)
    }

    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROJECT_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_project_row(row)?));
        }

        Ok(None)
    }

    fn list_projects(&self, query: &ProjectListQuery) -> RepoResult<Vec<Project>> {
        let mut sql = format!("{PROJECT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status_to_db(status).to_string()));
        }

        sql.push_str(&format!(
            " ORDER BY {column} {order}, id {order}",
            column = query.sort_by.column(),
            order = query.order.keyword()
        ));

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit.min(LIST_LIMIT_MAX))));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut projects = Vec::new();

        while let Some(row) = rows.next()? {
            projects.push(parse_project_row(row)?);
        }

        Ok(projects)
    }

    fn delete_project(&self, id: ProjectId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM projects WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn count_projects(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM projects;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative project count `{count}`")))
    }
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    let id: ProjectId = row.get("id")?;

    let status_text: String = row.get("status")?;
    let status = parse_status_db(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid status `{status_text}` in projects.status (id {id})"
        ))
    })?;

    let end_date = match row.get::<_, Option<i64>>("end_date")? {
        Some(value) => Some(millis_to_datetime(value, "end_date", id)?),
        None => None,
    };

    let project = Project {
        id,
        name: row.get("name")?,
        description: row.get("description")?,
        status,
        start_date: millis_to_datetime(row.get("start_date")?, "start_date", id)?,
        end_date,
        created_at: millis_to_datetime(row.get("created_at")?, "created_at", id)?,
        updated_at: millis_to_datetime(row.get("updated_at")?, "updated_at", id)?,
    };
    project.validate()?;
    Ok(project)
}

fn millis_to_datetime(value: i64, column: &str, id: ProjectId) -> RepoResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(value).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "timestamp `{value}` out of range in projects.{column} (id {id})"
        ))
    })
}

fn status_to_db(status: ProjectStatus) -> &'static str {
    match status {
        ProjectStatus::Pending => "pending",
        ProjectStatus::InProgress => "in_progress",
        ProjectStatus::Done => "done",
        ProjectStatus::Cancelled => "cancelled",
    }
}

fn parse_status_db(value: &str) -> Option<ProjectStatus> {
    match value {
        "pending" => Some(ProjectStatus::Pending),
        "in_progress" => Some(ProjectStatus::InProgress),
        "done" => Some(ProjectStatus::Done),
        "cancelled" => Some(ProjectStatus::Cancelled),
        _ => None,
    }
}
