//! Project use-case service.
//!
//! # Responsibility
//! - Provide stable CRUD entry points for HTTP handlers.
//! - Normalize create input and merge partial updates before persistence.
//!
//! # Invariants
//! - Partial updates are validated on the merged record, so a patch that
//!   only moves `start_date` past the stored `end_date` is rejected.
//! - Service layer remains storage-agnostic.

use crate::model::project::{NewProject, Project, ProjectId, ProjectPatch};
use crate::repo::project_repo::{ProjectListQuery, ProjectRepository, RepoError, RepoResult};
use log::info;

/// Use-case service wrapper for project CRUD operations.
pub struct ProjectService<R: ProjectRepository> {
    repo: R,
}

impl<R: ProjectRepository> ProjectService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a project from trimmed input and returns the stored record.
    pub fn create_project(&self, input: &NewProject) -> RepoResult<Project> {
        let project = self.repo.create_project(&input.normalized())?;
        info!(
            "event=project_create module=service status=ok project_id={} project_status={}",
            project.id, project.status
        );
        Ok(project)
    }

    /// Applies a partial update and returns the stored record.
    ///
    /// An empty patch returns the current record unchanged.
    pub fn update_project(&self, id: ProjectId, patch: &ProjectPatch) -> RepoResult<Project> {
        let mut project = self.get_project(id)?;
        if patch.is_empty() {
            return Ok(project);
        }

        patch.apply_to(&mut project);
        let updated = self.repo.update_project(&project)?;
        info!(
            "event=project_update module=service status=ok project_id={} project_status={}",
            updated.id, updated.status
        );
        Ok(updated)
    }

    /// Gets one project by id, failing with `NotFound` when absent.
    pub fn get_project(&self, id: ProjectId) -> RepoResult<Project> {
        self.repo.get_project(id)?.ok_or(RepoError::NotFound(id))
    }

    pub fn list_projects(&self, query: &ProjectListQuery) -> RepoResult<Vec<Project>> {
        self.repo.list_projects(query)
    }

    /// Lists every project, newest first. Input for portfolio analysis.
    pub fn list_all(&self) -> RepoResult<Vec<Project>> {
        self.repo.list_projects(&ProjectListQuery::default())
    }

    pub fn delete_project(&self, id: ProjectId) -> RepoResult<()> {
        self.repo.delete_project(id)?;
        info!("event=project_delete module=service status=ok project_id={id}");
        Ok(())
    }

    pub fn count_projects(&self) -> RepoResult<u64> {
        self.repo.count_projects()
    }
}
