//! Shared handler state.
//!
//! # Invariants
//! - The SQLite connection is locked for one service call at a time and
//!   never held across an `.await`.

use portfolio_core::{AnalysisOrchestrator, ProjectService, RepoResult, SqliteProjectRepository};
use rusqlite::Connection;
use std::sync::{Arc, Mutex, PoisonError};

/// Serialized access to the single SQLite connection.
#[derive(Clone)]
pub struct ProjectStore {
    conn: Arc<Mutex<Connection>>,
}

impl ProjectStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Runs `f` against a project service bound to the locked connection.
    pub fn with_service<T, F>(&self, f: F) -> RepoResult<T>
    where
        F: FnOnce(&ProjectService<SqliteProjectRepository<'_>>) -> RepoResult<T>,
    {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let service = ProjectService::new(SqliteProjectRepository::new(&conn));
        f(&service)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: ProjectStore,
    pub analysis: Arc<AnalysisOrchestrator>,
}

impl AppState {
    pub fn new(conn: Connection, analysis: Arc<AnalysisOrchestrator>) -> Self {
        Self {
            store: ProjectStore::new(conn),
            analysis,
        }
    }
}
