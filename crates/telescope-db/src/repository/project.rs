//! SurrealDB implementation of [`ProjectRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use telescope_core::error::TelescopeResult;
use telescope_core::models::ProjectId;
use telescope_core::models::project::{CreateProject, Project, UpdateProject};
use telescope_core::repository::ProjectRepository;
use tracing::debug;

use super::reserve_ids;
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct ProjectRow {
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProjectRow {
    fn into_project(self, id: ProjectId) -> Project {
        Project {
            id,
            name: self.name,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, SurrealValue)]
struct ProjectRowWithId {
    record_id: i64,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProjectRowWithId> for Project {
    fn from(row: ProjectRowWithId) -> Self {
        Project {
            id: row.record_id,
            name: row.name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct SurrealProjectRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealProjectRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ProjectRepository for SurrealProjectRepository<C> {
    async fn create(&self, input: CreateProject) -> TelescopeResult<Project> {
        let id = reserve_ids(&self.db, "project", 1).await?;

        let mut result = self
            .db
            .query("CREATE type::record('project', $id) SET name = $name")
            .bind(("id", id))
            .bind(("name", input.name))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ProjectRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("project", id))?;

        debug!(project_id = id, "Project created");
        Ok(row.into_project(id))
    }

    async fn get_by_id(&self, id: ProjectId) -> TelescopeResult<Project> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('project', $id)")
            .bind(("id", id))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProjectRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("project", id))?;
        Ok(row.into_project(id))
    }

    async fn list(&self) -> TelescopeResult<Vec<Project>> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM project ORDER BY id ASC")
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProjectRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows.into_iter().map(Project::from).collect())
    }

    async fn update(&self, id: ProjectId, input: UpdateProject) -> TelescopeResult<Project> {
        let mut result = self
            .db
            .query(
                "UPDATE type::record('project', $id) \
                 SET name = $name, updated_at = time::now()",
            )
            .bind(("id", id))
            .bind(("name", input.name))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ProjectRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("project", id))?;
        Ok(row.into_project(id))
    }

    async fn delete(&self, id: ProjectId) -> TelescopeResult<()> {
        let mut result = self
            .db
            .query(
                "DELETE type::record('project', $id) RETURN BEFORE; \
                 LET $graphs = (SELECT VALUE meta::id(id) FROM graph WHERE project_id = $id); \
                 DELETE service WHERE graph_id IN $graphs; \
                 DELETE relation WHERE graph_id IN $graphs; \
                 DELETE graph WHERE project_id = $id;",
            )
            .bind(("id", id))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let removed: Vec<ProjectRow> = result.take(0).map_err(DbError::from)?;
        if removed.is_empty() {
            return Err(DbError::not_found("project", id).into());
        }

        debug!(project_id = id, "Project deleted with its graphs");
        Ok(())
    }
}
