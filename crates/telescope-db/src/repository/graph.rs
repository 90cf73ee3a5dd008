//! SurrealDB implementation of [`GraphRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use telescope_core::error::TelescopeResult;
use telescope_core::models::graph::{CreateGraph, Graph, UpdateGraph};
use telescope_core::models::{GraphId, ProjectId};
use telescope_core::repository::GraphRepository;
use tracing::debug;

use super::{ensure_exists, reserve_ids};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct GraphRow {
    project_id: i64,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl GraphRow {
    fn into_graph(self, id: GraphId) -> Graph {
        Graph {
            id,
            project_id: self.project_id,
            name: self.name,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, SurrealValue)]
struct GraphRowWithId {
    record_id: i64,
    project_id: i64,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<GraphRowWithId> for Graph {
    fn from(row: GraphRowWithId) -> Self {
        Graph {
            id: row.record_id,
            project_id: row.project_id,
            name: row.name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct SurrealGraphRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealGraphRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> GraphRepository for SurrealGraphRepository<C> {
    /// Fails with `NotFound` when the owning project does not exist.
    async fn create(&self, input: CreateGraph) -> TelescopeResult<Graph> {
        ensure_exists(&self.db, "project", input.project_id).await?;
        let id = reserve_ids(&self.db, "graph", 1).await?;

        let mut result = self
            .db
            .query(
                "CREATE type::record('graph', $id) SET \
                 project_id = $project_id, name = $name",
            )
            .bind(("id", id))
            .bind(("project_id", input.project_id))
            .bind(("name", input.name))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<GraphRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("graph", id))?;

        debug!(graph_id = id, project_id = row.project_id, "Graph created");
        Ok(row.into_graph(id))
    }

    async fn get_by_id(&self, id: GraphId) -> TelescopeResult<Graph> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('graph', $id)")
            .bind(("id", id))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<GraphRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("graph", id))?;
        Ok(row.into_graph(id))
    }

    async fn list_by_project(&self, project_id: ProjectId) -> TelescopeResult<Vec<Graph>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM graph \
                 WHERE project_id = $project_id ORDER BY id ASC",
            )
            .bind(("project_id", project_id))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<GraphRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows.into_iter().map(Graph::from).collect())
    }

    async fn update(&self, id: GraphId, input: UpdateGraph) -> TelescopeResult<Graph> {
        let mut result = self
            .db
            .query(
                "UPDATE type::record('graph', $id) \
                 SET name = $name, updated_at = time::now()",
            )
            .bind(("id", id))
            .bind(("name", input.name))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<GraphRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("graph", id))?;
        Ok(row.into_graph(id))
    }

    async fn delete(&self, id: GraphId) -> TelescopeResult<()> {
        let mut result = self
            .db
            .query(
                "DELETE type::record('graph', $id) RETURN BEFORE; \
                 DELETE service WHERE graph_id = $id; \
                 DELETE relation WHERE graph_id = $id;",
            )
            .bind(("id", id))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let removed: Vec<GraphRow> = result.take(0).map_err(DbError::from)?;
        if removed.is_empty() {
            return Err(DbError::not_found("graph", id).into());
        }

        debug!(graph_id = id, "Graph deleted with its services and relations");
        Ok(())
    }
}
