//! Single-hop parent lookups for access control.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use telescope_core::error::TelescopeResult;
use telescope_core::models::{GraphId, ProjectId, RelationId, ServiceId};
use telescope_core::repository::HierarchyRepository;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct ProjectLink {
    project_id: i64,
}

#[derive(Debug, SurrealValue)]
struct GraphLink {
    graph_id: i64,
}

/// Reads parent IDs straight from the child record. Each call is one
/// query; nothing is cached.
#[derive(Clone)]
pub struct SurrealHierarchyRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealHierarchyRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn graph_link(&self, table: &'static str, id: i64) -> TelescopeResult<GraphId> {
        let mut result = self
            .db
            .query("SELECT graph_id FROM type::record($table, $id)")
            .bind(("table", table))
            .bind(("id", id))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<GraphLink> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .next()
            .map(|r| r.graph_id)
            .ok_or_else(|| DbError::not_found(table, id).into())
    }
}

impl<C: Connection> HierarchyRepository for SurrealHierarchyRepository<C> {
    async fn graph_project(&self, graph_id: GraphId) -> TelescopeResult<ProjectId> {
        let mut result = self
            .db
            .query("SELECT project_id FROM type::record('graph', $id)")
            .bind(("id", graph_id))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProjectLink> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .next()
            .map(|r| r.project_id)
            .ok_or_else(|| DbError::not_found("graph", graph_id).into())
    }

    async fn service_graph(&self, service_id: ServiceId) -> TelescopeResult<GraphId> {
        self.graph_link("service", service_id).await
    }

    async fn relation_graph(&self, relation_id: RelationId) -> TelescopeResult<GraphId> {
        self.graph_link("relation", relation_id).await
    }
}
