//! SurrealDB implementation of [`RelationRepository`].
//!
//! Both endpoints of a relation must be services of the relation's own
//! graph; writes that break this are rejected as validation errors.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use telescope_core::error::{TelescopeError, TelescopeResult};
use telescope_core::models::relation::{CreateRelation, Relation, RelationFields, RelationPatch};
use telescope_core::models::{GraphId, RelationId, ServiceId};
use telescope_core::repository::RelationRepository;
use tracing::debug;

use super::{ensure_exists, ids_in_graph, reserve_ids};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct RelationRow {
    graph_id: i64,
    name: String,
    description: String,
    from_service: i64,
    to_service: i64,
}

impl RelationRow {
    fn into_relation(self, id: RelationId) -> Relation {
        Relation {
            id,
            graph_id: self.graph_id,
            name: self.name,
            description: self.description,
            from_service: self.from_service,
            to_service: self.to_service,
        }
    }
}

#[derive(Debug, SurrealValue)]
struct RelationRowWithId {
    record_id: i64,
    graph_id: i64,
    name: String,
    description: String,
    from_service: i64,
    to_service: i64,
}

impl From<RelationRowWithId> for Relation {
    fn from(row: RelationRowWithId) -> Self {
        Relation {
            id: row.record_id,
            graph_id: row.graph_id,
            name: row.name,
            description: row.description,
            from_service: row.from_service,
            to_service: row.to_service,
        }
    }
}

#[derive(Debug, SurrealValue)]
struct RelationRecord {
    id: i64,
    graph_id: i64,
    name: String,
    description: String,
    from_service: i64,
    to_service: i64,
}

impl RelationRecord {
    fn new(id: RelationId, graph_id: GraphId, fields: RelationFields) -> Self {
        Self {
            id,
            graph_id,
            name: fields.name,
            description: fields.description,
            from_service: fields.from_service,
            to_service: fields.to_service,
        }
    }
}

fn check_endpoints(
    graph_id: GraphId,
    services: &[ServiceId],
    fields: &RelationFields,
) -> TelescopeResult<()> {
    for endpoint in [fields.from_service, fields.to_service] {
        if !services.contains(&endpoint) {
            return Err(TelescopeError::Validation {
                message: format!("service {endpoint} is not part of graph {graph_id}"),
            });
        }
    }
    Ok(())
}

#[derive(Clone)]
pub struct SurrealRelationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealRelationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn graph_of(&self, id: RelationId) -> TelescopeResult<GraphId> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('relation', $id)")
            .bind(("id", id))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<RelationRow> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .next()
            .map(|r| r.graph_id)
            .ok_or_else(|| DbError::not_found("relation", id).into())
    }
}

impl<C: Connection> RelationRepository for SurrealRelationRepository<C> {
    async fn create(&self, input: CreateRelation) -> TelescopeResult<Relation> {
        ensure_exists(&self.db, "graph", input.graph_id).await?;
        let services = ids_in_graph(&self.db, "service", input.graph_id).await?;
        check_endpoints(input.graph_id, &services, &input.fields)?;
        let id = reserve_ids(&self.db, "relation", 1).await?;

        let mut result = self
            .db
            .query(
                "CREATE type::record('relation', $id) SET \
                 graph_id = $graph_id, name = $name, description = $description, \
                 from_service = $from_service, to_service = $to_service",
            )
            .bind(("id", id))
            .bind(("graph_id", input.graph_id))
            .bind(("name", input.fields.name))
            .bind(("description", input.fields.description))
            .bind(("from_service", input.fields.from_service))
            .bind(("to_service", input.fields.to_service))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<RelationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("relation", id))?;
        Ok(row.into_relation(id))
    }

    async fn create_many(
        &self,
        graph_id: GraphId,
        inputs: Vec<RelationFields>,
    ) -> TelescopeResult<Vec<RelationId>> {
        ensure_exists(&self.db, "graph", graph_id).await?;
        if inputs.is_empty() {
            return Ok(Vec::new());
        }
        let services = ids_in_graph(&self.db, "service", graph_id).await?;
        for fields in &inputs {
            check_endpoints(graph_id, &services, fields)?;
        }

        let first = reserve_ids(&self.db, "relation", inputs.len()).await?;
        let records: Vec<RelationRecord> = inputs
            .into_iter()
            .zip(first..)
            .map(|(fields, id)| RelationRecord::new(id, graph_id, fields))
            .collect();
        let ids: Vec<RelationId> = records.iter().map(|r| r.id).collect();

        self.db
            .query("INSERT INTO relation $records RETURN NONE")
            .bind(("records", records))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        debug!(graph_id, count = ids.len(), "Relations created");
        Ok(ids)
    }

    async fn get_by_id(&self, id: RelationId) -> TelescopeResult<Relation> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('relation', $id)")
            .bind(("id", id))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RelationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("relation", id))?;
        Ok(row.into_relation(id))
    }

    async fn list_by_graph(&self, graph_id: GraphId) -> TelescopeResult<Vec<Relation>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM relation \
                 WHERE graph_id = $graph_id ORDER BY id ASC",
            )
            .bind(("graph_id", graph_id))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RelationRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows.into_iter().map(Relation::from).collect())
    }

    async fn update(&self, id: RelationId, input: RelationFields) -> TelescopeResult<Relation> {
        let graph_id = self.graph_of(id).await?;
        let services = ids_in_graph(&self.db, "service", graph_id).await?;
        check_endpoints(graph_id, &services, &input)?;

        let mut result = self
            .db
            .query(
                "UPDATE type::record('relation', $id) SET \
                 name = $name, description = $description, \
                 from_service = $from_service, to_service = $to_service",
            )
            .bind(("id", id))
            .bind(("name", input.name))
            .bind(("description", input.description))
            .bind(("from_service", input.from_service))
            .bind(("to_service", input.to_service))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<RelationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("relation", id))?;
        Ok(row.into_relation(id))
    }

    async fn update_many(
        &self,
        graph_id: GraphId,
        patches: Vec<RelationPatch>,
    ) -> TelescopeResult<()> {
        let members = ids_in_graph(&self.db, "relation", graph_id).await?;
        let services = ids_in_graph(&self.db, "service", graph_id).await?;
        for patch in &patches {
            if !members.contains(&patch.id) {
                return Err(DbError::not_found("relation", patch.id).into());
            }
            check_endpoints(graph_id, &services, &patch.fields)?;
        }

        let records: Vec<RelationRecord> = patches
            .into_iter()
            .map(|p| RelationRecord::new(p.id, graph_id, p.fields))
            .collect();

        self.db
            .query(
                "FOR $r IN $records { \
                     UPDATE type::record('relation', $r.id) SET \
                     name = $r.name, description = $r.description, \
                     from_service = $r.from_service, to_service = $r.to_service; \
                 };",
            )
            .bind(("records", records))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(())
    }

    async fn delete(&self, id: RelationId) -> TelescopeResult<()> {
        let mut result = self
            .db
            .query("DELETE type::record('relation', $id) RETURN BEFORE")
            .bind(("id", id))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let removed: Vec<RelationRow> = result.take(0).map_err(DbError::from)?;
        if removed.is_empty() {
            return Err(DbError::not_found("relation", id).into());
        }
        Ok(())
    }
}
