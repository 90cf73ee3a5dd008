//! SurrealDB implementation of [`ServiceRepository`].

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use telescope_core::error::TelescopeResult;
use telescope_core::models::service::{CreateService, Service, ServiceFields, ServicePatch};
use telescope_core::models::{GraphId, ServiceId};
use telescope_core::repository::ServiceRepository;
use tracing::debug;

use super::{ensure_exists, ids_in_graph, reserve_ids};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct ServiceRow {
    graph_id: i64,
    name: String,
    description: String,
    x: f64,
    y: f64,
}

impl ServiceRow {
    fn into_service(self, id: ServiceId) -> Service {
        Service {
            id,
            graph_id: self.graph_id,
            name: self.name,
            description: self.description,
            x: self.x,
            y: self.y,
        }
    }
}

#[derive(Debug, SurrealValue)]
struct ServiceRowWithId {
    record_id: i64,
    graph_id: i64,
    name: String,
    description: String,
    x: f64,
    y: f64,
}

impl From<ServiceRowWithId> for Service {
    fn from(row: ServiceRowWithId) -> Self {
        Service {
            id: row.record_id,
            graph_id: row.graph_id,
            name: row.name,
            description: row.description,
            x: row.x,
            y: row.y,
        }
    }
}

/// Full record as written by bulk statements; `id` becomes the record key.
#[derive(Debug, SurrealValue)]
struct ServiceRecord {
    id: i64,
    graph_id: i64,
    name: String,
    description: String,
    x: f64,
    y: f64,
}

impl ServiceRecord {
    fn new(id: ServiceId, graph_id: GraphId, fields: ServiceFields) -> Self {
        Self {
            id,
            graph_id,
            name: fields.name,
            description: fields.description,
            x: fields.x,
            y: fields.y,
        }
    }
}

#[derive(Clone)]
pub struct SurrealServiceRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealServiceRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ServiceRepository for SurrealServiceRepository<C> {
    async fn create(&self, input: CreateService) -> TelescopeResult<Service> {
        ensure_exists(&self.db, "graph", input.graph_id).await?;
        let id = reserve_ids(&self.db, "service", 1).await?;

        let mut result = self
            .db
            .query(
                "CREATE type::record('service', $id) SET \
                 graph_id = $graph_id, name = $name, \
                 description = $description, x = $x, y = $y",
            )
            .bind(("id", id))
            .bind(("graph_id", input.graph_id))
            .bind(("name", input.fields.name))
            .bind(("description", input.fields.description))
            .bind(("x", input.fields.x))
            .bind(("y", input.fields.y))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ServiceRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("service", id))?;
        Ok(row.into_service(id))
    }

    async fn create_many(
        &self,
        graph_id: GraphId,
        inputs: Vec<ServiceFields>,
    ) -> TelescopeResult<Vec<ServiceId>> {
        ensure_exists(&self.db, "graph", graph_id).await?;
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let first = reserve_ids(&self.db, "service", inputs.len()).await?;
        let records: Vec<ServiceRecord> = inputs
            .into_iter()
            .zip(first..)
            .map(|(fields, id)| ServiceRecord::new(id, graph_id, fields))
            .collect();
        let ids: Vec<ServiceId> = records.iter().map(|r| r.id).collect();

        self.db
            .query("INSERT INTO service $records RETURN NONE")
            .bind(("records", records))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        debug!(graph_id, count = ids.len(), "Services created");
        Ok(ids)
    }

    async fn get_by_id(&self, id: ServiceId) -> TelescopeResult<Service> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('service', $id)")
            .bind(("id", id))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ServiceRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("service", id))?;
        Ok(row.into_service(id))
    }

    async fn list_by_graph(&self, graph_id: GraphId) -> TelescopeResult<Vec<Service>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM service \
                 WHERE graph_id = $graph_id ORDER BY id ASC",
            )
            .bind(("graph_id", graph_id))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ServiceRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows.into_iter().map(Service::from).collect())
    }

    async fn update(&self, id: ServiceId, input: ServiceFields) -> TelescopeResult<Service> {
        let mut result = self
            .db
            .query(
                "UPDATE type::record('service', $id) SET \
                 name = $name, description = $description, x = $x, y = $y",
            )
            .bind(("id", id))
            .bind(("name", input.name))
            .bind(("description", input.description))
            .bind(("x", input.x))
            .bind(("y", input.y))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ServiceRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("service", id))?;
        Ok(row.into_service(id))
    }

    async fn update_many(&self, graph_id: GraphId, patches: Vec<ServicePatch>) -> TelescopeResult<()> {
        let members = ids_in_graph(&self.db, "service", graph_id).await?;
        if let Some(stray) = patches.iter().find(|p| !members.contains(&p.id)) {
            return Err(DbError::not_found("service", stray.id).into());
        }

        let records: Vec<ServiceRecord> = patches
            .into_iter()
            .map(|p| ServiceRecord::new(p.id, graph_id, p.fields))
            .collect();

        self.db
            .query(
                "FOR $r IN $records { \
                     UPDATE type::record('service', $r.id) SET \
                     name = $r.name, description = $r.description, x = $r.x, y = $r.y; \
                 };",
            )
            .bind(("records", records))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(())
    }

    /// Relations touching the service are removed with it.
    async fn delete(&self, id: ServiceId) -> TelescopeResult<()> {
        let mut result = self
            .db
            .query(
                "DELETE type::record('service', $id) RETURN BEFORE; \
                 DELETE relation WHERE from_service = $id OR to_service = $id;",
            )
            .bind(("id", id))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let removed: Vec<ServiceRow> = result.take(0).map_err(DbError::from)?;
        if removed.is_empty() {
            return Err(DbError::not_found("service", id).into());
        }
        Ok(())
    }
}
