//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Lookups of a missing record
//! return [`TelescopeError::NotFound`](crate::error::TelescopeError::NotFound).

use crate::error::TelescopeResult;
use crate::models::{
    GraphId, ProjectId, RelationId, ServiceId,
    graph::{CreateGraph, Graph, UpdateGraph},
    project::{CreateProject, Project, UpdateProject},
    relation::{CreateRelation, Relation, RelationFields, RelationPatch},
    service::{CreateService, Service, ServiceFields, ServicePatch},
};

// ---------------------------------------------------------------------------
// Projects (hierarchy root)
// ---------------------------------------------------------------------------

pub trait ProjectRepository: Send + Sync {
    fn create(&self, input: CreateProject) -> impl Future<Output = TelescopeResult<Project>> + Send;
    fn get_by_id(&self, id: ProjectId) -> impl Future<Output = TelescopeResult<Project>> + Send;
    fn list(&self) -> impl Future<Output = TelescopeResult<Vec<Project>>> + Send;
    fn update(
        &self,
        id: ProjectId,
        input: UpdateProject,
    ) -> impl Future<Output = TelescopeResult<Project>> + Send;
    /// Removes the project together with its graphs and their contents.
    fn delete(&self, id: ProjectId) -> impl Future<Output = TelescopeResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Graphs (owned by a project)
// ---------------------------------------------------------------------------

pub trait GraphRepository: Send + Sync {
    fn create(&self, input: CreateGraph) -> impl Future<Output = TelescopeResult<Graph>> + Send;
    fn get_by_id(&self, id: GraphId) -> impl Future<Output = TelescopeResult<Graph>> + Send;
    fn list_by_project(
        &self,
        project_id: ProjectId,
    ) -> impl Future<Output = TelescopeResult<Vec<Graph>>> + Send;
    fn update(
        &self,
        id: GraphId,
        input: UpdateGraph,
    ) -> impl Future<Output = TelescopeResult<Graph>> + Send;
    /// Removes the graph together with its services and relations.
    fn delete(&self, id: GraphId) -> impl Future<Output = TelescopeResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Graph contents
// ---------------------------------------------------------------------------

pub trait ServiceRepository: Send + Sync {
    fn create(&self, input: CreateService)
    -> impl Future<Output = TelescopeResult<Service>> + Send;
    /// Creates every service in `inputs` under `graph_id`, returning
    /// the new IDs in input order.
    fn create_many(
        &self,
        graph_id: GraphId,
        inputs: Vec<ServiceFields>,
    ) -> impl Future<Output = TelescopeResult<Vec<ServiceId>>> + Send;
    fn get_by_id(&self, id: ServiceId) -> impl Future<Output = TelescopeResult<Service>> + Send;
    fn list_by_graph(
        &self,
        graph_id: GraphId,
    ) -> impl Future<Output = TelescopeResult<Vec<Service>>> + Send;
    fn update(
        &self,
        id: ServiceId,
        input: ServiceFields,
    ) -> impl Future<Output = TelescopeResult<Service>> + Send;
    /// Applies each patch to a service of `graph_id`. A patch naming a
    /// service outside the graph fails with `NotFound`.
    fn update_many(
        &self,
        graph_id: GraphId,
        patches: Vec<ServicePatch>,
    ) -> impl Future<Output = TelescopeResult<()>> + Send;
    fn delete(&self, id: ServiceId) -> impl Future<Output = TelescopeResult<()>> + Send;
}

pub trait RelationRepository: Send + Sync {
    fn create(
        &self,
        input: CreateRelation,
    ) -> impl Future<Output = TelescopeResult<Relation>> + Send;
    fn create_many(
        &self,
        graph_id: GraphId,
        inputs: Vec<RelationFields>,
    ) -> impl Future<Output = TelescopeResult<Vec<RelationId>>> + Send;
    fn get_by_id(&self, id: RelationId) -> impl Future<Output = TelescopeResult<Relation>> + Send;
    fn list_by_graph(
        &self,
        graph_id: GraphId,
    ) -> impl Future<Output = TelescopeResult<Vec<Relation>>> + Send;
    fn update(
        &self,
        id: RelationId,
        input: RelationFields,
    ) -> impl Future<Output = TelescopeResult<Relation>> + Send;
    fn update_many(
        &self,
        graph_id: GraphId,
        patches: Vec<RelationPatch>,
    ) -> impl Future<Output = TelescopeResult<()>> + Send;
    fn delete(&self, id: RelationId) -> impl Future<Output = TelescopeResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Containment edges
// ---------------------------------------------------------------------------

/// Single-hop parent lookups along the containment hierarchy.
///
/// Each call reads one record. A missing record yields `NotFound`; an
/// implementation must never substitute a default parent.
pub trait HierarchyRepository: Send + Sync {
    /// The project that owns a graph.
    fn graph_project(
        &self,
        graph_id: GraphId,
    ) -> impl Future<Output = TelescopeResult<ProjectId>> + Send;
    /// The graph a service belongs to.
    fn service_graph(
        &self,
        service_id: ServiceId,
    ) -> impl Future<Output = TelescopeResult<GraphId>> + Send;
    /// The graph a relation belongs to.
    fn relation_graph(
        &self,
        relation_id: RelationId,
    ) -> impl Future<Output = TelescopeResult<GraphId>> + Send;
}
