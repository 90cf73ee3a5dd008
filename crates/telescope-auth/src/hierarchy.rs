//! Resolution of a resource to the project that owns it.
//!
//! Graphs are one hop from their project; services and relations are
//! two (resource → graph → project). Every hop is an independent
//! storage lookup and nothing is cached between requests, so a
//! resolution always reflects current storage state.

use telescope_core::error::TelescopeError;
use telescope_core::models::{GraphId, ProjectId};
use telescope_core::models::resource::{ResourceKind, ResourceRef};
use telescope_core::repository::HierarchyRepository;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ResolutionError {
    /// A record on the path to the project does not exist.
    #[error("{resource} not found")]
    NotFound { resource: ResourceRef },

    /// The storage lookup for a hop failed.
    #[error("lookup of {resource} failed: {reason}")]
    Storage {
        resource: ResourceRef,
        reason: String,
    },
}

impl ResolutionError {
    fn from_lookup(resource: ResourceRef, err: TelescopeError) -> Self {
        match err {
            TelescopeError::NotFound { .. } => ResolutionError::NotFound { resource },
            other => ResolutionError::Storage {
                resource,
                reason: other.to_string(),
            },
        }
    }
}

impl From<ResolutionError> for TelescopeError {
    fn from(err: ResolutionError) -> Self {
        TelescopeError::Internal(err.to_string())
    }
}

/// Walks containment edges from a resource up to its project.
#[derive(Debug, Clone)]
pub struct HierarchyResolver<H: HierarchyRepository> {
    edges: H,
}

impl<H: HierarchyRepository> HierarchyResolver<H> {
    pub fn new(edges: H) -> Self {
        Self { edges }
    }

    /// Return the ID of the project owning `target`.
    ///
    /// A project reference resolves to itself without touching
    /// storage. A missing record at any hop is an error; resolution
    /// never yields a project for a resource that does not exist.
    pub async fn project_of(&self, target: ResourceRef) -> Result<ProjectId, ResolutionError> {
        let project_id = match target.kind {
            ResourceKind::Project => target.id,
            ResourceKind::Graph => self.graph_project(target.id).await?,
            ResourceKind::Service => {
                let graph_id = self
                    .edges
                    .service_graph(target.id)
                    .await
                    .map_err(|e| ResolutionError::from_lookup(target, e))?;
                self.graph_project(graph_id).await?
            }
            ResourceKind::Relation => {
                let graph_id = self
                    .edges
                    .relation_graph(target.id)
                    .await
                    .map_err(|e| ResolutionError::from_lookup(target, e))?;
                self.graph_project(graph_id).await?
            }
        };

        debug!(resource = %target, project_id, "Resolved owning project");
        Ok(project_id)
    }

    async fn graph_project(&self, graph_id: GraphId) -> Result<ProjectId, ResolutionError> {
        self.edges
            .graph_project(graph_id)
            .await
            .map_err(|e| ResolutionError::from_lookup(ResourceRef::graph(graph_id), e))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use telescope_core::error::TelescopeResult;
    use telescope_core::models::{RelationId, ServiceId};

    use super::*;

    /// In-memory edges that record every lookup.
    #[derive(Default)]
    struct Edges {
        graphs: HashMap<GraphId, ProjectId>,
        services: HashMap<ServiceId, GraphId>,
        relations: HashMap<RelationId, GraphId>,
        broken: bool,
        lookups: Mutex<Vec<ResourceRef>>,
    }

    impl Edges {
        fn record(&self, r: ResourceRef) -> TelescopeResult<()> {
            self.lookups.lock().unwrap().push(r);
            if self.broken {
                return Err(TelescopeError::Database("connection reset".into()));
            }
            Ok(())
        }

        fn lookups(&self) -> Vec<ResourceRef> {
            self.lookups.lock().unwrap().clone()
        }
    }

    impl HierarchyRepository for Edges {
        async fn graph_project(&self, graph_id: GraphId) -> TelescopeResult<ProjectId> {
            self.record(ResourceRef::graph(graph_id))?;
            self.graphs
                .get(&graph_id)
                .copied()
                .ok_or_else(|| TelescopeError::not_found("graph", graph_id))
        }

        async fn service_graph(&self, service_id: ServiceId) -> TelescopeResult<GraphId> {
            self.record(ResourceRef::service(service_id))?;
            self.services
                .get(&service_id)
                .copied()
                .ok_or_else(|| TelescopeError::not_found("service", service_id))
        }

        async fn relation_graph(&self, relation_id: RelationId) -> TelescopeResult<GraphId> {
            self.record(ResourceRef::relation(relation_id))?;
            self.relations
                .get(&relation_id)
                .copied()
                .ok_or_else(|| TelescopeError::not_found("relation", relation_id))
        }
    }

    fn edges() -> Edges {
        Edges {
            graphs: HashMap::from([(9, 3)]),
            services: HashMap::from([(42, 9), (43, 77)]),
            relations: HashMap::from([(5, 9)]),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn project_resolves_to_itself_without_lookup() {
        let resolver = HierarchyResolver::new(edges());
        assert_eq!(resolver.project_of(ResourceRef::project(3)).await.unwrap(), 3);
        assert!(resolver.edges.lookups().is_empty());
    }

    #[tokio::test]
    async fn graph_takes_one_hop() {
        let resolver = HierarchyResolver::new(edges());
        assert_eq!(resolver.project_of(ResourceRef::graph(9)).await.unwrap(), 3);
        assert_eq!(resolver.edges.lookups(), vec![ResourceRef::graph(9)]);
    }

    #[tokio::test]
    async fn service_and_relation_take_two_hops() {
        let resolver = HierarchyResolver::new(edges());
        assert_eq!(resolver.project_of(ResourceRef::service(42)).await.unwrap(), 3);
        assert_eq!(
            resolver.edges.lookups(),
            vec![ResourceRef::service(42), ResourceRef::graph(9)]
        );

        let resolver = HierarchyResolver::new(edges());
        assert_eq!(resolver.project_of(ResourceRef::relation(5)).await.unwrap(), 3);
        assert_eq!(
            resolver.edges.lookups(),
            vec![ResourceRef::relation(5), ResourceRef::graph(9)]
        );
    }

    #[tokio::test]
    async fn missing_resource_is_not_found() {
        let resolver = HierarchyResolver::new(edges());
        for target in [
            ResourceRef::graph(99),
            ResourceRef::service(1000),
            ResourceRef::relation(1000),
        ] {
            let err = resolver.project_of(target).await.unwrap_err();
            match err {
                ResolutionError::NotFound { resource } => assert_eq!(resource, target),
                other => panic!("expected NotFound, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn orphaned_service_reports_missing_graph() {
        let resolver = HierarchyResolver::new(edges());
        let err = resolver.project_of(ResourceRef::service(43)).await.unwrap_err();
        assert!(matches!(
            err,
            ResolutionError::NotFound { resource } if resource == ResourceRef::graph(77)
        ));
    }

    #[tokio::test]
    async fn storage_failure_is_distinct_from_not_found() {
        let resolver = HierarchyResolver::new(Edges {
            broken: true,
            ..edges()
        });
        let err = resolver.project_of(ResourceRef::graph(9)).await.unwrap_err();
        assert!(matches!(err, ResolutionError::Storage { .. }));
    }
}
