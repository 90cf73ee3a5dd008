//! Domain models for Telescope.
//!
//! Entities are flat records owned by the storage layer and passed by
//! value between layers. The containment hierarchy is
//! Project ⊃ Graph ⊃ {Service, Relation}.

pub mod graph;
pub mod principal;
pub mod project;
pub mod relation;
pub mod resource;
pub mod role;
pub mod service;

/// Numeric identifier of a project.
pub type ProjectId = i64;
/// Numeric identifier of a graph.
pub type GraphId = i64;
/// Numeric identifier of a service node.
pub type ServiceId = i64;
/// Numeric identifier of a relation edge.
pub type RelationId = i64;
/// Numeric identifier of a user, as issued by the token authority.
pub type UserId = i64;
