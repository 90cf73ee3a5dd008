//! Addressing nodes of the containment hierarchy.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of node a [`ResourceRef`] points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Project,
    Graph,
    Service,
    Relation,
}

impl ResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Project => "project",
            ResourceKind::Graph => "graph",
            ResourceKind::Service => "service",
            ResourceKind::Relation => "relation",
        }
    }
}

/// A typed reference to a single node in the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRef {
    pub kind: ResourceKind,
    pub id: i64,
}

impl ResourceRef {
    pub fn project(id: i64) -> Self {
        Self {
            kind: ResourceKind::Project,
            id,
        }
    }

    pub fn graph(id: i64) -> Self {
        Self {
            kind: ResourceKind::Graph,
            id,
        }
    }

    pub fn service(id: i64) -> Self {
        Self {
            kind: ResourceKind::Service,
            id,
        }
    }

    pub fn relation(id: i64) -> Self {
        Self {
            kind: ResourceKind::Relation,
            id,
        }
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), self.id)
    }
}
