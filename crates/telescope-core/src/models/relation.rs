//! Relation domain model (a directed edge between two services).

use serde::{Deserialize, Serialize};

use super::{GraphId, RelationId, ServiceId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub id: RelationId,
    pub graph_id: GraphId,
    pub name: String,
    pub description: String,
    pub from_service: ServiceId,
    pub to_service: ServiceId,
}

/// The mutable fields of a relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationFields {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub from_service: ServiceId,
    pub to_service: ServiceId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRelation {
    pub graph_id: GraphId,
    #[serde(flatten)]
    pub fields: RelationFields,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationPatch {
    pub id: RelationId,
    #[serde(flatten)]
    pub fields: RelationFields,
}
