//! Service domain model (a node on a graph canvas).

use serde::{Deserialize, Serialize};

use super::{GraphId, ServiceId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: ServiceId,
    pub graph_id: GraphId,
    pub name: String,
    pub description: String,
    /// Canvas x coordinate.
    pub x: f64,
    /// Canvas y coordinate.
    pub y: f64,
}

/// The mutable fields of a service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceFields {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateService {
    pub graph_id: GraphId,
    #[serde(flatten)]
    pub fields: ServiceFields,
}

/// One entry of a bulk update: the target service and its new values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicePatch {
    pub id: ServiceId,
    #[serde(flatten)]
    pub fields: ServiceFields,
}
