//! Graph domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{GraphId, ProjectId};

/// A named architecture graph. Every graph belongs to exactly one
/// project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub id: GraphId,
    pub project_id: ProjectId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGraph {
    pub project_id: ProjectId,
    pub name: String,
}

/// Replacement values for a graph. The owning project is fixed at
/// creation and cannot be changed through an update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateGraph {
    pub name: String,
}
