//! Project domain model.
//!
//! Projects are the root of the containment hierarchy and the unit at
//! which the role authority grants roles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ProjectId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProject {
    pub name: String,
}

/// Replacement values for a project's mutable fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProject {
    pub name: String,
}
