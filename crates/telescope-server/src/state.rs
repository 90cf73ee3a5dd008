//! Shared application state.

use std::sync::Arc;

use surrealdb::{Connection, Surreal};
use telescope_auth::{AccessGate, Authenticator, Decision, RoleAuthority};
use telescope_core::models::ProjectId;
use telescope_core::models::principal::Principal;
use telescope_core::models::resource::ResourceRef;
use telescope_core::models::role::Role;
use telescope_db::repository::{
    SurrealGraphRepository, SurrealHierarchyRepository, SurrealProjectRepository,
    SurrealRelationRepository, SurrealServiceRepository,
};

use crate::error::ApiError;

pub type SharedState<C, A> = Arc<AppState<C, A>>;

/// Everything a handler needs, built once at startup.
pub struct AppState<C: Connection, A: RoleAuthority> {
    pub authenticator: Authenticator,
    pub gate: AccessGate<A, SurrealHierarchyRepository<C>>,
    pub projects: SurrealProjectRepository<C>,
    pub graphs: SurrealGraphRepository<C>,
    pub services: SurrealServiceRepository<C>,
    pub relations: SurrealRelationRepository<C>,
}

/// A granted gate check.
#[derive(Debug, Clone, Copy)]
pub struct Access {
    pub project_id: ProjectId,
    /// The role the authority affirmed; at or above the requirement.
    pub role: Role,
}

impl<C: Connection, A: RoleAuthority> AppState<C, A> {
    pub fn new(db: Surreal<C>, authenticator: Authenticator, authority: A) -> Self {
        Self {
            authenticator,
            gate: AccessGate::new(authority, SurrealHierarchyRepository::new(db.clone())),
            projects: SurrealProjectRepository::new(db.clone()),
            graphs: SurrealGraphRepository::new(db.clone()),
            services: SurrealServiceRepository::new(db.clone()),
            relations: SurrealRelationRepository::new(db),
        }
    }

    /// Run the access gate and turn a denial into an error response.
    pub async fn require(
        &self,
        caller: &Principal,
        required: Role,
        target: ResourceRef,
    ) -> Result<Access, ApiError> {
        match self.gate.authorize(caller, required, target).await {
            Decision::Allowed {
                project_id,
                confirmed,
            } => Ok(Access {
                project_id,
                role: confirmed,
            }),
            Decision::Denied(reason) => Err(reason.into()),
        }
    }
}
