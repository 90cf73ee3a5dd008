//! Project endpoints.

use std::collections::HashSet;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Serialize;
use surrealdb::Connection;
use telescope_auth::RoleAuthority;
use telescope_core::error::TelescopeError;
use telescope_core::models::ProjectId;
use telescope_core::models::graph::Graph;
use telescope_core::models::project::{CreateProject, Project, UpdateProject};
use telescope_core::models::resource::ResourceRef;
use telescope_core::models::role::Role;
use telescope_core::repository::{GraphRepository, ProjectRepository};
use tracing::{error, info, warn};

use super::require_name;
use crate::error::ApiError;
use crate::extract::Caller;
use crate::state::SharedState;

#[derive(Debug, Serialize)]
pub struct ProjectWithRole {
    pub project: Project,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct ProjectGraphs {
    pub can_edit: bool,
    pub graphs: Vec<Graph>,
}

/// Create a project and make the caller its owner.
///
/// If the authority refuses the ownership record the project is removed
/// again, so no project exists without an owner.
pub async fn create_project<C: Connection, A: RoleAuthority + 'static>(
    State(state): State<SharedState<C, A>>,
    Caller(caller): Caller,
    Json(input): Json<CreateProject>,
) -> Result<(StatusCode, Json<Project>), ApiError> {
    require_name(&input.name)?;
    let project = state.projects.create(input).await?;

    if let Err(e) = state
        .gate
        .authority()
        .register_owner(caller.user_id, project.id)
        .await
    {
        error!(
            user_id = caller.user_id,
            project_id = project.id,
            error = %e,
            "Owner registration failed, removing project"
        );
        if let Err(rollback) = state.projects.delete(project.id).await {
            error!(project_id = project.id, error = %rollback, "Project rollback failed");
        }
        return Err(TelescopeError::from(e).into());
    }

    info!(user_id = caller.user_id, project_id = project.id, "Project created");
    Ok((StatusCode::CREATED, Json(project)))
}

/// Projects on which the caller holds any role, each with the highest
/// role held.
pub async fn list_projects<C: Connection, A: RoleAuthority + 'static>(
    State(state): State<SharedState<C, A>>,
    Caller(caller): Caller,
) -> Result<Json<Vec<ProjectWithRole>>, ApiError> {
    let authority = state.gate.authority();
    let member_of: HashSet<ProjectId> = authority
        .user_projects(caller.user_id)
        .await
        .map_err(TelescopeError::from)?
        .into_iter()
        .collect();

    let mut listed = Vec::new();
    for project in state.projects.list().await? {
        if !member_of.contains(&project.id) {
            continue;
        }
        match state.gate.effective_role(&caller, project.id).await {
            Ok(Some(role)) => listed.push(ProjectWithRole { project, role }),
            Ok(None) => {}
            Err(e) => warn!(
                user_id = caller.user_id,
                project_id = project.id,
                error = %e,
                "Role lookup failed, omitting project"
            ),
        }
    }

    Ok(Json(listed))
}

pub async fn update_project<C: Connection, A: RoleAuthority + 'static>(
    State(state): State<SharedState<C, A>>,
    Caller(caller): Caller,
    Path(id): Path<ProjectId>,
    Json(input): Json<UpdateProject>,
) -> Result<Json<Project>, ApiError> {
    state
        .require(&caller, Role::Editor, ResourceRef::project(id))
        .await?;
    require_name(&input.name)?;

    let project = state.projects.update(id, input).await?;
    info!(user_id = caller.user_id, project_id = id, "Project updated");
    Ok(Json(project))
}

pub async fn delete_project<C: Connection, A: RoleAuthority + 'static>(
    State(state): State<SharedState<C, A>>,
    Caller(caller): Caller,
    Path(id): Path<ProjectId>,
) -> Result<StatusCode, ApiError> {
    state
        .require(&caller, Role::Editor, ResourceRef::project(id))
        .await?;

    state.projects.delete(id).await?;
    info!(user_id = caller.user_id, project_id = id, "Project deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Graphs of a project, with whether the caller may edit them.
pub async fn project_graphs<C: Connection, A: RoleAuthority + 'static>(
    State(state): State<SharedState<C, A>>,
    Caller(caller): Caller,
    Path(id): Path<ProjectId>,
) -> Result<Json<ProjectGraphs>, ApiError> {
    let access = state
        .require(&caller, Role::Viewer, ResourceRef::project(id))
        .await?;
    let graphs = state.graphs.list_by_project(id).await?;

    let can_edit = access.role.satisfies(Role::Editor)
        || state
            .gate
            .authorize_project(&caller, Role::Editor, id)
            .await
            .is_allowed();

    Ok(Json(ProjectGraphs { can_edit, graphs }))
}
