//! Graph endpoints.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use surrealdb::Connection;
use telescope_auth::RoleAuthority;
use telescope_core::models::GraphId;
use telescope_core::models::graph::{CreateGraph, Graph, UpdateGraph};
use telescope_core::models::resource::ResourceRef;
use telescope_core::models::role::Role;
use telescope_core::repository::GraphRepository;
use tracing::info;

use super::require_name;
use crate::error::ApiError;
use crate::extract::Caller;
use crate::state::SharedState;

/// Create a graph. The caller needs `editor` on the project named in
/// the body.
pub async fn create_graph<C: Connection, A: RoleAuthority + 'static>(
    State(state): State<SharedState<C, A>>,
    Caller(caller): Caller,
    Json(input): Json<CreateGraph>,
) -> Result<(StatusCode, Json<Graph>), ApiError> {
    state
        .require(&caller, Role::Editor, ResourceRef::project(input.project_id))
        .await?;
    require_name(&input.name)?;

    let graph = state.graphs.create(input).await?;
    info!(
        user_id = caller.user_id,
        project_id = graph.project_id,
        graph_id = graph.id,
        "Graph created"
    );
    Ok((StatusCode::CREATED, Json(graph)))
}

pub async fn update_graph<C: Connection, A: RoleAuthority + 'static>(
    State(state): State<SharedState<C, A>>,
    Caller(caller): Caller,
    Path(id): Path<GraphId>,
    Json(input): Json<UpdateGraph>,
) -> Result<Json<Graph>, ApiError> {
    state
        .require(&caller, Role::Editor, ResourceRef::graph(id))
        .await?;
    require_name(&input.name)?;

    let graph = state.graphs.update(id, input).await?;
    info!(user_id = caller.user_id, graph_id = id, "Graph updated");
    Ok(Json(graph))
}

pub async fn delete_graph<C: Connection, A: RoleAuthority + 'static>(
    State(state): State<SharedState<C, A>>,
    Caller(caller): Caller,
    Path(id): Path<GraphId>,
) -> Result<StatusCode, ApiError> {
    state
        .require(&caller, Role::Editor, ResourceRef::graph(id))
        .await?;

    state.graphs.delete(id).await?;
    info!(user_id = caller.user_id, graph_id = id, "Graph deleted");
    Ok(StatusCode::NO_CONTENT)
}
