//! Relation endpoints, single and per-graph bulk.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use surrealdb::Connection;
use telescope_auth::RoleAuthority;
use telescope_core::models::relation::{CreateRelation, Relation, RelationFields, RelationPatch};
use telescope_core::models::resource::ResourceRef;
use telescope_core::models::role::Role;
use telescope_core::models::{GraphId, RelationId};
use telescope_core::repository::RelationRepository;
use tracing::info;

use super::require_name;
use crate::error::ApiError;
use crate::extract::Caller;
use crate::state::SharedState;

pub async fn graph_relations<C: Connection, A: RoleAuthority + 'static>(
    State(state): State<SharedState<C, A>>,
    Caller(caller): Caller,
    Path(graph_id): Path<GraphId>,
) -> Result<Json<Vec<Relation>>, ApiError> {
    state
        .require(&caller, Role::Viewer, ResourceRef::graph(graph_id))
        .await?;
    Ok(Json(state.relations.list_by_graph(graph_id).await?))
}

/// Bulk create; responds with the new IDs in request order.
pub async fn create_graph_relations<C: Connection, A: RoleAuthority + 'static>(
    State(state): State<SharedState<C, A>>,
    Caller(caller): Caller,
    Path(graph_id): Path<GraphId>,
    Json(inputs): Json<Vec<RelationFields>>,
) -> Result<(StatusCode, Json<Vec<RelationId>>), ApiError> {
    state
        .require(&caller, Role::Editor, ResourceRef::graph(graph_id))
        .await?;
    for input in &inputs {
        require_name(&input.name)?;
    }

    let ids = state.relations.create_many(graph_id, inputs).await?;
    info!(user_id = caller.user_id, graph_id, count = ids.len(), "Relations created");
    Ok((StatusCode::CREATED, Json(ids)))
}

pub async fn update_graph_relations<C: Connection, A: RoleAuthority + 'static>(
    State(state): State<SharedState<C, A>>,
    Caller(caller): Caller,
    Path(graph_id): Path<GraphId>,
    Json(patches): Json<Vec<RelationPatch>>,
) -> Result<StatusCode, ApiError> {
    state
        .require(&caller, Role::Editor, ResourceRef::graph(graph_id))
        .await?;
    for patch in &patches {
        require_name(&patch.fields.name)?;
    }

    let count = patches.len();
    state.relations.update_many(graph_id, patches).await?;
    info!(user_id = caller.user_id, graph_id, count, "Relations updated");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_relation<C: Connection, A: RoleAuthority + 'static>(
    State(state): State<SharedState<C, A>>,
    Caller(caller): Caller,
    Json(input): Json<CreateRelation>,
) -> Result<(StatusCode, Json<Relation>), ApiError> {
    state
        .require(&caller, Role::Editor, ResourceRef::graph(input.graph_id))
        .await?;
    require_name(&input.fields.name)?;

    let relation = state.relations.create(input).await?;
    info!(
        user_id = caller.user_id,
        graph_id = relation.graph_id,
        relation_id = relation.id,
        "Relation created"
    );
    Ok((StatusCode::CREATED, Json(relation)))
}

pub async fn get_relation<C: Connection, A: RoleAuthority + 'static>(
    State(state): State<SharedState<C, A>>,
    Caller(caller): Caller,
    Path(id): Path<RelationId>,
) -> Result<Json<Relation>, ApiError> {
    state
        .require(&caller, Role::Viewer, ResourceRef::relation(id))
        .await?;
    Ok(Json(state.relations.get_by_id(id).await?))
}

pub async fn update_relation<C: Connection, A: RoleAuthority + 'static>(
    State(state): State<SharedState<C, A>>,
    Caller(caller): Caller,
    Path(id): Path<RelationId>,
    Json(input): Json<RelationFields>,
) -> Result<Json<Relation>, ApiError> {
    state
        .require(&caller, Role::Editor, ResourceRef::relation(id))
        .await?;
    require_name(&input.name)?;

    let relation = state.relations.update(id, input).await?;
    info!(user_id = caller.user_id, relation_id = id, "Relation updated");
    Ok(Json(relation))
}

pub async fn delete_relation<C: Connection, A: RoleAuthority + 'static>(
    State(state): State<SharedState<C, A>>,
    Caller(caller): Caller,
    Path(id): Path<RelationId>,
) -> Result<StatusCode, ApiError> {
    state
        .require(&caller, Role::Editor, ResourceRef::relation(id))
        .await?;

    state.relations.delete(id).await?;
    info!(user_id = caller.user_id, relation_id = id, "Relation deleted");
    Ok(StatusCode::NO_CONTENT)
}
