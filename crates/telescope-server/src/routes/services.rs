//! Service endpoints, single and per-graph bulk.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use surrealdb::Connection;
use telescope_auth::RoleAuthority;
use telescope_core::models::resource::ResourceRef;
use telescope_core::models::role::Role;
use telescope_core::models::service::{CreateService, Service, ServiceFields, ServicePatch};
use telescope_core::models::{GraphId, ServiceId};
use telescope_core::repository::ServiceRepository;
use tracing::info;

use super::require_name;
use crate::error::ApiError;
use crate::extract::Caller;
use crate::state::SharedState;

pub async fn graph_services<C: Connection, A: RoleAuthority + 'static>(
    State(state): State<SharedState<C, A>>,
    Caller(caller): Caller,
    Path(graph_id): Path<GraphId>,
) -> Result<Json<Vec<Service>>, ApiError> {
    state
        .require(&caller, Role::Viewer, ResourceRef::graph(graph_id))
        .await?;
    Ok(Json(state.services.list_by_graph(graph_id).await?))
}

/// Bulk create; responds with the new IDs in request order.
pub async fn create_graph_services<C: Connection, A: RoleAuthority + 'static>(
    State(state): State<SharedState<C, A>>,
    Caller(caller): Caller,
    Path(graph_id): Path<GraphId>,
    Json(inputs): Json<Vec<ServiceFields>>,
) -> Result<(StatusCode, Json<Vec<ServiceId>>), ApiError> {
    state
        .require(&caller, Role::Editor, ResourceRef::graph(graph_id))
        .await?;
    for input in &inputs {
        require_name(&input.name)?;
    }

    let ids = state.services.create_many(graph_id, inputs).await?;
    info!(user_id = caller.user_id, graph_id, count = ids.len(), "Services created");
    Ok((StatusCode::CREATED, Json(ids)))
}

pub async fn update_graph_services<C: Connection, A: RoleAuthority + 'static>(
    State(state): State<SharedState<C, A>>,
    Caller(caller): Caller,
    Path(graph_id): Path<GraphId>,
    Json(patches): Json<Vec<ServicePatch>>,
) -> Result<StatusCode, ApiError> {
    state
        .require(&caller, Role::Editor, ResourceRef::graph(graph_id))
        .await?;
    for patch in &patches {
        require_name(&patch.fields.name)?;
    }

    let count = patches.len();
    state.services.update_many(graph_id, patches).await?;
    info!(user_id = caller.user_id, graph_id, count, "Services updated");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_service<C: Connection, A: RoleAuthority + 'static>(
    State(state): State<SharedState<C, A>>,
    Caller(caller): Caller,
    Json(input): Json<CreateService>,
) -> Result<(StatusCode, Json<Service>), ApiError> {
    state
        .require(&caller, Role::Editor, ResourceRef::graph(input.graph_id))
        .await?;
    require_name(&input.fields.name)?;

    let service = state.services.create(input).await?;
    info!(
        user_id = caller.user_id,
        graph_id = service.graph_id,
        service_id = service.id,
        "Service created"
    );
    Ok((StatusCode::CREATED, Json(service)))
}

pub async fn get_service<C: Connection, A: RoleAuthority + 'static>(
    State(state): State<SharedState<C, A>>,
    Caller(caller): Caller,
    Path(id): Path<ServiceId>,
) -> Result<Json<Service>, ApiError> {
    state
        .require(&caller, Role::Viewer, ResourceRef::service(id))
        .await?;
    Ok(Json(state.services.get_by_id(id).await?))
}

pub async fn update_service<C: Connection, A: RoleAuthority + 'static>(
    State(state): State<SharedState<C, A>>,
    Caller(caller): Caller,
    Path(id): Path<ServiceId>,
    Json(input): Json<ServiceFields>,
) -> Result<Json<Service>, ApiError> {
    state
        .require(&caller, Role::Editor, ResourceRef::service(id))
        .await?;
    require_name(&input.name)?;

    let service = state.services.update(id, input).await?;
    info!(user_id = caller.user_id, service_id = id, "Service updated");
    Ok(Json(service))
}

pub async fn delete_service<C: Connection, A: RoleAuthority + 'static>(
    State(state): State<SharedState<C, A>>,
    Caller(caller): Caller,
    Path(id): Path<ServiceId>,
) -> Result<StatusCode, ApiError> {
    state
        .require(&caller, Role::Editor, ResourceRef::service(id))
        .await?;

    state.services.delete(id).await?;
    info!(user_id = caller.user_id, service_id = id, "Service deleted");
    Ok(StatusCode::NO_CONTENT)
}
