//! HTTP routes under `/api/core`.
//!
//! Every handler takes a [`Caller`](crate::extract::Caller), so the
//! bearer token is verified before anything else; the access gate runs
//! next, and storage is touched only once it allows.

mod graphs;
mod projects;
mod relations;
mod services;

use axum::Router;
use axum::routing::{get, post, put};
use surrealdb::Connection;
use telescope_auth::RoleAuthority;
use telescope_core::error::TelescopeError;

use crate::state::SharedState;

pub use projects::{ProjectGraphs, ProjectWithRole};

pub const API_PREFIX: &str = "/api/core";

pub fn api_routes<C, A>() -> Router<SharedState<C, A>>
where
    C: Connection,
    A: RoleAuthority + 'static,
{
    Router::new()
        .route(
            "/projects",
            post(projects::create_project::<C, A>).get(projects::list_projects::<C, A>),
        )
        .route(
            "/projects/{id}",
            put(projects::update_project::<C, A>).delete(projects::delete_project::<C, A>),
        )
        .route("/projects/{id}/graphs", get(projects::project_graphs::<C, A>))
        .route("/graphs", post(graphs::create_graph::<C, A>))
        .route(
            "/graphs/{id}",
            put(graphs::update_graph::<C, A>).delete(graphs::delete_graph::<C, A>),
        )
        .route(
            "/graphs/{id}/services",
            get(services::graph_services::<C, A>)
                .post(services::create_graph_services::<C, A>)
                .put(services::update_graph_services::<C, A>),
        )
        .route(
            "/graphs/{id}/relations",
            get(relations::graph_relations::<C, A>)
                .post(relations::create_graph_relations::<C, A>)
                .put(relations::update_graph_relations::<C, A>),
        )
        .route("/services", post(services::create_service::<C, A>))
        .route(
            "/services/{id}",
            get(services::get_service::<C, A>)
                .put(services::update_service::<C, A>)
                .delete(services::delete_service::<C, A>),
        )
        .route("/relations", post(relations::create_relation::<C, A>))
        .route(
            "/relations/{id}",
            get(relations::get_relation::<C, A>)
                .put(relations::update_relation::<C, A>)
                .delete(relations::delete_relation::<C, A>),
        )
}

fn require_name(name: &str) -> Result<(), TelescopeError> {
    if name.trim().is_empty() {
        return Err(TelescopeError::Validation {
            message: "name must not be empty".into(),
        });
    }
    Ok(())
}
