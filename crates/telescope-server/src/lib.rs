//! Telescope Server: HTTP API over the project hierarchy.

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use surrealdb::Connection;
use telescope_auth::RoleAuthority;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application: API routes under
/// [`API_PREFIX`](routes::API_PREFIX), request tracing and CORS.
pub fn app<C, A>(state: AppState<C, A>, cors: CorsLayer) -> Router
where
    C: Connection,
    A: RoleAuthority + 'static,
{
    Router::new()
        .nest(routes::API_PREFIX, routes::api_routes::<C, A>())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(state))
}
