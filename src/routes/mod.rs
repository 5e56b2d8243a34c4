//! Router assembly.

mod common;
mod entity;

pub use common::common_routes;
pub use entity::{entity_routes, resource_routes};

use crate::state::AppState;
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Full application: entity resources and common routes, with request tracing
/// and a body size limit.
pub fn app(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .merge(entity_routes(state.clone()))
        .merge(common_routes(state))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TraceLayer::new_for_http())
}
