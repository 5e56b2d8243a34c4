//! Entity CRUD routes: one resource per entity type under `/api`.

use crate::handlers::entity::{create, delete, list, partial_update, read, update, Resource};
use crate::model::{Country, Department, Employee, Job, JobHistory, Location, Region};
use crate::state::AppState;
use axum::{routing::get, Router};

/// `/api/{PATH}` and `/api/{PATH}/:id` for one entity type.
pub fn resource_routes<E: Resource>() -> Router<AppState> {
    let collection = format!("/api/{}", E::PATH);
    let item = format!("{}/:id", collection);
    Router::new()
        .route(&collection, get(list::<E>).post(create::<E>))
        .route(
            &item,
            get(read::<E>)
                .put(update::<E>)
                .patch(partial_update::<E>)
                .delete(delete::<E>),
        )
}

pub fn entity_routes(state: AppState) -> Router {
    Router::new()
        .merge(resource_routes::<Region>())
        .merge(resource_routes::<Country>())
        .merge(resource_routes::<Location>())
        .merge(resource_routes::<Department>())
        .merge(resource_routes::<Job>())
        .merge(resource_routes::<Employee>())
        .merge(resource_routes::<JobHistory>())
        .with_state(state)
}
