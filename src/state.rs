//! Shared application state for all routes.

use crate::service::CrudService;
use crate::store::{Repositories, Stored};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    /// Prefix of the `X-{app}-*` response headers.
    pub app_name: Arc<str>,
    pub repositories: Repositories,
    /// Present when the entities live in PostgreSQL; checked by `/ready`.
    pub pool: Option<PgPool>,
}

impl AppState {
    pub fn new(app_name: &str, repositories: Repositories, pool: Option<PgPool>) -> Self {
        AppState {
            app_name: Arc::from(app_name),
            repositories,
            pool,
        }
    }

    /// State over fresh in-memory stores.
    pub fn in_memory(app_name: &str) -> Self {
        Self::new(app_name, Repositories::in_memory(), None)
    }

    pub fn service<E: Stored>(&self) -> CrudService<E> {
        CrudService::new(self.repositories.of::<E>())
    }
}
