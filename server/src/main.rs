//! Employee server: loads settings, prepares the store and serves the REST resources.
//!
//! Run from repo root: `cargo run -p employee-server`
//! `EMPLOYEE_STORE=memory` runs without a database.

use employee_service::{
    app, ensure_database_exists, ensure_schema, init_tracing, AppState, Repositories, Settings, StoreKind,
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load()?;
    init_tracing();

    let (repositories, pool) = match settings.store {
        StoreKind::Memory => {
            tracing::info!("using in-memory store");
            (Repositories::in_memory(), None)
        }
        StoreKind::Postgres => {
            ensure_database_exists(&settings.database_url).await?;
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(settings.db_max_connections)
                .connect(&settings.database_url)
                .await?;
            ensure_schema(&pool, &settings.schema).await?;
            (Repositories::postgres(pool.clone(), &settings.schema), Some(pool))
        }
    };
    let repositories = if settings.cache_capacity > 0 {
        tracing::info!(capacity = settings.cache_capacity, ttl = ?settings.cache_ttl, "read-through cache enabled");
        repositories.cached(settings.cache_capacity, settings.cache_ttl)
    } else {
        repositories
    };

    let state = AppState::new(&settings.app_name, repositories, pool);
    let router = app(state, settings.max_body_bytes);
    let listener = TcpListener::bind(settings.bind_addr).await?;
    tracing::info!("employee server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}
