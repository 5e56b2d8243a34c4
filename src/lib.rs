//! Employee service: CRUD REST resources for the Employee domain
//! (regions, countries, locations, departments, jobs, employees, job histories).

pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod migration;
pub mod model;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use config::{Settings, StoreKind};
pub use error::{ApiError, AppError, ConfigError, ErrorKey};
pub use logging::init_tracing;
pub use migration::ensure_schema;
pub use response::DEFAULT_APP_NAME;
pub use routes::{app, common_routes, entity_routes, resource_routes};
pub use service::CrudService;
pub use state::AppState;
pub use store::{ensure_database_exists, Repositories, Repository};
