//! Storage access: the repository abstraction and its backends.

mod bootstrap;
mod cached;
mod memory;
mod postgres;

pub use bootstrap::ensure_database_exists;
pub use cached::{CacheEpoch, CachedRepository};
pub use memory::{InMemoryRepository, MemoryDb};
pub use postgres::PgRepository;

use crate::error::AppError;
use crate::model::{Country, Department, Employee, Entity, Job, JobHistory, Location, Region};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

/// Storage access for one entity type. Implementations do no validation.
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    /// Every stored record, ordered by key.
    async fn find_all(&self) -> Result<Vec<E>, AppError>;

    async fn find_by_id(&self, id: &E::Id) -> Result<Option<E>, AppError>;

    async fn exists_by_id(&self, id: &E::Id) -> Result<bool, AppError> {
        Ok(self.find_by_id(id).await?.is_some())
    }

    /// Inserts when the record has no key (assigning one), otherwise writes
    /// the record under its key. Returns the persisted form.
    async fn save(&self, entity: E) -> Result<E, AppError>;

    /// Removes the record; absent keys are not an error.
    async fn delete_by_id(&self, id: &E::Id) -> Result<(), AppError>;
}

/// Key of `E` as a JSON value, the form bound into queries and stored in rows.
pub(crate) fn key_json<E: Entity>(id: &E::Id) -> Result<Value, AppError> {
    serde_json::to_value(id).map_err(|e| AppError::BadRequest(format!("unusable key {}: {}", id, e)))
}

/// Decodes one record read as JSON and points its loaded children back at it.
pub(crate) fn decode_record<E: Entity>(row: Value) -> Result<E, AppError> {
    let mut entity: E =
        serde_json::from_value(row).map_err(|e| AppError::Db(sqlx::Error::Decode(Box::new(e))))?;
    entity.link_children();
    Ok(entity)
}

/// One repository per entity type.
#[derive(Clone)]
pub struct Repositories {
    pub regions: Arc<dyn Repository<Region>>,
    pub countries: Arc<dyn Repository<Country>>,
    pub locations: Arc<dyn Repository<Location>>,
    pub departments: Arc<dyn Repository<Department>>,
    pub jobs: Arc<dyn Repository<Job>>,
    pub employees: Arc<dyn Repository<Employee>>,
    pub job_histories: Arc<dyn Repository<JobHistory>>,
}

impl Repositories {
    /// In-memory stores over one shared set of tables.
    pub fn in_memory() -> Self {
        let db = MemoryDb::shared();
        Repositories {
            regions: Arc::new(InMemoryRepository::new(db.clone())),
            countries: Arc::new(InMemoryRepository::new(db.clone())),
            locations: Arc::new(InMemoryRepository::new(db.clone())),
            departments: Arc::new(InMemoryRepository::new(db.clone())),
            jobs: Arc::new(InMemoryRepository::new(db.clone())),
            employees: Arc::new(InMemoryRepository::new(db.clone())),
            job_histories: Arc::new(InMemoryRepository::new(db)),
        }
    }

    /// PostgreSQL stores over the tables in `schema`.
    pub fn postgres(pool: PgPool, schema: &str) -> Self {
        let schema: Arc<str> = Arc::from(schema);
        Repositories {
            regions: Arc::new(PgRepository::new(pool.clone(), schema.clone())),
            countries: Arc::new(PgRepository::new(pool.clone(), schema.clone())),
            locations: Arc::new(PgRepository::new(pool.clone(), schema.clone())),
            departments: Arc::new(PgRepository::new(pool.clone(), schema.clone())),
            jobs: Arc::new(PgRepository::new(pool.clone(), schema.clone())),
            employees: Arc::new(PgRepository::new(pool.clone(), schema.clone())),
            job_histories: Arc::new(PgRepository::new(pool, schema)),
        }
    }

    /// Puts a read-through cache of `capacity` records per entity in front of every store.
    pub fn cached(self, capacity: u64, ttl: Duration) -> Self {
        let epoch = CacheEpoch::default();
        Repositories {
            regions: Arc::new(CachedRepository::new(self.regions, capacity, ttl, epoch.clone())),
            countries: Arc::new(CachedRepository::new(self.countries, capacity, ttl, epoch.clone())),
            locations: Arc::new(CachedRepository::new(self.locations, capacity, ttl, epoch.clone())),
            departments: Arc::new(CachedRepository::new(self.departments, capacity, ttl, epoch.clone())),
            jobs: Arc::new(CachedRepository::new(self.jobs, capacity, ttl, epoch.clone())),
            employees: Arc::new(CachedRepository::new(self.employees, capacity, ttl, epoch.clone())),
            job_histories: Arc::new(CachedRepository::new(self.job_histories, capacity, ttl, epoch.clone())),
        }
    }
}

/// Entity types with a repository in [`Repositories`].
pub trait Stored: Entity {
    fn repository(repos: &Repositories) -> &Arc<dyn Repository<Self>>;
}

macro_rules! stored {
    ($($ty:ty => $field:ident),* $(,)?) => {
        $(
            impl Stored for $ty {
                fn repository(repos: &Repositories) -> &Arc<dyn Repository<Self>> {
                    &repos.$field
                }
            }
        )*
    };
}

stored! {
    Region => regions,
    Country => countries,
    Location => locations,
    Department => departments,
    Job => jobs,
    Employee => employees,
    JobHistory => job_histories,
}

impl Repositories {
    pub fn of<E: Stored>(&self) -> Arc<dyn Repository<E>> {
        E::repository(self).clone()
    }
}
