//! Identifier rules and pass-through to the repository, once for every entity type.

use crate::error::{AppError, ErrorKey};
use crate::model::Entity;
use crate::store::Repository;
use std::sync::Arc;

pub struct CrudService<E: Entity> {
    repo: Arc<dyn Repository<E>>,
}

impl<E: Entity> CrudService<E> {
    pub fn new(repo: Arc<dyn Repository<E>>) -> Self {
        CrudService { repo }
    }

    /// Insert a record that carries no identifier. Returns it with its new key.
    pub async fn create(&self, entity: E) -> Result<E, AppError> {
        tracing::debug!(entity = E::ENTITY_NAME, "REST request to save : {:?}", entity);
        if entity.id().is_some() {
            return Err(AppError::validation(
                E::ENTITY_NAME,
                ErrorKey::IdExists,
                format!("A new {} cannot already have an ID", E::ENTITY_NAME),
            ));
        }
        self.repo.save(entity).await
    }

    /// Overwrite the record at `path_id` with `entity`.
    pub async fn update(&self, path_id: &str, entity: E) -> Result<E, AppError> {
        tracing::debug!(entity = E::ENTITY_NAME, id = %path_id, "REST request to update : {:?}", entity);
        self.check_id(path_id, entity.id()).await?;
        self.repo.save(entity).await
    }

    /// Merge the present fields of `patch` into the record at `path_id`.
    pub async fn partial_update(&self, path_id: &str, patch: E) -> Result<E, AppError> {
        tracing::debug!(entity = E::ENTITY_NAME, id = %path_id, "REST request to partial update : {:?}", patch);
        let id = self.check_id(path_id, patch.id()).await?;
        let mut existing = self.repo.find_by_id(&id).await?.ok_or(AppError::NotFound)?;
        existing.merge(patch);
        self.repo.save(existing).await
    }

    pub async fn list(&self) -> Result<Vec<E>, AppError> {
        tracing::debug!(entity = E::ENTITY_NAME, "REST request to get all");
        self.repo.find_all().await
    }

    pub async fn read(&self, id: &E::Id) -> Result<Option<E>, AppError> {
        tracing::debug!(entity = E::ENTITY_NAME, %id, "REST request to get");
        self.repo.find_by_id(id).await
    }

    pub async fn delete(&self, id: &E::Id) -> Result<(), AppError> {
        tracing::debug!(entity = E::ENTITY_NAME, %id, "REST request to delete");
        self.repo.delete_by_id(id).await
    }

    /// Payload id must be present, equal the path id as a key value, and exist.
    async fn check_id(&self, path_id: &str, payload_id: Option<&E::Id>) -> Result<E::Id, AppError> {
        let id = payload_id.ok_or_else(|| AppError::validation(E::ENTITY_NAME, ErrorKey::IdNull, "Invalid id"))?;
        let invalid = || AppError::validation(E::ENTITY_NAME, ErrorKey::IdInvalid, "Invalid ID");
        let path_key: E::Id = path_id.parse().map_err(|_| invalid())?;
        if *id != path_key {
            return Err(invalid());
        }
        if !self.repo.exists_by_id(id).await? {
            return Err(AppError::validation(E::ENTITY_NAME, ErrorKey::IdNotFound, "Entity not found"));
        }
        Ok(id.clone())
    }
}
