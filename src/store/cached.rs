//! Read-through cache in front of a repository.
//!
//! Records embed their relations, so a write to one entity can change what a
//! read of another returns. Every cache built by [`Repositories::cached`]
//! shares one [`CacheEpoch`]; a write anywhere bumps it and older entries
//! count as misses.
//!
//! [`Repositories::cached`]: crate::store::Repositories::cached

use crate::error::AppError;
use crate::model::Entity;
use crate::store::Repository;
use async_trait::async_trait;
use moka::future::Cache;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Debug, Default)]
pub struct CacheEpoch(Arc<AtomicU64>);

impl CacheEpoch {
    fn current(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    fn bump(&self) {
        self.0.fetch_add(1, Ordering::AcqRel);
    }
}

pub struct CachedRepository<E: Entity> {
    inner: Arc<dyn Repository<E>>,
    cache: Cache<E::Id, (u64, E)>,
    epoch: CacheEpoch,
}

impl<E: Entity> CachedRepository<E> {
    pub fn new(inner: Arc<dyn Repository<E>>, capacity: u64, ttl: Duration, epoch: CacheEpoch) -> Self {
        let cache = Cache::builder()
            .time_to_live(ttl)
            .max_capacity(capacity)
            .build();
        Self { inner, cache, epoch }
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for CachedRepository<E> {
    async fn find_all(&self) -> Result<Vec<E>, AppError> {
        self.inner.find_all().await
    }

    async fn find_by_id(&self, id: &E::Id) -> Result<Option<E>, AppError> {
        let epoch = self.epoch.current();
        if let Some((seen, entity)) = self.cache.get(id).await {
            if seen == epoch {
                tracing::trace!(entity = E::ENTITY_NAME, %id, "cache hit");
                return Ok(Some(entity));
            }
        }
        let found = self.inner.find_by_id(id).await?;
        if let Some(entity) = &found {
            self.cache.insert(id.clone(), (epoch, entity.clone())).await;
        }
        Ok(found)
    }

    async fn exists_by_id(&self, id: &E::Id) -> Result<bool, AppError> {
        if let Some((seen, _)) = self.cache.get(id).await {
            if seen == self.epoch.current() {
                return Ok(true);
            }
        }
        self.inner.exists_by_id(id).await
    }

    async fn save(&self, entity: E) -> Result<E, AppError> {
        let saved = self.inner.save(entity).await;
        self.epoch.bump();
        if let Ok(entity) = &saved {
            if let Some(id) = entity.id() {
                self.cache.invalidate(id).await;
            }
        }
        saved
    }

    async fn delete_by_id(&self, id: &E::Id) -> Result<(), AppError> {
        let result = self.inner.delete_by_id(id).await;
        self.epoch.bump();
        self.cache.invalidate(id).await;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Region;
    use crate::store::{InMemoryRepository, MemoryDb};

    fn cached() -> (Arc<dyn Repository<Region>>, CachedRepository<Region>, CacheEpoch) {
        let inner: Arc<dyn Repository<Region>> = Arc::new(InMemoryRepository::new(MemoryDb::shared()));
        let epoch = CacheEpoch::default();
        let repo = CachedRepository::new(inner.clone(), 100, Duration::from_secs(60), epoch.clone());
        (inner, repo, epoch)
    }

    #[tokio::test]
    async fn reads_through_and_sees_own_writes() {
        let (_, repo, _) = cached();
        let saved = repo.save(Region { region_name: Some("EMEA".into()), ..Default::default() }).await.unwrap();
        let id = saved.region_id.unwrap();
        assert!(repo.find_by_id(&id).await.unwrap().is_some());

        repo.save(Region { region_id: Some(id), region_name: Some("APAC".into()), ..Default::default() }).await.unwrap();
        let found = repo.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(found.region_name.as_deref(), Some("APAC"));

        repo.delete_by_id(&id).await.unwrap();
        assert!(repo.find_by_id(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn epoch_bump_discards_entries() {
        let (inner, repo, epoch) = cached();
        let saved = repo.save(Region { region_name: Some("EMEA".into()), ..Default::default() }).await.unwrap();
        let id = saved.region_id.unwrap();
        repo.find_by_id(&id).await.unwrap();

        inner.delete_by_id(&id).await.unwrap();
        assert!(repo.find_by_id(&id).await.unwrap().is_some());
        epoch.bump();
        assert!(repo.find_by_id(&id).await.unwrap().is_none());
    }
}
