//! PostgreSQL repository. Statements come from the table descriptors; rows
//! arrive as JSON objects and are decoded into the entity type.

use crate::error::AppError;
use crate::model::Entity;
use crate::sql::{self, PgBindValue, QueryBuf};
use crate::store::{decode_record, key_json, Repository};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use std::marker::PhantomData;
use std::sync::Arc;

pub struct PgRepository<E> {
    pool: PgPool,
    schema: Arc<str>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> PgRepository<E> {
    pub fn new(pool: PgPool, schema: Arc<str>) -> Self {
        PgRepository {
            pool,
            schema,
            _entity: PhantomData,
        }
    }

    async fn fetch_rows(&self, q: &QueryBuf) -> Result<Vec<Value>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query_scalar::<_, Value>(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn fetch_row(&self, q: &QueryBuf) -> Result<Option<Value>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query_scalar::<_, Value>(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        Ok(query.fetch_optional(&self.pool).await?)
    }

    /// Runs a write returning the key as text.
    async fn write_returning_key(&self, q: &QueryBuf) -> Result<Option<String>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "write");
        let mut query = sqlx::query_scalar::<_, String>(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        query.fetch_optional(&self.pool).await.map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                AppError::BadRequest(format!("{} references an unknown record: {}", E::ENTITY_NAME, db.message()))
            }
            other => AppError::Db(other),
        })
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for PgRepository<E> {
    async fn find_all(&self) -> Result<Vec<E>, AppError> {
        let q = sql::select_all(&self.schema, E::table());
        self.fetch_rows(&q).await?.into_iter().map(decode_record).collect()
    }

    async fn find_by_id(&self, id: &E::Id) -> Result<Option<E>, AppError> {
        let q = sql::select_by_id(&self.schema, E::table(), key_json::<E>(id)?);
        self.fetch_row(&q).await?.map(decode_record).transpose()
    }

    async fn exists_by_id(&self, id: &E::Id) -> Result<bool, AppError> {
        let q = sql::exists_by_id(&self.schema, E::table(), key_json::<E>(id)?);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query_scalar::<_, bool>(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        Ok(query.fetch_one(&self.pool).await?)
    }

    async fn save(&self, entity: E) -> Result<E, AppError> {
        let def = E::table();
        let record = serde_json::to_value(&entity)
            .map_err(|e| AppError::BadRequest(format!("unserializable {}: {}", E::ENTITY_NAME, e)))?;
        let values = sql::row_values(def, &record);
        let q = match entity.id() {
            Some(id) => sql::upsert(&self.schema, def, key_json::<E>(id)?, values),
            None => sql::insert(&self.schema, def, values),
        };
        let key = self
            .write_returning_key(&q)
            .await?
            .ok_or(AppError::Db(sqlx::Error::RowNotFound))?;
        let id: E::Id = key
            .parse()
            .map_err(|_| AppError::BadRequest(format!("store returned unusable key {}", key)))?;
        self.find_by_id(&id)
            .await?
            .ok_or(AppError::Db(sqlx::Error::RowNotFound))
    }

    async fn delete_by_id(&self, id: &E::Id) -> Result<(), AppError> {
        let q = sql::delete(&self.schema, E::table(), key_json::<E>(id)?);
        tracing::debug!(sql = %q.sql, params = ?q.params, "write");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        query.execute(&self.pool).await?;
        Ok(())
    }
}
