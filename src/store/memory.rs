//! In-memory store, used by tests and `EMPLOYEE_STORE=memory`.
//!
//! Rows live per table, keyed by column name, and are read back through the
//! table descriptors in the same JSON shape the PostgreSQL reads produce:
//! references resolve to the referenced row, collections to the rows that
//! reference this one. Foreign keys are checked on save and set to null when
//! the referenced row is deleted.

use crate::error::AppError;
use crate::model::table::all_tables;
use crate::model::{Entity, SequenceKey, TableDef, SEQUENCE_START};
use crate::sql::row_values;
use crate::store::{decode_record, key_json, Repository};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Primary key of a stored row.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum RowKey {
    Int(i64),
    Text(String),
}

impl RowKey {
    fn from_json(v: &Value) -> Option<Self> {
        match v {
            Value::Number(n) => n.as_i64().map(RowKey::Int),
            Value::String(s) => Some(RowKey::Text(s.clone())),
            _ => None,
        }
    }
}

type Row = Map<String, Value>;

#[derive(Default)]
struct Tables(HashMap<&'static str, BTreeMap<RowKey, Row>>);

impl Tables {
    fn rows(&self, table: &str) -> impl Iterator<Item = (&RowKey, &Row)> {
        self.0.get(table).into_iter().flat_map(|t| t.iter())
    }

    fn get(&self, def: &TableDef, key: &RowKey) -> Option<&Row> {
        self.0.get(def.table).and_then(|t| t.get(key))
    }

    /// Key and scalar columns of one row, named by JSON field.
    fn scalar_json(def: &TableDef, row: &Row) -> Map<String, Value> {
        def.scalar_columns()
            .map(|c| (c.field.to_string(), row.get(c.name).cloned().unwrap_or(Value::Null)))
            .collect()
    }

    /// One row with its references and collections expanded one level.
    fn record_json(&self, def: &TableDef, key: &RowKey, row: &Row) -> Value {
        let mut out = Self::scalar_json(def, row);
        for r in def.references {
            let target = (r.target)();
            let nested = row
                .get(r.column)
                .and_then(RowKey::from_json)
                .and_then(|k| self.get(target, &k))
                .map(|t| Value::Object(Self::scalar_json(target, t)))
                .unwrap_or(Value::Null);
            out.insert(r.field.to_string(), nested);
        }
        for c in def.collections {
            let target = (c.target)();
            let children = self
                .rows(target.table)
                .filter(|(_, child)| child.get(c.foreign_key).and_then(RowKey::from_json).as_ref() == Some(key))
                .map(|(_, child)| Value::Object(Self::scalar_json(target, child)))
                .collect();
            out.insert(c.field.to_string(), Value::Array(children));
        }
        Value::Object(out)
    }
}

/// Every entity table plus the shared id sequence.
pub struct MemoryDb {
    tables: RwLock<Tables>,
    seq: AtomicI64,
}

impl MemoryDb {
    pub fn shared() -> Arc<Self> {
        Arc::new(MemoryDb {
            tables: RwLock::new(Tables::default()),
            seq: AtomicI64::new(SEQUENCE_START),
        })
    }

    fn next_key(&self) -> i64 {
        self.seq.fetch_add(1, Ordering::Relaxed)
    }
}

pub struct InMemoryRepository<E> {
    db: Arc<MemoryDb>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> InMemoryRepository<E> {
    pub fn new(db: Arc<MemoryDb>) -> Self {
        InMemoryRepository {
            db,
            _entity: PhantomData,
        }
    }

    fn row_key(id: &E::Id) -> Result<RowKey, AppError> {
        let json = key_json::<E>(id)?;
        RowKey::from_json(&json).ok_or_else(|| AppError::BadRequest(format!("unusable key {}", id)))
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for InMemoryRepository<E> {
    async fn find_all(&self) -> Result<Vec<E>, AppError> {
        let def = E::table();
        let tables = self.db.tables.read().await;
        tables
            .rows(def.table)
            .map(|(key, row)| decode_record(tables.record_json(def, key, row)))
            .collect()
    }

    async fn find_by_id(&self, id: &E::Id) -> Result<Option<E>, AppError> {
        let def = E::table();
        let key = Self::row_key(id)?;
        let tables = self.db.tables.read().await;
        tables
            .get(def, &key)
            .map(|row| decode_record(tables.record_json(def, &key, row)))
            .transpose()
    }

    async fn exists_by_id(&self, id: &E::Id) -> Result<bool, AppError> {
        let key = Self::row_key(id)?;
        Ok(self.db.tables.read().await.get(E::table(), &key).is_some())
    }

    async fn save(&self, entity: E) -> Result<E, AppError> {
        let def = E::table();
        let record = serde_json::to_value(&entity)
            .map_err(|e| AppError::BadRequest(format!("unserializable {}: {}", E::ENTITY_NAME, e)))?;
        let mut row: Row = row_values(def, &record)
            .into_iter()
            .map(|(c, v)| (c.name.to_string(), v))
            .collect();

        let mut tables = self.db.tables.write().await;
        for r in def.references {
            let target = (r.target)();
            if let Some(fk) = row.get(r.column).filter(|v| !v.is_null()) {
                let found = RowKey::from_json(fk).is_some_and(|k| tables.get(target, &k).is_some());
                if !found {
                    return Err(AppError::BadRequest(format!(
                        "{} references unknown {} {}",
                        E::ENTITY_NAME,
                        target.table,
                        fk
                    )));
                }
            }
        }

        let id = match entity.id() {
            Some(id) => id.clone(),
            None => <E::Id as SequenceKey>::from_sequence(self.db.next_key()),
        };
        let key = Self::row_key(&id)?;
        row.insert(def.key.name.to_string(), key_json::<E>(&id)?);
        tracing::debug!(entity = E::ENTITY_NAME, %id, "memory save");
        tables.0.entry(def.table).or_default().insert(key.clone(), row);

        let saved = tables
            .get(def, &key)
            .map(|row| tables.record_json(def, &key, row))
            .ok_or(AppError::Db(sqlx::Error::RowNotFound))?;
        decode_record(saved)
    }

    async fn delete_by_id(&self, id: &E::Id) -> Result<(), AppError> {
        let def = E::table();
        let key = Self::row_key(id)?;
        let mut tables = self.db.tables.write().await;
        let removed = tables.0.get_mut(def.table).and_then(|t| t.remove(&key));
        if removed.is_none() {
            return Ok(());
        }
        tracing::debug!(entity = E::ENTITY_NAME, %id, "memory delete");
        for child in all_tables() {
            for r in child.references.iter().filter(|r| (r.target)().table == def.table) {
                for row in tables.0.get_mut(child.table).into_iter().flat_map(|t| t.values_mut()) {
                    if row.get(r.column).and_then(RowKey::from_json).as_ref() == Some(&key) {
                        row.insert(r.column.to_string(), Value::Null);
                    }
                }
            }
        }
        Ok(())
    }
}
