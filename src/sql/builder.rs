//! Builds parameterized SELECT, INSERT, UPSERT, DELETE and EXISTS from table descriptors.
//!
//! Reads return one JSON object per row (`row_to_json`), with columns aliased to
//! their JSON field names, many-to-one references as a nested object and
//! one-to-many collections as a nested array. Nested rows carry key and scalar
//! columns only.

use crate::model::{Column, TableDef};
use serde_json::Value;

const MAIN_ALIAS: &str = "main";

/// Quote identifier for PostgreSQL (safe: only from descriptors).
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Full qualified table name.
pub fn qualified_table(schema: &str, table: &str) -> String {
    format!("{}.{}", quoted(schema), quoted(table))
}

pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    /// Pushes a value and returns its placeholder, cast to the column type.
    fn push_param(&mut self, v: Value, column: &Column) -> String {
        self.params.push(v);
        format!("${}::{}", self.params.len(), column.sql_type.as_sql())
    }
}

/// Key and scalar columns of `def`, read through `alias` and named by JSON field.
fn scalar_select(def: &TableDef, alias: &str) -> String {
    def.scalar_columns()
        .map(|c| format!("{}.{} AS {}", alias, quoted(c.name), quoted(c.field)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Scalars plus one subquery per reference and per collection.
fn full_select(schema: &str, def: &TableDef) -> String {
    let mut parts = vec![scalar_select(def, MAIN_ALIAS)];
    for r in def.references {
        let target = (r.target)();
        parts.push(format!(
            "(SELECT row_to_json(sub) FROM (SELECT {} FROM {} t WHERE t.{} = {}.{}) sub) AS {}",
            scalar_select(target, "t"),
            qualified_table(schema, target.table),
            quoted(target.key.name),
            MAIN_ALIAS,
            quoted(r.column),
            quoted(r.field)
        ));
    }
    for c in def.collections {
        let target = (c.target)();
        parts.push(format!(
            "(SELECT COALESCE(json_agg(row_to_json(sub)), '[]'::json) FROM (SELECT {} FROM {} t WHERE t.{} = {}.{} ORDER BY t.{}) sub) AS {}",
            scalar_select(target, "t"),
            qualified_table(schema, target.table),
            quoted(c.foreign_key),
            MAIN_ALIAS,
            quoted(def.key.name),
            quoted(target.key.name),
            quoted(c.field)
        ));
    }
    parts.join(", ")
}

/// SELECT every row as JSON, ordered by key.
pub fn select_all(schema: &str, def: &TableDef) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "SELECT row_to_json(r) FROM (SELECT {} FROM {} {} ORDER BY {}.{}) r",
        full_select(schema, def),
        qualified_table(schema, def.table),
        MAIN_ALIAS,
        MAIN_ALIAS,
        quoted(def.key.name)
    );
    q
}

/// SELECT one row as JSON by key.
pub fn select_by_id(schema: &str, def: &TableDef, id: Value) -> QueryBuf {
    let mut q = QueryBuf::new();
    let ph = q.push_param(id, &def.key);
    q.sql = format!(
        "SELECT row_to_json(r) FROM (SELECT {} FROM {} {} WHERE {}.{} = {}) r",
        full_select(schema, def),
        qualified_table(schema, def.table),
        MAIN_ALIAS,
        MAIN_ALIAS,
        quoted(def.key.name),
        ph
    );
    q
}

/// SELECT EXISTS by key.
pub fn exists_by_id(schema: &str, def: &TableDef, id: Value) -> QueryBuf {
    let mut q = QueryBuf::new();
    let ph = q.push_param(id, &def.key);
    q.sql = format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE {} = {})",
        qualified_table(schema, def.table),
        quoted(def.key.name),
        ph
    );
    q
}

/// Values for every writable column of one record, taken from its JSON form:
/// scalars by field name, references by the key field of the nested object.
pub fn row_values(def: &TableDef, record: &Value) -> Vec<(Column, Value)> {
    let mut out = Vec::new();
    for c in def.columns {
        out.push((*c, record.get(c.field).cloned().unwrap_or(Value::Null)));
    }
    for r in def.references {
        let target = (r.target)();
        let fk = record
            .get(r.field)
            .and_then(|nested| nested.get(target.key.field))
            .cloned()
            .unwrap_or(Value::Null);
        out.push((Column::new(r.column, r.field, target.key.sql_type), fk));
    }
    out
}

/// INSERT without key (the column default draws from the sequence). Returns the key as text.
pub fn insert(schema: &str, def: &TableDef, values: Vec<(Column, Value)>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for (c, v) in values {
        placeholders.push(q.push_param(v, &c));
        cols.push(quoted(c.name));
    }
    let table = qualified_table(schema, def.table);
    let key = quoted(def.key.name);
    q.sql = if cols.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES RETURNING {}::text", table, key)
    } else {
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}::text",
            table,
            cols.join(", "),
            placeholders.join(", "),
            key
        )
    };
    q
}

/// INSERT with key; on key conflict every other column is overwritten. Returns the key as text.
pub fn upsert(schema: &str, def: &TableDef, id: Value, values: Vec<(Column, Value)>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let key = quoted(def.key.name);
    let mut cols = vec![key.clone()];
    let mut placeholders = vec![q.push_param(id, &def.key)];
    let mut sets = Vec::new();
    for (c, v) in values {
        placeholders.push(q.push_param(v, &c));
        let name = quoted(c.name);
        sets.push(format!("{} = EXCLUDED.{}", name, name));
        cols.push(name);
    }
    let conflict = if sets.is_empty() {
        "DO NOTHING".to_string()
    } else {
        format!("DO UPDATE SET {}", sets.join(", "))
    };
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT ({}) {} RETURNING {}::text",
        qualified_table(schema, def.table),
        cols.join(", "),
        placeholders.join(", "),
        key,
        conflict,
        key
    );
    q
}

/// DELETE by key.
pub fn delete(schema: &str, def: &TableDef, id: Value) -> QueryBuf {
    let mut q = QueryBuf::new();
    let ph = q.push_param(id, &def.key);
    q.sql = format!(
        "DELETE FROM {} WHERE {} = {}",
        qualified_table(schema, def.table),
        quoted(def.key.name),
        ph
    );
    q
}
