//! Static table descriptors: how each entity maps onto PostgreSQL.

/// Column types used by the entity tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SqlType {
    BigInt,
    Text,
    Date,
}

impl SqlType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SqlType::BigInt => "bigint",
            SqlType::Text => "text",
            SqlType::Date => "date",
        }
    }
}

/// A stored column and the JSON field it is exposed as.
#[derive(Clone, Copy, Debug)]
pub struct Column {
    pub name: &'static str,
    pub field: &'static str,
    pub sql_type: SqlType,
}

impl Column {
    pub const fn new(name: &'static str, field: &'static str, sql_type: SqlType) -> Self {
        Column { name, field, sql_type }
    }
}

/// Many-to-one: `column` holds the key of a row in `target`.
#[derive(Clone, Copy, Debug)]
pub struct Reference {
    pub field: &'static str,
    pub column: &'static str,
    pub target: fn() -> &'static TableDef,
}

/// One-to-many: rows of `target` whose `foreign_key` holds our key.
#[derive(Clone, Copy, Debug)]
pub struct Collection {
    pub field: &'static str,
    pub target: fn() -> &'static TableDef,
    pub foreign_key: &'static str,
}

#[derive(Debug)]
pub struct TableDef {
    pub table: &'static str,
    pub key: Column,
    pub columns: &'static [Column],
    pub references: &'static [Reference],
    pub collections: &'static [Collection],
}

impl TableDef {
    /// Key plus scalar columns, in declaration order.
    pub fn scalar_columns(&self) -> impl Iterator<Item = &Column> {
        std::iter::once(&self.key).chain(self.columns.iter())
    }
}

/// Every entity table, referenced tables before the tables referencing them.
pub fn all_tables() -> [&'static TableDef; 7] {
    use crate::model::*;
    [
        Region::table(),
        Country::table(),
        Location::table(),
        Department::table(),
        Job::table(),
        Employee::table(),
        JobHistory::table(),
    ]
}
