//! Creates the entity tables from their descriptors. Idempotent: every
//! statement is `IF NOT EXISTS`, so it runs on each start.

use crate::error::AppError;
use crate::model::table::all_tables;
use crate::model::{SqlType, TableDef, SEQUENCE_START};
use crate::sql::{qualified_table, quoted};
use sqlx::PgPool;

/// Sequence every entity key is drawn from.
pub const SEQUENCE_NAME: &str = "sequence_generator";

fn key_default(schema: &str, def: &TableDef) -> String {
    let next = format!("nextval('{}')", qualified_table(schema, SEQUENCE_NAME).replace('\'', "''"));
    match def.key.sql_type {
        SqlType::Text => format!("{}::text", next),
        _ => next,
    }
}

fn create_table(schema: &str, def: &TableDef) -> String {
    let mut cols = vec![format!(
        "{} {} PRIMARY KEY DEFAULT {}",
        quoted(def.key.name),
        def.key.sql_type.as_sql(),
        key_default(schema, def)
    )];
    for c in def.columns {
        cols.push(format!("{} {}", quoted(c.name), c.sql_type.as_sql()));
    }
    for r in def.references {
        let target = (r.target)();
        cols.push(format!(
            "{} {} REFERENCES {} ({}) ON DELETE SET NULL",
            quoted(r.column),
            target.key.sql_type.as_sql(),
            qualified_table(schema, target.table),
            quoted(target.key.name)
        ));
    }
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        qualified_table(schema, def.table),
        cols.join(", ")
    )
}

/// Statements creating `schema`, the key sequence and every entity table, in order.
pub fn schema_ddl(schema: &str) -> Vec<String> {
    let mut out = vec![
        format!("CREATE SCHEMA IF NOT EXISTS {}", quoted(schema)),
        format!(
            "CREATE SEQUENCE IF NOT EXISTS {} START WITH {} INCREMENT BY 1",
            qualified_table(schema, SEQUENCE_NAME),
            SEQUENCE_START
        ),
    ];
    out.extend(all_tables().iter().map(|def| create_table(schema, def)));
    out
}

pub async fn ensure_schema(pool: &PgPool, schema: &str) -> Result<(), AppError> {
    for sql in schema_ddl(schema) {
        tracing::debug!(sql = %sql, "ddl");
        sqlx::query(&sql).execute(pool).await?;
    }
    tracing::info!(schema = %schema, "entity tables ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_precedes_tables() {
        let ddl = schema_ddl("public");
        assert_eq!(ddl[0], "CREATE SCHEMA IF NOT EXISTS \"public\"");
        assert_eq!(
            ddl[1],
            "CREATE SEQUENCE IF NOT EXISTS \"public\".\"sequence_generator\" START WITH 1050 INCREMENT BY 1"
        );
        assert_eq!(ddl.len(), 9);
        assert!(ddl[2].starts_with("CREATE TABLE IF NOT EXISTS \"public\".\"region\""));
    }

    #[test]
    fn job_key_is_text_from_sequence() {
        let ddl = schema_ddl("hr");
        let job = ddl.iter().find(|s| s.contains("\"hr\".\"job\" (")).unwrap();
        assert!(job.contains(
            "\"job_id\" text PRIMARY KEY DEFAULT nextval('\"hr\".\"sequence_generator\"')::text"
        ));
    }

    #[test]
    fn references_become_foreign_keys() {
        let ddl = schema_ddl("public");
        let employee = ddl.iter().find(|s| s.contains("\"public\".\"employee\" (")).unwrap();
        assert!(employee.contains(
            "\"manager_id\" bigint REFERENCES \"public\".\"employee\" (\"employee_id\") ON DELETE SET NULL"
        ));
        assert!(employee.contains(
            "\"job_id\" text REFERENCES \"public\".\"job\" (\"job_id\") ON DELETE SET NULL"
        ));
    }
}
