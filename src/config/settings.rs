//! Settings read from environment variables (after `.env` is loaded).

use crate::error::ConfigError;
use crate::response::DEFAULT_APP_NAME;
use regex::Regex;
use std::net::SocketAddr;
use std::time::Duration;

/// Which repository backend serves the entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub database_url: String,
    pub store: StoreKind,
    /// Schema holding the entity tables.
    pub schema: String,
    pub bind_addr: SocketAddr,
    /// Prefix of the `X-{app}-*` headers.
    pub app_name: String,
    pub db_max_connections: u32,
    /// Cached records per entity; 0 disables the cache.
    pub cache_capacity: u64,
    pub cache_ttl: Duration,
    pub max_body_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            database_url: "postgres://localhost/employee".into(),
            store: StoreKind::Postgres,
            schema: "public".into(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            app_name: DEFAULT_APP_NAME.into(),
            db_max_connections: 5,
            cache_capacity: 0,
            cache_ttl: Duration::from_secs(300),
            max_body_bytes: 1024 * 1024,
        }
    }
}

impl Settings {
    /// Loads `.env` (if present) into the environment, then reads it.
    pub fn load() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(ConfigError::Validation(format!(".env: {}", e)));
            }
        }
        Self::from_env()
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from any key lookup; unset or blank keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut s = Settings::default();

        if let Some(v) = get("DATABASE_URL") {
            s.database_url = v;
        }
        if let Some(v) = get("EMPLOYEE_STORE") {
            s.store = match v.to_ascii_lowercase().as_str() {
                "postgres" => StoreKind::Postgres,
                "memory" => StoreKind::Memory,
                _ => return Err(invalid("EMPLOYEE_STORE", format!("expected postgres or memory, got {}", v))),
            };
        }
        if let Some(v) = get("EMPLOYEE_SCHEMA") {
            s.schema = v;
        }
        if let Some(v) = get("BIND_ADDR") {
            s.bind_addr = v.parse().map_err(|e| invalid("BIND_ADDR", format!("{}: {}", v, e)))?;
        }
        if let Some(v) = get("APP_NAME") {
            s.app_name = v;
        }
        if let Some(v) = get("DB_MAX_CONNECTIONS") {
            s.db_max_connections = v.parse().map_err(|e| invalid("DB_MAX_CONNECTIONS", format!("{}: {}", v, e)))?;
        }
        if let Some(v) = get("CACHE_CAPACITY") {
            s.cache_capacity = v.parse().map_err(|e| invalid("CACHE_CAPACITY", format!("{}: {}", v, e)))?;
        }
        if let Some(v) = get("CACHE_TTL_SECS") {
            let secs: u64 = v.parse().map_err(|e| invalid("CACHE_TTL_SECS", format!("{}: {}", v, e)))?;
            s.cache_ttl = Duration::from_secs(secs);
        }
        if let Some(v) = get("MAX_BODY_BYTES") {
            s.max_body_bytes = v.parse().map_err(|e| invalid("MAX_BODY_BYTES", format!("{}: {}", v, e)))?;
        }
        s.validate()?;
        Ok(s)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let identifier = Regex::new(IDENTIFIER_PATTERN)
            .map_err(|e| ConfigError::Validation(format!("identifier pattern: {}", e)))?;
        if !identifier.is_match(&self.schema) {
            return Err(ConfigError::Validation(format!(
                "EMPLOYEE_SCHEMA must be a plain SQL identifier, got {}",
                self.schema
            )));
        }
        if !identifier.is_match(&self.app_name) {
            return Err(ConfigError::Validation(format!(
                "APP_NAME must contain only letters, digits and underscores, got {}",
                self.app_name
            )));
        }
        if self.db_max_connections == 0 {
            return Err(ConfigError::Validation("DB_MAX_CONNECTIONS must be at least 1".into()));
        }
        if self.cache_capacity > 0 && self.cache_ttl.is_zero() {
            return Err(ConfigError::Validation("CACHE_TTL_SECS must be positive when the cache is on".into()));
        }
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Validation("MAX_BODY_BYTES must be positive".into()));
        }
        Ok(())
    }
}

fn invalid(key: &'static str, message: String) -> ConfigError {
    ConfigError::Invalid { key, message }
}

/// Schema names and header prefixes: a letter or underscore, then word characters.
const IDENTIFIER_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]*$";

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Settings::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let s = settings(&[]).unwrap();
        assert_eq!(s.store, StoreKind::Postgres);
        assert_eq!(s.schema, "public");
        assert_eq!(s.app_name, "employeeApp");
        assert_eq!(s.bind_addr.port(), 8080);
        assert_eq!(s.cache_capacity, 0);
    }

    #[test]
    fn reads_overrides() {
        let s = settings(&[
            ("EMPLOYEE_STORE", "Memory"),
            ("EMPLOYEE_SCHEMA", "hr"),
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("CACHE_CAPACITY", "500"),
            ("CACHE_TTL_SECS", "30"),
            ("APP_NAME", " "),
        ])
        .unwrap();
        assert_eq!(s.store, StoreKind::Memory);
        assert_eq!(s.schema, "hr");
        assert_eq!(s.bind_addr.port(), 9000);
        assert_eq!(s.cache_capacity, 500);
        assert_eq!(s.cache_ttl, Duration::from_secs(30));
        assert_eq!(s.app_name, "employeeApp");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(settings(&[("EMPLOYEE_STORE", "mongo")]), Err(ConfigError::Invalid { key: "EMPLOYEE_STORE", .. })));
        assert!(matches!(settings(&[("DB_MAX_CONNECTIONS", "many")]), Err(ConfigError::Invalid { .. })));
        assert!(matches!(settings(&[("EMPLOYEE_SCHEMA", "hr; drop")]), Err(ConfigError::Validation(_))));
        assert!(matches!(settings(&[("DB_MAX_CONNECTIONS", "0")]), Err(ConfigError::Validation(_))));
    }
}
