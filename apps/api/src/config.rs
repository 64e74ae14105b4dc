use anyhow::{bail, Context, Result};
use uuid::Uuid;

/// Demo-mode user that owns the seeded sample project.
pub const DEFAULT_DEMO_USER_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0123);

/// Which `ProjectStore` implementation backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl StoreBackend {
    fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" | "demo" => Ok(StoreBackend::Memory),
            other => bail!("STORE_BACKEND must be 'postgres' or 'memory', got '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if a variable required by the selected backend is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    /// Absent key selects the offline mock assistant.
    pub anthropic_api_key: Option<String>,
    pub demo_user_id: Uuid,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let store_backend = match lookup("STORE_BACKEND") {
            Some(raw) => StoreBackend::parse(&raw)?,
            None => StoreBackend::Postgres,
        };

        let database_url = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty());
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            bail!("Required environment variable 'DATABASE_URL' is not set");
        }

        let demo_user_id = match lookup("DEMO_USER_ID") {
            Some(raw) => Uuid::parse_str(raw.trim()).context("DEMO_USER_ID must be a UUID")?,
            None => DEFAULT_DEMO_USER_ID,
        };

        Ok(Config {
            store_backend,
            database_url,
            anthropic_api_key: lookup("ANTHROPIC_API_KEY").filter(|v| !v.trim().is_empty()),
            demo_user_id,
            port: lookup("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_postgres_requires_database_url() {
        assert!(config(&[]).is_err());
        let cfg = config(&[("DATABASE_URL", "postgres://localhost/folio")]).unwrap();
        assert_eq!(cfg.store_backend, StoreBackend::Postgres);
        assert_eq!(cfg.port, 8080);
        assert!(cfg.anthropic_api_key.is_none());
    }

    #[test]
    fn test_memory_backend_needs_nothing_else() {
        let cfg = config(&[("STORE_BACKEND", "memory")]).unwrap();
        assert_eq!(cfg.store_backend, StoreBackend::Memory);
        assert_eq!(cfg.demo_user_id, DEFAULT_DEMO_USER_ID);
        assert_eq!(cfg.rust_log, "info");
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(config(&[("STORE_BACKEND", "redis")]).is_err());
        assert!(config(&[("STORE_BACKEND", "memory"), ("PORT", "http")]).is_err());
        assert!(config(&[("STORE_BACKEND", "memory"), ("DEMO_USER_ID", "demo-user-123")]).is_err());
    }

    #[test]
    fn test_blank_api_key_means_mock() {
        let cfg = config(&[("STORE_BACKEND", "memory"), ("ANTHROPIC_API_KEY", " ")]).unwrap();
        assert!(cfg.anthropic_api_key.is_none());
    }
}
