use std::sync::Arc;

/// Process configuration read once at startup (spec §4.6, SPEC_FULL.md A.4):
/// every value has an environment variable override and a sane default so
/// the server runs with zero configuration in development.
pub struct ServerConfig {
    pub port: u16,
    pub cors_origins: Vec<String>,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3001);
        let cors_origins = std::env::var("CORS_ORIGIN")
            .ok()
            .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or_default();
        Self { port, cors_origins }
    }

    /// Whether every origin should be allowed. Empty `CORS_ORIGIN` means no
    /// restriction was configured, matching the teacher's dev-mode default.
    pub fn allow_any_origin(&self) -> bool {
        self.cors_origins.is_empty()
    }
}

/// Builds the state store from `REDIS_URL`, degrading to the in-process
/// `MemoryStore` when unset or unparsable (spec §4.2).
pub fn build_store() -> Arc<dyn dg_store::StateStore> {
    match std::env::var("REDIS_URL") {
        Ok(dsn) => match dg_store::RedisStore::new(&dsn) {
            Ok(store) => {
                log::info!("using redis state store");
                Arc::new(store)
            }
            Err(e) => {
                log::warn!("failed to build redis store ({}), using in-process store", e);
                Arc::new(dg_store::MemoryStore::new())
            }
        },
        Err(_) => {
            log::info!("REDIS_URL not set, using in-process state store");
            Arc::new(dg_store::MemoryStore::new())
        }
    }
}
