use crate::auth::SessionStore;
use crate::config::AppConfig;
use crate::db::Database;

/// Shared server state. The database and the session table each guard
/// themselves with a mutex, so handlers only ever take `&self`.
pub struct AppState {
    pub db: Database,
    pub sessions: SessionStore,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(db: Database, config: AppConfig) -> Self {
        Self {
            sessions: SessionStore::from_config(&config.auth),
            db,
            config,
        }
    }

    /// Migrated in-memory database with the bootstrap admin and a cheap hash cost.
    #[cfg(test)]
    pub fn new_in_memory() -> Self {
        let config = AppConfig::default();
        let db = Database::open_in_memory()
            .expect("in-memory database")
            .with_hash_cost(4);
        db.bootstrap_admin(
            &config.auth.bootstrap_admin_email,
            &config.auth.bootstrap_admin_password,
        )
        .expect("bootstrap admin");
        Self::new(db, config)
    }
}
