//! SQLite persistence.
//!
//! [`Database`] owns a single connection behind a mutex. Repository methods
//! live in per-entity submodules; each public method takes the lock once and
//! hands the connection to private `*_in` helpers, so helpers can be composed
//! inside one SQL transaction.

mod backup;
mod contacts;
mod expenses;
mod inventory;
mod sales;
pub mod schema;
mod sql_types;
mod transactions;
mod users;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::Connection;
use serde::Serialize;

use crate::error::KayuError;

/// Handle to the application database.
pub struct Database {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
    hash_cost: u32,
}

/// Result of a liveness probe.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub healthy: bool,
    pub status: String,
    pub database: String,
}

/// Where the database lives.
#[derive(Debug, Clone, Serialize)]
pub struct DatabaseInfo {
    pub engine: String,
    pub path: Option<String>,
    pub in_memory: bool,
    pub schema_version: i32,
}

impl Database {
    /// Open (creating if needed) the database file at `path` and migrate it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, KayuError> {
        let path = path.as_ref();
        tracing::info!("Opening database at {}", path.display());
        let conn = Connection::open(path)?;
        Self::init(conn, Some(path.to_path_buf()))
    }

    /// Fresh private database, used by tests and previews.
    pub fn open_in_memory() -> Result<Self, KayuError> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn, None)
    }

    fn init(conn: Connection, path: Option<PathBuf>) -> Result<Self, KayuError> {
        schema::migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path,
            hash_cost: bcrypt::DEFAULT_COST,
        })
    }

    /// Override the bcrypt work factor (minimum 4). Lower values only make
    /// sense in tests.
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost.max(4);
        self
    }

    pub(crate) fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    /// Re-run the idempotent schema migration.
    pub fn migrate(&self) -> Result<(), KayuError> {
        schema::migrate(&self.conn())
    }

    /// Runs `SELECT 1` against the connection.
    pub fn health_check(&self) -> HealthStatus {
        let result: rusqlite::Result<i64> =
            self.conn().query_row("SELECT 1", [], |row| row.get(0));
        match result {
            Ok(_) => HealthStatus {
                healthy: true,
                status: "healthy".to_string(),
                database: "connected".to_string(),
            },
            Err(e) => {
                tracing::error!("Database health check failed: {e}");
                HealthStatus {
                    healthy: false,
                    status: "unhealthy".to_string(),
                    database: e.to_string(),
                }
            }
        }
    }

    pub fn info(&self) -> Result<DatabaseInfo, KayuError> {
        let schema_version: i32 =
            self.conn()
                .query_row("PRAGMA user_version", [], |row| row.get(0))?;
        Ok(DatabaseInfo {
            engine: format!("sqlite {}", rusqlite::version()),
            path: self.path.as_ref().map(|p| p.display().to_string()),
            in_memory: self.path.is_none(),
            schema_version,
        })
    }
}

/// Map "no rows" to a `NotFound` naming the missing record.
pub(crate) fn not_found(
    what: &'static str,
    id: uuid::Uuid,
) -> impl FnOnce(rusqlite::Error) -> KayuError {
    move |e| match e {
        rusqlite::Error::QueryReturnedNoRows => {
            KayuError::NotFound(format!("{what} {id} not found"))
        }
        other => KayuError::Database(other),
    }
}

#[cfg(test)]
pub(crate) fn test_db() -> Database {
    Database::open_in_memory()
        .expect("in-memory database")
        .with_hash_cost(4)
}
