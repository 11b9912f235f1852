pub mod analysis;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod io;
pub mod models;
pub mod visualization;

#[cfg(feature = "web")]
pub mod web;

pub use analysis::Reporter;
pub use auth::SessionStore;
pub use config::AppConfig;
pub use db::Database;
pub use error::KayuError;
pub use io::{reader_for, LogSheetReader};
pub use models::{WoodLogMeasurement, WoodLogValuation};
