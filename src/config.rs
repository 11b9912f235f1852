use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::KayuError;

/// Config file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "kayulog.toml";

/// Application configuration. Every section and field has a default, so an
/// empty file (or none at all) is valid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub company: CompanyConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Maximum JSON body size in bytes.
    pub json_limit: usize,
    /// Allowed CORS origins. Empty means same-origin only.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            json_limit: 10 * 1024 * 1024,
            cors_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("kayulog.db"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyConfig {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub tax_id: String,
    pub currency: String,
    /// Multiplier on purchase unit price for suggested selling prices.
    pub markup: f64,
}

impl Default for CompanyConfig {
    fn default() -> Self {
        Self {
            name: "PT. Pengolahan Kayu Log".to_string(),
            address: String::new(),
            phone: String::new(),
            email: String::new(),
            tax_id: String::new(),
            currency: "IDR".to_string(),
            markup: crate::models::DEFAULT_MARKUP,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub session_ttl_secs: u64,
    pub max_sessions: usize,
    /// Account created when the users table is empty.
    pub bootstrap_admin_email: String,
    pub bootstrap_admin_password: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: 8 * 60 * 60,
            max_sessions: 500,
            bootstrap_admin_email: "admin@kayulog.com".to_string(),
            bootstrap_admin_password: "admin123".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(s: &str) -> Result<Self, KayuError> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read configuration from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, KayuError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from `path` if given, else from `kayulog.toml` if it exists, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, KayuError> {
        match path {
            Some(p) => Self::from_file(p),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn validate(&self) -> Result<(), KayuError> {
        if !self.company.markup.is_finite() || self.company.markup <= 0.0 {
            return Err(KayuError::ValidationError(format!(
                "company.markup must be positive, got {}",
                self.company.markup
            )));
        }
        if self.auth.session_ttl_secs == 0 {
            return Err(KayuError::ValidationError(
                "auth.session_ttl_secs must be greater than 0".to_string(),
            ));
        }
        if self.auth.max_sessions == 0 {
            return Err(KayuError::ValidationError(
                "auth.max_sessions must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
