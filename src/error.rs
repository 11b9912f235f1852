use thiserror::Error;

/// Errors that can occur in the log-yard backend.
///
/// The valuation engine itself never produces these; they come from the
/// persistence, file, auth and validation layers around it.
#[derive(Error, Debug)]
pub enum KayuError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Excel error: {0}")]
    Excel(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Password hash error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl From<calamine::Error> for KayuError {
    fn from(e: calamine::Error) -> Self {
        KayuError::Excel(e.to_string())
    }
}

impl From<calamine::XlsxError> for KayuError {
    fn from(e: calamine::XlsxError) -> Self {
        KayuError::Excel(e.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for KayuError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        KayuError::Excel(e.to_string())
    }
}
