use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("Pagination error at {url}: {message}")]
    Pagination { url: String, message: String },

    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error("Database not initialized (missing table '{missing}'). Run `update` first to populate data.")]
    SchemaNotInitialized { missing: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Update interrupted before completion")]
    Interrupted,
}

impl AppError {
    pub fn fetch(url: impl Into<String>, message: impl std::fmt::Display) -> Self {
        AppError::Fetch {
            url: url.into(),
            message: message.to_string(),
        }
    }

    pub fn pagination(url: impl Into<String>, message: impl std::fmt::Display) -> Self {
        AppError::Pagination {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Errors that end a single category walk but leave the rest of an update running.
    pub fn is_walk_failure(&self) -> bool {
        matches!(self, AppError::Fetch { .. } | AppError::Pagination { .. })
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
