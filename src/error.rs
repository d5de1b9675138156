//! Error types for the discover core

use thiserror::Error;

/// Result type alias using the crate's Error
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid value for facet `{key}`: {value:?}")]
    InvalidFacet { key: String, value: String },

    #[error("Backend returned status {status}: {body}")]
    BackendStatus { status: u16, body: String },

    #[error("Malformed backend response: {message}")]
    MalformedResponse { message: String },

    #[error("Backend not configured: {message}")]
    NotConfigured { message: String },

    #[error("Request timed out after {millis}ms")]
    Timeout { millis: u64 },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl Error {
    pub(crate) fn invalid_facet(key: &str, value: &str) -> Self {
        Error::InvalidFacet {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}
