//! Error types for the company profile orchestrator

use thiserror::Error;

/// Result type alias for profile operations
pub type Result<T> = std::result::Result<T, ProfileError>;

#[derive(Error, Debug)]
pub enum ProfileError {

    // =============================
    // Section Pipeline Errors
    // =============================

    #[error("Registry error: {0}")]
    RegistryError(String),

    #[error("Holdings error: {0}")]
    HoldingsError(String),

    #[error("Symbol lookup error: {0}")]
    SymbolLookupError(String),

    #[error("LLM error: {0}")]
    LlmError(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
