use thiserror::Error;

/// Result type used across the ClawIQ core crate.
pub type Result<T> = std::result::Result<T, ClawIqError>;

/// Canonical error representation shared by the ClawIQ crates.
#[derive(Debug, Error)]
pub enum ClawIqError {
    #[error("serialization error: {0}")]
    SerializationError(String),

    #[error("deserialization error: {0}")]
    DeserializationError(String),

    #[error("logging setup failed: {0}")]
    LoggingError(String),
}

/// Dedicated configuration error used by the configuration module.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "API key required. Set via:\n  --api-key flag\n  CLAWIQ_API_KEY environment variable\n  clawiq init"
    )]
    MissingApiKey,

    #[error("invalid value for environment variable {key}: {source}")]
    InvalidEnvVar {
        key: &'static str,
        #[source]
        source: std::env::VarError,
    },

    #[error("invalid endpoint {url}: {source}")]
    InvalidEndpoint {
        url: String,
        #[source]
        source: url::ParseError,
    },
}
