use thiserror::Error;

use crate::client::ClientError;

/// Errors raised while resolving, routing or merging a telemetry query.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("invalid time value \"{input}\": {reason}")]
    InvalidTimeValue { input: String, reason: String },
    #[error("`since` ({start}) must be earlier than `until` ({end})")]
    InvalidTimeRange { start: String, end: String },
    #[error("--{name} {reason}")]
    InvalidPageParameter {
        name: &'static str,
        reason: &'static str,
    },
    #[error(transparent)]
    Transport(#[from] ClientError),
}

impl QueryError {
    pub(crate) fn invalid_time(input: &str, reason: impl Into<String>) -> Self {
        QueryError::InvalidTimeValue {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}
