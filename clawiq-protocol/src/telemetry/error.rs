use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One recorded failure, tied to the trace it happened in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    #[serde(serialize_with = "crate::timestamp::serialize")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub trace_id: String,
    #[serde(default)]
    pub channel: String,
    pub error_type: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorSummary {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub by_type: BTreeMap<String, u64>,
}

impl ErrorSummary {
    /// Summarises exactly the given records.
    pub fn of(errors: &[ErrorRecord]) -> Self {
        let mut by_type = BTreeMap::new();
        for error in errors {
            *by_type.entry(error.error_type.clone()).or_insert(0) += 1;
        }
        Self {
            total: errors.len() as u64,
            by_type,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorsResponse {
    #[serde(default)]
    pub errors: Vec<ErrorRecord>,
    #[serde(default)]
    pub summary: ErrorSummary,
}
