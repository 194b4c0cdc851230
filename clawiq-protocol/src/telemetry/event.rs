use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw span-level record returned by the generic events endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanEvent {
    #[serde(default)]
    pub trace_id: String,
    #[serde(default)]
    pub span_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(serialize_with = "crate::timestamp::serialize")]
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub duration_ms: f64,
    #[serde(default)]
    pub status_code: String,
    #[serde(default)]
    pub channel: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub agent_id: String,
    #[serde(default)]
    pub tokens_input: u64,
    #[serde(default)]
    pub tokens_output: u64,
    #[serde(default)]
    pub tokens_cache_read: u64,
    #[serde(default)]
    pub tokens_cache_write: u64,
    #[serde(default)]
    pub tokens_total: u64,
    #[serde(default)]
    pub cost_usd: f64,
    #[serde(default)]
    pub error_type: String,
    #[serde(default)]
    pub outcome: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventFilterOptions {
    #[serde(default)]
    pub channels: Vec<String>,
    #[serde(default)]
    pub models: Vec<String>,
    #[serde(default)]
    pub statuses: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsResponse {
    #[serde(default)]
    pub events: Vec<SpanEvent>,
    #[serde(default)]
    pub total: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<EventFilterOptions>,
}
