use chrono::{DateTime, Utc};
use serde::Serialize;

/// Count of semantic events sharing one 5-minute bucket, type, name and severity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Marker {
    /// Start of the bucket.
    #[serde(serialize_with = "crate::timestamp::serialize")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub event_type: String,
    pub name: String,
    pub severity: String,
    pub count: u64,
}
