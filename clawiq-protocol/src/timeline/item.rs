use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::result::Total;

/// Source a timeline item was built from.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TimelineKind {
    Trace,
    Error,
    Marker,
}

impl TimelineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimelineKind::Trace => "trace",
            TimelineKind::Error => "error",
            TimelineKind::Marker => "marker",
        }
    }
}

/// Trace, error or marker normalised into one display shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineItem {
    pub kind: TimelineKind,
    #[serde(serialize_with = "crate::timestamp::serialize")]
    pub timestamp: DateTime<Utc>,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
}

/// How many records each source contributed before pagination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanCounts {
    pub traces: usize,
    pub errors: usize,
    pub markers: usize,
    pub merged: usize,
}

/// One page of the merged timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelinePage {
    pub items: Vec<TimelineItem>,
    pub total: Total,
    pub has_more: bool,
    pub scanned: ScanCounts,
}
