//! ClawIQ query layer - routes telemetry queries to the endpoint that can
//! answer them, refines results the service could not filter, aggregates
//! annotations into markers and merges everything into one timeline.

pub mod backend;
pub mod client;
pub mod error;
pub mod filters;
pub mod markers;
pub mod pagination;
pub mod routing;
pub mod time;
pub mod timeline;
pub mod transforms;

pub use backend::TelemetryBackend;
pub use client::{ClientError, TelemetryClient};
pub use error::QueryError;
pub use filters::{
    ErrorFilters, SemanticFilters, SpanEventFilters, TimelineFilters, TraceFilters,
};
pub use markers::{fetch_markers, MARKER_BATCH_SIZE, MARKER_EVENT_CAP};
pub use pagination::{compute_page_info, PageInfo, PageRequest, DEFAULT_PAGE_LIMIT};
pub use routing::{
    fetch_error_records, fetch_semantic_events, fetch_span_events, fetch_trace_records,
};
pub use time::{resolve_time_range, resolve_time_range_at, TimeRange, DEFAULT_SINCE};
pub use timeline::{build_timeline, merge_timeline, merge_window};
