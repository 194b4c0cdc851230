//! ClawIQ: client-side query layer for the ClawIQ observability service.
//!
//! The workspace is split into a few crates:
//!
//! * `clawiq-core`: configuration, logging setup and the shared error type
//! * `clawiq-protocol`: wire records, query parameters and timeline views
//! * `clawiq-query`: routing, client-side refinement, marker aggregation,
//!   timeline merging and the HTTP client
//! * `clawiq-cli`: the `clawiq` binary
//!
//! This crate re-exports the public surface so callers can depend on one
//! package.

pub use clawiq_protocol as protocol;
pub use clawiq_query as query;

pub use clawiq_core::logging::init_tracing;
pub use clawiq_core::{ClawIqError, ClientConfig, ConfigError};
pub use clawiq_protocol::prelude::*;
pub use clawiq_query::{
    compute_page_info, fetch_error_records, fetch_markers, fetch_semantic_events,
    fetch_span_events, fetch_trace_records, merge_timeline, resolve_time_range, ClientError,
    ErrorFilters, PageInfo, PageRequest, QueryError, SemanticFilters, SpanEventFilters,
    TelemetryBackend, TelemetryClient, TimeRange, TimelineFilters, TraceFilters,
};
