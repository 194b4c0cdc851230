use clawiq_protocol::prelude::*;
use tracing::info;

use crate::backend::TelemetryBackend;
use crate::error::QueryError;
use crate::filters::{agent_from_session, simplify_status, TimelineFilters};
use crate::markers::fetch_markers;
use crate::pagination::PageInfo;
use crate::routing::{fetch_error_records, fetch_trace_records};
use crate::time::TimeRange;

/// Rows each source must return for the merged page to be correct.
pub fn merge_window(page: &PageInfo) -> usize {
    page.end().max(page.limit)
}

/// Fetches traces, errors and markers concurrently and merges them into one
/// page ordered newest first.
pub async fn merge_timeline<B>(
    backend: &B,
    filters: &TimelineFilters,
    range: &TimeRange,
    page: &PageInfo,
) -> Result<TimelinePage, QueryError>
where
    B: TelemetryBackend + ?Sized,
{
    let window = merge_window(page);
    let trace_filters = filters.trace_filters();
    let error_filters = filters.error_filters();
    let marker_filters = filters.marker_filters();

    let (traces, errors, markers) = tokio::try_join!(
        fetch_trace_records(backend, &trace_filters, range, window, 0),
        fetch_error_records(backend, &error_filters, range, window, 0),
        fetch_markers(backend, &marker_filters, range),
    )?;

    let timeline = build_timeline(traces.records, errors.records, markers, page, window);
    info!(
        items = timeline.items.len(),
        merged = timeline.scanned.merged,
        has_more = timeline.has_more,
        "timeline merged"
    );
    Ok(timeline)
}

/// Merges already fetched records. `window` is the row count each router
/// was asked for; a source that filled it may have more rows.
pub fn build_timeline(
    traces: Vec<TraceRecord>,
    errors: Vec<ErrorRecord>,
    markers: Vec<Marker>,
    page: &PageInfo,
    window: usize,
) -> TimelinePage {
    let source_truncated = traces.len() == window || errors.len() == window;
    let scanned_traces = traces.len();
    let scanned_errors = errors.len();
    let scanned_markers = markers.len();

    let mut merged: Vec<TimelineItem> =
        Vec::with_capacity(scanned_traces + scanned_errors + scanned_markers);
    merged.extend(traces.into_iter().map(trace_item));
    merged.extend(errors.into_iter().map(error_item));
    merged.extend(markers.into_iter().map(marker_item));

    // stable: equal timestamps keep trace, error, marker order
    merged.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let merged_len = merged.len();
    let has_more = source_truncated || merged_len > page.end();
    let total = if source_truncated {
        Total::Unknown
    } else {
        Total::Exact(merged_len as u64)
    };

    TimelinePage {
        items: page.slice(&merged).to_vec(),
        total,
        has_more,
        scanned: ScanCounts {
            traces: scanned_traces,
            errors: scanned_errors,
            markers: scanned_markers,
            merged: merged_len,
        },
    }
}

fn derive_agent(agent_id: Option<String>, session_id: Option<&str>) -> Option<String> {
    agent_id
        .filter(|agent| !agent.is_empty())
        .or_else(|| {
            session_id
                .filter(|session| !session.is_empty())
                .map(|session| agent_from_session(session).to_string())
        })
}

fn trace_item(trace: TraceRecord) -> TimelineItem {
    let model = if trace.model.is_empty() { "-" } else { trace.model.as_str() };
    let summary = format!(
        "{} {} {}ms",
        simplify_status(&trace.status),
        model,
        trace.duration_ms.round()
    );
    let agent = derive_agent(trace.agent_id, trace.session_id.as_deref());

    TimelineItem {
        kind: TimelineKind::Trace,
        timestamp: trace.start_time,
        summary,
        trace_id: Some(trace.trace_id),
        channel: Some(trace.channel),
        model: Some(trace.model),
        agent,
        severity: None,
    }
}

fn error_item(error: ErrorRecord) -> TimelineItem {
    let summary = if error.message.is_empty() {
        error.error_type.clone()
    } else {
        format!("{}: {}", error.error_type, error.message)
    };
    let agent = derive_agent(error.agent_id, error.session_id.as_deref());

    TimelineItem {
        kind: TimelineKind::Error,
        timestamp: error.timestamp,
        summary,
        trace_id: Some(error.trace_id),
        channel: Some(error.channel),
        model: error.model,
        agent,
        severity: Some("error".to_string()),
    }
}

fn marker_item(marker: Marker) -> TimelineItem {
    TimelineItem {
        kind: TimelineKind::Marker,
        timestamp: marker.timestamp,
        summary: format!(
            "{} {}:{} x{}",
            marker.severity, marker.event_type, marker.name, marker.count
        ),
        trace_id: None,
        channel: None,
        model: None,
        agent: None,
        severity: Some(marker.severity),
    }
}
