//! Picks the endpoint that can answer a query and reconciles what the
//! service returns with the filters it could not apply.

use clawiq_protocol::prelude::*;
use tracing::debug;

use crate::backend::TelemetryBackend;
use crate::error::QueryError;
use crate::filters::{
    contains_insensitive, present, refine_span_events, server_search, simplify_status,
    ErrorFilters, SemanticFilters, SpanEventFilters, TraceFilters,
};
use crate::time::TimeRange;
use crate::transforms::{to_error_record, to_trace_record};

fn owned(value: Option<&str>) -> Option<String> {
    value.map(str::to_string)
}

/// Pulls one page of traces.
pub async fn fetch_trace_records<B>(
    backend: &B,
    filters: &TraceFilters,
    range: &TimeRange,
    limit: usize,
    offset: usize,
) -> Result<QueryResult<TraceRecord>, QueryError>
where
    B: TelemetryBackend + ?Sized,
{
    let mut result = if filters.needs_event_fallback() {
        debug!(limit, offset, "routing trace query through generic events");
        let agent = present(&filters.agent);
        let search = present(&filters.search);
        let query = EventsQuery {
            since: range.start,
            until: range.end,
            channel: owned(present(&filters.channel)),
            model: owned(present(&filters.model)),
            status: owned(present(&filters.status)),
            session: owned(present(&filters.session)),
            search: server_search(agent, search),
            limit,
            offset,
        };
        let response = backend.get_events(&query).await?;
        let mut events = response.events;
        let refined = refine_span_events(&mut events, agent, search);
        let total = if refined {
            Total::Unknown
        } else {
            Total::Exact(response.total)
        };
        QueryResult::new(events.into_iter().map(to_trace_record).collect(), total)
    } else {
        debug!(limit, offset, "routing trace query to the traces endpoint");
        let status = present(&filters.status).map(|status| match status {
            "error" => "STATUS_CODE_ERROR".to_string(),
            other => other.to_string(),
        });
        let query = TracesQuery {
            since: range.start,
            until: range.end,
            channel: owned(present(&filters.channel)),
            status,
            limit,
            offset,
        };
        let response = backend.get_traces(&query).await?;
        QueryResult::new(response.traces, Total::Exact(response.total))
    };

    for trace in &mut result.records {
        trace.status = simplify_status(&trace.status).to_string();
    }

    Ok(result)
}

/// Pulls one page of errors. The total is only exact when it came from the
/// events endpoint and no client-side pass removed records.
pub async fn fetch_error_records<B>(
    backend: &B,
    filters: &ErrorFilters,
    range: &TimeRange,
    limit: usize,
    offset: usize,
) -> Result<QueryResult<ErrorRecord>, QueryError>
where
    B: TelemetryBackend + ?Sized,
{
    let error_type = present(&filters.error_type);
    let trace_id = present(&filters.trace_id);

    let mut result = if filters.needs_event_fallback() {
        debug!(limit, offset, "routing error query through generic events");
        let agent = present(&filters.agent);
        let search = present(&filters.search);
        let query = EventsQuery {
            since: range.start,
            until: range.end,
            channel: owned(present(&filters.channel)),
            model: owned(present(&filters.model)),
            status: Some("error".to_string()),
            session: owned(present(&filters.session)),
            search: server_search(agent, search),
            limit,
            offset,
        };
        let response = backend.get_events(&query).await?;
        let mut events = response.events;
        let refined = refine_span_events(&mut events, agent, search);
        let total = if refined {
            Total::Unknown
        } else {
            Total::Exact(response.total)
        };
        QueryResult::new(events.into_iter().map(to_error_record).collect(), total)
    } else {
        debug!(limit, offset, "routing error query to the errors endpoint");
        let query = ErrorsQuery {
            since: range.start,
            until: range.end,
            channel: owned(present(&filters.channel)),
            error_type: owned(error_type),
            trace_id: owned(trace_id),
            limit,
            offset,
        };
        let response = backend.get_errors(&query).await?;
        // summary.total from this endpoint only counts the returned page
        QueryResult::new(response.errors, Total::Unknown)
    };

    if let Some(error_type) = error_type {
        result.retain(|error| error.error_type == error_type);
    }
    if let Some(trace_id) = trace_id {
        result.retain(|error| error.trace_id == trace_id);
    }

    Ok(result)
}

/// Pulls raw span events with the same agent/search refinement as the
/// fallback routes.
pub async fn fetch_span_events<B>(
    backend: &B,
    filters: &SpanEventFilters,
    range: &TimeRange,
    limit: usize,
    offset: usize,
) -> Result<QueryResult<SpanEvent>, QueryError>
where
    B: TelemetryBackend + ?Sized,
{
    let agent = present(&filters.agent);
    let search = present(&filters.search);
    let query = EventsQuery {
        since: range.start,
        until: range.end,
        channel: owned(present(&filters.channel)),
        model: owned(present(&filters.model)),
        status: owned(present(&filters.status)),
        session: owned(present(&filters.session)),
        search: server_search(agent, search),
        limit,
        offset,
    };

    let response = backend.get_events(&query).await?;
    let mut events = response.events;
    let total = if refine_span_events(&mut events, agent, search) {
        Total::Unknown
    } else {
        Total::Exact(response.total)
    };
    debug!(returned = events.len(), "span events fetched");

    Ok(QueryResult::new(events, total))
}

/// Pulls semantic events; the name filter runs locally.
pub async fn fetch_semantic_events<B>(
    backend: &B,
    filters: &SemanticFilters,
    range: &TimeRange,
    limit: usize,
    offset: usize,
) -> Result<QueryResult<SemanticEvent>, QueryError>
where
    B: TelemetryBackend + ?Sized,
{
    let query = semantic_query(filters, range, limit, offset);
    let response = backend.get_semantic_events(&query).await?;

    let mut result = QueryResult::new(response.events, Total::Exact(response.total));
    if let Some(name) = present(&filters.name) {
        result.retain(|event| contains_insensitive(&event.name, name));
    }

    Ok(result)
}

pub(crate) fn semantic_query(
    filters: &SemanticFilters,
    range: &TimeRange,
    limit: usize,
    offset: usize,
) -> SemanticQuery {
    SemanticQuery {
        since: range.start,
        until: range.end,
        source: owned(present(&filters.source)),
        event_type: owned(present(&filters.event_type)),
        severity: owned(present(&filters.severity)),
        agent: owned(present(&filters.agent)),
        limit,
        offset,
    }
}
