use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use clawiq_protocol::telemetry::{ErrorRecord, SemanticEvent, SpanEvent, TraceRecord};
use clawiq_protocol::timeline::Marker;

const BUCKET_SECONDS: i64 = 5 * 60;

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Reshapes a generic span event into the trace record shape.
pub fn to_trace_record(event: SpanEvent) -> TraceRecord {
    TraceRecord {
        trace_id: event.trace_id,
        start_time: event.start_time,
        duration_ms: event.duration_ms,
        channel: event.channel,
        model: event.model,
        session_id: Some(event.session_id),
        agent_id: non_empty(event.agent_id),
        tokens_input: event.tokens_input,
        tokens_output: event.tokens_output,
        status: event.status_code,
        error: non_empty(event.error_type),
    }
}

/// Reshapes a generic span event into the error record shape.
pub fn to_error_record(event: SpanEvent) -> ErrorRecord {
    let message = if event.error_type.is_empty() {
        event.status_code
    } else {
        event.error_type.clone()
    };
    let error_type = non_empty(event.error_type).unwrap_or_else(|| "unknown".to_string());

    ErrorRecord {
        timestamp: event.start_time,
        trace_id: event.trace_id,
        channel: event.channel,
        error_type,
        message,
        session_id: Some(event.session_id),
        agent_id: non_empty(event.agent_id),
        model: Some(event.model),
    }
}

/// Floors an instant to its 5-minute UTC bucket.
pub fn bucket_start(instant: DateTime<Utc>) -> DateTime<Utc> {
    // at most five minutes back, so the result stays in range
    let into_bucket = Duration::seconds(instant.timestamp().rem_euclid(BUCKET_SECONDS))
        + Duration::nanoseconds(i64::from(instant.timestamp_subsec_nanos()));
    instant - into_bucket
}

/// Counts semantic events per (bucket, type, name, severity).
///
/// Newest bucket first; inside a bucket the larger count wins and equal
/// counts keep first-seen order.
pub fn build_markers(events: &[SemanticEvent]) -> Vec<Marker> {
    let mut index: HashMap<(DateTime<Utc>, &str, &str, &str), usize> = HashMap::new();
    let mut markers: Vec<Marker> = Vec::new();

    for event in events {
        let bucket = bucket_start(event.timestamp);
        let key = (
            bucket,
            event.event_type.as_str(),
            event.name.as_str(),
            event.severity.as_str(),
        );
        match index.get(&key) {
            Some(&position) => markers[position].count += 1,
            None => {
                index.insert(key, markers.len());
                markers.push(Marker {
                    timestamp: bucket,
                    event_type: event.event_type.clone(),
                    name: event.name.clone(),
                    severity: event.severity.clone(),
                    count: 1,
                });
            }
        }
    }

    markers.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| b.count.cmp(&a.count))
    });
    markers
}
