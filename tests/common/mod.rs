// Shared fixtures: an in-memory telemetry backend that records every call.
#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use clawiq::query::ClientError;
use clawiq::{
    ErrorRecord, ErrorSummary, ErrorsQuery, ErrorsResponse, EventsQuery, EventsResponse,
    SemanticEvent, SemanticEventsResponse, SemanticQuery, SpanEvent, TelemetryBackend, TimeRange,
    TraceRecord, TracesQuery, TracesResponse,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Traces(TracesQuery),
    Errors(ErrorsQuery),
    Events(EventsQuery),
    Semantic(SemanticQuery),
}

/// Serves canned records newest first, honouring `limit` / `offset` the way
/// the real service does.
#[derive(Default)]
pub struct FakeBackend {
    pub traces: Vec<TraceRecord>,
    pub traces_total: u64,
    pub errors: Vec<ErrorRecord>,
    pub events: Vec<SpanEvent>,
    pub events_total: u64,
    pub semantic: Vec<SemanticEvent>,
    pub calls: Mutex<Vec<Call>>,
}

impl FakeBackend {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

fn page<T: Clone>(items: &[T], offset: usize, limit: usize) -> Vec<T> {
    items.iter().skip(offset).take(limit).cloned().collect()
}

#[async_trait]
impl TelemetryBackend for FakeBackend {
    async fn get_traces(&self, query: &TracesQuery) -> Result<TracesResponse, ClientError> {
        self.record(Call::Traces(query.clone()));
        Ok(TracesResponse {
            traces: page(&self.traces, query.offset, query.limit),
            total: self.traces_total,
        })
    }

    async fn get_errors(&self, query: &ErrorsQuery) -> Result<ErrorsResponse, ClientError> {
        self.record(Call::Errors(query.clone()));
        let errors = page(&self.errors, query.offset, query.effective_limit());
        let summary = ErrorSummary::of(&errors);
        Ok(ErrorsResponse { errors, summary })
    }

    async fn get_events(&self, query: &EventsQuery) -> Result<EventsResponse, ClientError> {
        self.record(Call::Events(query.clone()));
        Ok(EventsResponse {
            events: page(&self.events, query.offset, query.limit),
            total: self.events_total,
            filters: None,
        })
    }

    async fn get_semantic_events(
        &self,
        query: &SemanticQuery,
    ) -> Result<SemanticEventsResponse, ClientError> {
        self.record(Call::Semantic(query.clone()));
        Ok(SemanticEventsResponse {
            events: page(&self.semantic, query.offset, query.limit),
            total: self.semantic.len() as u64,
            filters: None,
        })
    }
}

pub fn at(hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, hour, minute, second).unwrap()
}

pub fn day_range() -> TimeRange {
    TimeRange {
        start: Utc.with_ymd_and_hms(2024, 4, 30, 13, 0, 0).unwrap(),
        end: at(13, 0, 0),
    }
}

pub fn trace(id: &str, start_time: DateTime<Utc>, status: &str) -> TraceRecord {
    TraceRecord {
        trace_id: id.to_string(),
        start_time,
        duration_ms: 420.0,
        channel: "imessage".into(),
        model: "claude-sonnet".into(),
        session_id: Some("agent:main:imessage:1".into()),
        agent_id: None,
        tokens_input: 100,
        tokens_output: 50,
        status: status.to_string(),
        error: None,
    }
}

pub fn error(trace_id: &str, timestamp: DateTime<Utc>, error_type: &str) -> ErrorRecord {
    ErrorRecord {
        timestamp,
        trace_id: trace_id.to_string(),
        channel: "imessage".into(),
        error_type: error_type.to_string(),
        message: format!("{error_type} while replying"),
        session_id: Some("agent:main:imessage:1".into()),
        agent_id: None,
        model: Some("claude-sonnet".into()),
    }
}

pub fn span(trace_id: &str, start_time: DateTime<Utc>, session_id: &str) -> SpanEvent {
    SpanEvent {
        trace_id: trace_id.to_string(),
        span_id: format!("{trace_id}-root"),
        name: "agent.turn".into(),
        start_time,
        duration_ms: 250.0,
        status_code: "STATUS_CODE_OK".into(),
        channel: "slack".into(),
        model: "claude-haiku".into(),
        provider: "anthropic".into(),
        session_id: session_id.to_string(),
        agent_id: String::new(),
        tokens_input: 10,
        tokens_output: 5,
        tokens_cache_read: 0,
        tokens_cache_write: 0,
        tokens_total: 15,
        cost_usd: 0.001,
        error_type: String::new(),
        outcome: "replied".into(),
    }
}

pub fn annotation(timestamp: DateTime<Utc>, name: &str, severity: &str) -> SemanticEvent {
    SemanticEvent {
        id: format!("ann-{}", timestamp.timestamp()),
        timestamp,
        source: "agent".into(),
        event_type: "task".into(),
        name: name.to_string(),
        severity: severity.to_string(),
        agent_id: Some("main".into()),
        session_id: None,
        channel: None,
        target: None,
        quality_tags: None,
        action_tags: None,
        domain_tags: None,
        meta: None,
    }
}
