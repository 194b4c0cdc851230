use chrono::{DateTime, Utc};

use crate::timestamp;

/// Query string parameters, in the order they are sent.
pub type QueryParameters = Vec<(&'static str, String)>;

/// Default page size the errors endpoint uses when none is requested.
pub const DEFAULT_ERRORS_LIMIT: usize = 100;

/// Parameters for the specialised `/v1/traces` endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct TracesQuery {
    pub since: DateTime<Utc>,
    pub until: DateTime<Utc>,
    pub channel: Option<String>,
    pub status: Option<String>,
    pub limit: usize,
    pub offset: usize,
}

impl TracesQuery {
    pub fn to_query_parameters(&self) -> QueryParameters {
        let mut parameters = time_window(&self.since, &self.until);
        push_opt(&mut parameters, "channel", &self.channel);
        push_opt(&mut parameters, "status", &self.status);
        parameters.push(("limit", self.limit.to_string()));
        parameters.push(("offset", self.offset.to_string()));
        parameters
    }
}

/// Parameters for the specialised `/v1/errors` endpoint.
///
/// The endpoint itself only understands a time window and a row limit; the
/// remaining fields are applied by the client after the rows arrive.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorsQuery {
    pub since: DateTime<Utc>,
    pub until: DateTime<Utc>,
    pub channel: Option<String>,
    pub error_type: Option<String>,
    pub trace_id: Option<String>,
    pub limit: usize,
    pub offset: usize,
}

impl ErrorsQuery {
    /// Rows requested from the backend: enough to slice the page locally.
    pub fn backend_limit(&self) -> usize {
        self.effective_limit() + self.offset
    }

    pub fn effective_limit(&self) -> usize {
        if self.limit == 0 {
            DEFAULT_ERRORS_LIMIT
        } else {
            self.limit
        }
    }

    pub fn to_query_parameters(&self) -> QueryParameters {
        let mut parameters = time_window(&self.since, &self.until);
        parameters.push(("limit", self.backend_limit().to_string()));
        parameters
    }
}

/// Parameters for the generic `/v1/events` endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct EventsQuery {
    pub since: DateTime<Utc>,
    pub until: DateTime<Utc>,
    pub channel: Option<String>,
    pub model: Option<String>,
    pub status: Option<String>,
    pub session: Option<String>,
    pub search: Option<String>,
    pub limit: usize,
    pub offset: usize,
}

impl EventsQuery {
    pub fn to_query_parameters(&self) -> QueryParameters {
        let mut parameters = time_window(&self.since, &self.until);
        push_opt(&mut parameters, "channel", &self.channel);
        push_opt(&mut parameters, "model", &self.model);
        push_opt(&mut parameters, "status", &self.status);
        push_opt(&mut parameters, "session_id", &self.session);
        push_opt(&mut parameters, "search", &self.search);
        parameters.push(("limit", self.limit.to_string()));
        parameters.push(("offset", self.offset.to_string()));
        parameters
    }
}

/// Parameters for the `/v1/semantic-events` endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticQuery {
    pub since: DateTime<Utc>,
    pub until: DateTime<Utc>,
    pub source: Option<String>,
    pub event_type: Option<String>,
    pub severity: Option<String>,
    pub agent: Option<String>,
    pub limit: usize,
    pub offset: usize,
}

impl SemanticQuery {
    pub fn to_query_parameters(&self) -> QueryParameters {
        let mut parameters = time_window(&self.since, &self.until);
        push_opt(&mut parameters, "source", &self.source);
        push_opt(&mut parameters, "type", &self.event_type);
        push_opt(&mut parameters, "agent_id", &self.agent);
        push_opt(&mut parameters, "severity", &self.severity);
        // zero means "server default" for this endpoint
        if self.limit > 0 {
            parameters.push(("limit", self.limit.to_string()));
        }
        if self.offset > 0 {
            parameters.push(("offset", self.offset.to_string()));
        }
        parameters
    }
}

fn time_window(since: &DateTime<Utc>, until: &DateTime<Utc>) -> QueryParameters {
    vec![
        ("start", timestamp::format(since)),
        ("end", timestamp::format(until)),
    ]
}

fn push_opt(parameters: &mut QueryParameters, key: &'static str, value: &Option<String>) {
    if let Some(value) = value.as_deref().filter(|value| !value.is_empty()) {
        parameters.push((key, value.to_string()));
    }
}
