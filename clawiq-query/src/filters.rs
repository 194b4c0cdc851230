//! Filter sets for each query kind and the string predicates used to refine
//! backend results on the client.

use clawiq_protocol::telemetry::SpanEvent;

/// Filters accepted when pulling traces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceFilters {
    pub channel: Option<String>,
    pub status: Option<String>,
    pub model: Option<String>,
    pub session: Option<String>,
    pub search: Option<String>,
    pub agent: Option<String>,
}

impl TraceFilters {
    /// The specialised trace endpoint cannot answer these filters; the
    /// generic events endpoint can.
    pub fn needs_event_fallback(&self) -> bool {
        present(&self.agent).is_some()
            || present(&self.model).is_some()
            || present(&self.session).is_some()
            || present(&self.search).is_some()
            || present(&self.status) == Some("success")
    }
}

/// Filters accepted when pulling errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorFilters {
    pub channel: Option<String>,
    pub error_type: Option<String>,
    pub trace_id: Option<String>,
    pub model: Option<String>,
    pub session: Option<String>,
    pub search: Option<String>,
    pub agent: Option<String>,
}

impl ErrorFilters {
    pub fn needs_event_fallback(&self) -> bool {
        present(&self.agent).is_some()
            || present(&self.model).is_some()
            || present(&self.session).is_some()
            || present(&self.search).is_some()
    }
}

/// Filters for raw span events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpanEventFilters {
    pub channel: Option<String>,
    pub model: Option<String>,
    pub status: Option<String>,
    pub session: Option<String>,
    pub search: Option<String>,
    pub agent: Option<String>,
}

/// Filters for semantic events and the markers built from them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SemanticFilters {
    pub source: Option<String>,
    pub event_type: Option<String>,
    pub severity: Option<String>,
    pub agent: Option<String>,
    /// Case-insensitive substring of the event name, applied locally.
    pub name: Option<String>,
}

/// Everything `pull all` accepts. `event_type` is shared by the error and
/// marker sources.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimelineFilters {
    pub channel: Option<String>,
    pub model: Option<String>,
    pub status: Option<String>,
    pub trace_id: Option<String>,
    pub session: Option<String>,
    pub agent: Option<String>,
    pub search: Option<String>,
    pub source: Option<String>,
    pub event_type: Option<String>,
    pub severity: Option<String>,
    pub name: Option<String>,
}

impl TimelineFilters {
    pub fn trace_filters(&self) -> TraceFilters {
        TraceFilters {
            channel: self.channel.clone(),
            status: self.status.clone(),
            model: self.model.clone(),
            session: self.session.clone(),
            search: self.search.clone(),
            agent: self.agent.clone(),
        }
    }

    pub fn error_filters(&self) -> ErrorFilters {
        ErrorFilters {
            channel: self.channel.clone(),
            error_type: self.event_type.clone(),
            trace_id: self.trace_id.clone(),
            model: self.model.clone(),
            session: self.session.clone(),
            search: self.search.clone(),
            agent: self.agent.clone(),
        }
    }

    pub fn marker_filters(&self) -> SemanticFilters {
        SemanticFilters {
            source: self.source.clone(),
            event_type: self.event_type.clone(),
            severity: self.severity.clone(),
            agent: self.agent.clone(),
            name: self.name.clone(),
        }
    }
}

/// Treats an empty filter value the same as an absent one.
pub fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}

/// Session ids look like `agent:<id>:<rest>`.
pub fn matches_agent(session_id: &str, agent: &str) -> bool {
    session_id.contains(&agent_marker(agent))
}

pub fn contains_insensitive(text: &str, query: &str) -> bool {
    text.to_lowercase().contains(&query.to_lowercase())
}

/// Maps OpenTelemetry status codes onto `error` / `success`.
pub fn simplify_status(status_code: &str) -> &str {
    match status_code {
        "STATUS_CODE_ERROR" => "error",
        "STATUS_CODE_OK" | "STATUS_CODE_UNSET" => "success",
        other => other,
    }
}

/// Extracts the agent id from an `agent:<id>:...` session id.
pub fn agent_from_session(session_id: &str) -> &str {
    let mut parts = session_id.split(':');
    match (parts.next(), parts.next()) {
        (Some("agent"), Some(agent)) => agent,
        _ if session_id.is_empty() => "-",
        _ => session_id,
    }
}

/// Value sent as the server-side `search` when narrowing by agent.
pub(crate) fn server_search(agent: Option<&str>, search: Option<&str>) -> Option<String> {
    match agent {
        Some(agent) => Some(agent_marker(agent)),
        None => search.map(str::to_string),
    }
}

/// Applies the agent and agent+search passes to generic-event results.
/// Returns `true` when any pass ran, i.e. the backend total no longer holds.
pub(crate) fn refine_span_events(
    events: &mut Vec<SpanEvent>,
    agent: Option<&str>,
    search: Option<&str>,
) -> bool {
    let Some(agent) = agent else {
        return false;
    };

    events.retain(|event| matches_agent(&event.session_id, agent));

    if let Some(search) = search {
        events.retain(|event| {
            contains_insensitive(&event.name, search)
                || contains_insensitive(&event.model, search)
                || contains_insensitive(&event.session_id, search)
        });
    }

    true
}

fn agent_marker(agent: &str) -> String {
    format!("agent:{agent}:")
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("STATUS_CODE_ERROR", "error")]
    #[test_case("STATUS_CODE_OK", "success")]
    #[test_case("STATUS_CODE_UNSET", "success")]
    #[test_case("timeout", "timeout")]
    fn simplifies_status_codes(raw: &str, expected: &str) {
        assert_eq!(simplify_status(raw), expected);
    }

    #[test_case("agent:main:imessage:123", "main" ; "agent session")]
    #[test_case("agent:", "" ; "agent prefix with empty id")]
    #[test_case("web:42", "web:42" ; "other session")]
    #[test_case("", "-" ; "empty session")]
    fn derives_agent_from_session(session: &str, expected: &str) {
        assert_eq!(agent_from_session(session), expected);
    }

    #[test]
    fn agent_match_requires_full_segment() {
        assert!(matches_agent("agent:main:slack:1", "main"));
        assert!(!matches_agent("agent:mainframe:slack:1", "main"));
    }

    #[test]
    fn fallback_triggers() {
        let plain = TraceFilters {
            channel: Some("slack".into()),
            status: Some("error".into()),
            ..TraceFilters::default()
        };
        assert!(!plain.needs_event_fallback());

        let success = TraceFilters {
            status: Some("success".into()),
            ..TraceFilters::default()
        };
        assert!(success.needs_event_fallback());

        let blank_agent = ErrorFilters {
            agent: Some(String::new()),
            ..ErrorFilters::default()
        };
        assert!(!blank_agent.needs_event_fallback());
    }

    #[test]
    fn timeline_type_feeds_errors_and_markers() {
        let filters = TimelineFilters {
            event_type: Some("timeout".into()),
            name: Some("deploy".into()),
            ..TimelineFilters::default()
        };
        assert_eq!(filters.error_filters().error_type.as_deref(), Some("timeout"));
        assert_eq!(filters.marker_filters().event_type.as_deref(), Some("timeout"));
        assert_eq!(filters.marker_filters().name.as_deref(), Some("deploy"));
    }

    #[test]
    fn server_search_prefers_agent_marker() {
        assert_eq!(
            server_search(Some("main"), Some("foo")).as_deref(),
            Some("agent:main:")
        );
        assert_eq!(server_search(None, Some("foo")).as_deref(), Some("foo"));
        assert_eq!(server_search(None, None), None);
    }
}
