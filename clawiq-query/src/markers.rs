use clawiq_protocol::prelude::*;
use tracing::{debug, warn};

use crate::backend::TelemetryBackend;
use crate::error::QueryError;
use crate::filters::{contains_insensitive, present, SemanticFilters};
use crate::routing::semantic_query;
use crate::time::TimeRange;
use crate::transforms::build_markers;

/// Semantic events requested per call while collecting markers.
pub const MARKER_BATCH_SIZE: usize = 500;

/// Upper bound on semantic events held while collecting markers.
pub const MARKER_EVENT_CAP: usize = 50_000;

/// Collects every matching semantic event in the window and aggregates them
/// into 5-minute markers.
pub async fn fetch_markers<B>(
    backend: &B,
    filters: &SemanticFilters,
    range: &TimeRange,
) -> Result<Vec<Marker>, QueryError>
where
    B: TelemetryBackend + ?Sized,
{
    let mut events =
        fetch_all_semantic_events(backend, filters, range, MARKER_BATCH_SIZE, MARKER_EVENT_CAP)
            .await?;

    if let Some(name) = present(&filters.name) {
        events.retain(|event| contains_insensitive(&event.name, name));
    }

    Ok(build_markers(&events))
}

/// Pages through the semantic-events endpoint one batch at a time until a
/// short batch arrives or `cap` events are held.
pub(crate) async fn fetch_all_semantic_events<B>(
    backend: &B,
    filters: &SemanticFilters,
    range: &TimeRange,
    batch_size: usize,
    cap: usize,
) -> Result<Vec<SemanticEvent>, QueryError>
where
    B: TelemetryBackend + ?Sized,
{
    let mut all = Vec::new();
    let mut offset = 0;

    while all.len() < cap {
        let query = semantic_query(filters, range, batch_size, offset);
        let response = backend.get_semantic_events(&query).await?;
        let received = response.events.len();
        all.extend(response.events);
        debug!(offset, received, held = all.len(), "semantic event batch");

        if received < batch_size {
            return Ok(all);
        }
        offset += batch_size;
    }

    warn!(
        cap,
        "semantic event cap reached; markers may be incomplete"
    );
    Ok(all)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};

    use crate::client::ClientError;

    struct PagedSemantic {
        available: usize,
        offsets: Mutex<Vec<(usize, usize)>>,
    }

    #[async_trait]
    impl TelemetryBackend for PagedSemantic {
        async fn get_traces(&self, _query: &TracesQuery) -> Result<TracesResponse, ClientError> {
            unreachable!("markers only read semantic events")
        }

        async fn get_errors(&self, _query: &ErrorsQuery) -> Result<ErrorsResponse, ClientError> {
            unreachable!("markers only read semantic events")
        }

        async fn get_events(&self, _query: &EventsQuery) -> Result<EventsResponse, ClientError> {
            unreachable!("markers only read semantic events")
        }

        async fn get_semantic_events(
            &self,
            query: &SemanticQuery,
        ) -> Result<SemanticEventsResponse, ClientError> {
            self.offsets
                .lock()
                .unwrap()
                .push((query.offset, query.limit));
            let base = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
            let count = self.available.saturating_sub(query.offset).min(query.limit);
            let events = (0..count)
                .map(|i| SemanticEvent {
                    id: format!("e-{}", query.offset + i),
                    timestamp: base - Duration::seconds((query.offset + i) as i64),
                    source: "agent".into(),
                    event_type: "task".into(),
                    name: if i % 2 == 0 { "Deploy".into() } else { "lint".into() },
                    severity: "info".into(),
                    agent_id: None,
                    session_id: None,
                    channel: None,
                    target: None,
                    quality_tags: None,
                    action_tags: None,
                    domain_tags: None,
                    meta: None,
                })
                .collect();
            Ok(SemanticEventsResponse {
                events,
                total: self.available as u64,
                filters: None,
            })
        }
    }

    fn range() -> TimeRange {
        TimeRange {
            start: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn stops_after_short_batch() {
        let backend = PagedSemantic {
            available: 1_200,
            offsets: Mutex::new(Vec::new()),
        };
        let events = fetch_all_semantic_events(
            &backend,
            &SemanticFilters::default(),
            &range(),
            MARKER_BATCH_SIZE,
            MARKER_EVENT_CAP,
        )
        .await
        .unwrap();

        assert_eq!(events.len(), 1_200);
        assert_eq!(
            *backend.offsets.lock().unwrap(),
            vec![(0, 500), (500, 500), (1_000, 500)]
        );
    }

    #[tokio::test]
    async fn stops_at_cap() {
        let backend = PagedSemantic {
            available: 10_000,
            offsets: Mutex::new(Vec::new()),
        };
        let events = fetch_all_semantic_events(
            &backend,
            &SemanticFilters::default(),
            &range(),
            10,
            30,
        )
        .await
        .unwrap();

        assert_eq!(events.len(), 30);
        assert_eq!(backend.offsets.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn name_filter_runs_before_bucketing() {
        let backend = PagedSemantic {
            available: 6,
            offsets: Mutex::new(Vec::new()),
        };
        let filters = SemanticFilters {
            name: Some("deploy".into()),
            ..SemanticFilters::default()
        };
        let markers = fetch_markers(&backend, &filters, &range()).await.unwrap();

        assert_eq!(markers.len(), 2);
        assert!(markers.iter().all(|marker| marker.name == "Deploy"));
        assert_eq!(markers.iter().map(|marker| marker.count).sum::<u64>(), 3);
    }
}
