// Timeline merge: fan-out to every source, ordering, paging and failure handling.
mod common;

use clawiq::query::ClientError;
use clawiq::{
    merge_timeline, ErrorsQuery, ErrorsResponse, EventsQuery, EventsResponse, PageInfo,
    QueryError, SemanticEventsResponse, SemanticQuery, TelemetryBackend, TimelineFilters,
    TimelineKind, Total, TracesQuery, TracesResponse,
};
use common::{annotation, at, day_range, error, span, trace, Call, FakeBackend};
use mockall::mock;

mock! {
    pub Backend {}

    #[async_trait::async_trait]
    impl TelemetryBackend for Backend {
        async fn get_traces(&self, query: &TracesQuery) -> Result<TracesResponse, ClientError>;
        async fn get_errors(&self, query: &ErrorsQuery) -> Result<ErrorsResponse, ClientError>;
        async fn get_events(&self, query: &EventsQuery) -> Result<EventsResponse, ClientError>;
        async fn get_semantic_events(
            &self,
            query: &SemanticQuery,
        ) -> Result<SemanticEventsResponse, ClientError>;
    }
}

fn page(limit: usize, offset: usize) -> PageInfo {
    PageInfo {
        limit,
        offset,
        page: offset / limit + 1,
    }
}

fn mixed_backend() -> FakeBackend {
    FakeBackend {
        traces: vec![
            trace("t3", at(12, 30, 0), "STATUS_CODE_OK"),
            trace("t2", at(12, 10, 0), "STATUS_CODE_ERROR"),
            trace("t1", at(11, 50, 0), "STATUS_CODE_OK"),
        ],
        traces_total: 3,
        errors: vec![
            error("t2", at(12, 11, 0), "timeout"),
            error("t0", at(11, 40, 0), "rate_limit"),
        ],
        semantic: vec![annotation(at(12, 21, 0), "deploy", "warn")],
        ..FakeBackend::default()
    }
}

#[tokio::test]
async fn returns_most_recent_items_across_kinds() {
    let backend = mixed_backend();

    let timeline = merge_timeline(&backend, &TimelineFilters::default(), &day_range(), &page(3, 0))
        .await
        .expect("timeline");

    let kinds: Vec<_> = timeline.items.iter().map(|item| item.kind).collect();
    assert_eq!(
        kinds,
        vec![TimelineKind::Trace, TimelineKind::Marker, TimelineKind::Error]
    );
    let stamps: Vec<_> = timeline.items.iter().map(|item| item.timestamp).collect();
    assert_eq!(stamps, vec![at(12, 30, 0), at(12, 20, 0), at(12, 11, 0)]);
    assert_eq!(timeline.items[1].summary, "warn task:deploy x1");

    // the trace source filled the 3-row window
    assert!(timeline.has_more);
    assert!(timeline.total.is_unknown());
    assert_eq!(timeline.scanned.merged, 6);
}

#[tokio::test]
async fn second_page_fetches_offset_plus_limit_from_each_router() {
    let backend = mixed_backend();

    let timeline = merge_timeline(&backend, &TimelineFilters::default(), &day_range(), &page(2, 2))
        .await
        .expect("timeline");

    assert_eq!(timeline.items.len(), 2);
    assert_eq!(timeline.items[0].timestamp, at(12, 11, 0));
    assert_eq!(timeline.items[1].timestamp, at(12, 10, 0));

    for call in backend.calls() {
        match call {
            Call::Traces(query) => assert_eq!((query.limit, query.offset), (4, 0)),
            Call::Errors(query) => assert_eq!((query.limit, query.offset), (4, 0)),
            Call::Semantic(query) => assert_eq!(query.limit, 500),
            Call::Events(_) => panic!("no fallback filters were given"),
        }
    }
}

#[tokio::test]
async fn short_sources_report_exact_total() {
    let backend = mixed_backend();

    let timeline = merge_timeline(&backend, &TimelineFilters::default(), &day_range(), &page(10, 0))
        .await
        .expect("timeline");

    assert_eq!(timeline.items.len(), 6);
    assert!(!timeline.has_more);
    assert_eq!(timeline.total, Total::Exact(6));
}

#[tokio::test]
async fn full_window_reports_more_even_when_nothing_is_left() {
    let backend = FakeBackend {
        traces: vec![
            trace("t2", at(12, 10, 0), "STATUS_CODE_OK"),
            trace("t1", at(12, 0, 0), "STATUS_CODE_OK"),
        ],
        traces_total: 2,
        ..FakeBackend::default()
    };

    let timeline = merge_timeline(&backend, &TimelineFilters::default(), &day_range(), &page(2, 0))
        .await
        .expect("timeline");

    assert_eq!(timeline.items.len(), 2);
    assert!(timeline.has_more);
    assert_eq!(timeline.total, Total::Unknown);
}

#[tokio::test]
async fn agent_filter_routes_both_sources_through_events() {
    let mut backend = MockBackend::new();
    backend.expect_get_traces().never();
    backend.expect_get_errors().never();
    backend
        .expect_get_events()
        .withf(|query| query.search.as_deref() == Some("agent:main:"))
        .times(2)
        .returning(|query| {
            let mut event = span("a", at(12, 0, 0), "agent:main:slack:1");
            if query.status.as_deref() == Some("error") {
                event.status_code = "STATUS_CODE_ERROR".into();
                event.error_type = "timeout".into();
            }
            Ok(EventsResponse {
                events: vec![event],
                total: 1,
                filters: None,
            })
        });
    backend
        .expect_get_semantic_events()
        .withf(|query| query.agent.as_deref() == Some("main") && query.offset == 0)
        .times(1)
        .returning(|_| {
            Ok(SemanticEventsResponse {
                events: vec![annotation(at(11, 0, 0), "handoff", "info")],
                total: 1,
                filters: None,
            })
        });

    let filters = TimelineFilters {
        agent: Some("main".into()),
        ..TimelineFilters::default()
    };
    let timeline = merge_timeline(&backend, &filters, &day_range(), &page(50, 0))
        .await
        .expect("timeline");

    assert_eq!(timeline.items.len(), 3);
    assert_eq!(timeline.items[0].kind, TimelineKind::Trace);
    assert_eq!(timeline.items[0].agent.as_deref(), Some("main"));
    assert_eq!(timeline.items[1].summary, "timeout: timeout");
    assert_eq!(timeline.total, Total::Exact(3));
}

#[tokio::test]
async fn any_source_failure_fails_the_merge() {
    let mut backend = MockBackend::new();
    backend.expect_get_traces().returning(|_| {
        Ok(TracesResponse {
            traces: vec![],
            total: 0,
        })
    });
    backend.expect_get_errors().returning(|_| {
        Err(ClientError::Api {
            status: 503,
            message: "errors store unavailable".into(),
        })
    });
    backend.expect_get_semantic_events().returning(|_| {
        Ok(SemanticEventsResponse {
            events: vec![],
            total: 0,
            filters: None,
        })
    });

    let err = merge_timeline(&backend, &TimelineFilters::default(), &day_range(), &page(5, 0))
        .await
        .unwrap_err();

    match err {
        QueryError::Transport(ClientError::Api { status, .. }) => assert_eq!(status, 503),
        other => panic!("expected transport failure, got {other:?}"),
    }
}
