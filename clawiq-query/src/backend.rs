use async_trait::async_trait;
use clawiq_protocol::telemetry::{
    ErrorsQuery, ErrorsResponse, EventsQuery, EventsResponse, SemanticEventsResponse,
    SemanticQuery, TracesQuery, TracesResponse,
};

use crate::client::ClientError;

/// Read-only view of the remote telemetry service.
///
/// [`crate::TelemetryClient`] is the HTTP implementation; routers and the
/// timeline merger only depend on this trait.
#[async_trait]
pub trait TelemetryBackend: Send + Sync {
    /// Specialised trace listing: time window, channel and status only.
    async fn get_traces(&self, query: &TracesQuery) -> Result<TracesResponse, ClientError>;

    /// Specialised error listing. Its `summary.total` is the page length,
    /// not a count of all matching errors.
    async fn get_errors(&self, query: &ErrorsQuery) -> Result<ErrorsResponse, ClientError>;

    /// Generic span-event listing with the broader filter set.
    async fn get_events(&self, query: &EventsQuery) -> Result<EventsResponse, ClientError>;

    /// Semantic (annotation) events.
    async fn get_semantic_events(
        &self,
        query: &SemanticQuery,
    ) -> Result<SemanticEventsResponse, ClientError>;
}
