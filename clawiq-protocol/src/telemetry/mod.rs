//! Records and query parameters exchanged with the ClawIQ telemetry service.

mod error;
mod event;
mod query;
mod semantic;
mod trace;

pub use error::{ErrorRecord, ErrorSummary, ErrorsResponse};
pub use event::{EventFilterOptions, EventsResponse, SpanEvent};
pub use query::{ErrorsQuery, EventsQuery, SemanticQuery, TracesQuery};
pub use semantic::{SemanticEvent, SemanticEventFilterOptions, SemanticEventsResponse};
pub use trace::{TraceRecord, TracesResponse};
