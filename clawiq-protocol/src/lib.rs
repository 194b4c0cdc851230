pub mod result;
pub mod telemetry;
pub mod timeline;
pub mod timestamp;

pub mod prelude {
    pub use crate::result::{QueryResult, Total};
    pub use crate::telemetry::{
        ErrorRecord, ErrorSummary, ErrorsQuery, ErrorsResponse, EventsQuery, EventsResponse,
        SemanticEvent, SemanticEventsResponse, SemanticQuery, SpanEvent, TraceRecord,
        TracesQuery, TracesResponse,
    };
    pub use crate::timeline::{Marker, ScanCounts, TimelineItem, TimelineKind, TimelinePage};
}
