mod item;
mod marker;

pub use item::{ScanCounts, TimelineItem, TimelineKind, TimelinePage};
pub use marker::Marker;
