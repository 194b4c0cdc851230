use serde::{Serialize, Serializer};

/// Record count reported alongside a page of results.
///
/// `Unknown` means client-side filtering discarded records the backend had
/// already counted, or the backend count is not trustworthy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Total {
    Exact(u64),
    Unknown,
}

impl Total {
    pub fn exact(&self) -> Option<u64> {
        match self {
            Total::Exact(count) => Some(*count),
            Total::Unknown => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Total::Unknown)
    }
}

impl Serialize for Total {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Total::Exact(count) => serializer.serialize_u64(*count),
            Total::Unknown => serializer.serialize_none(),
        }
    }
}

/// One page of records plus what is known about the full result size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult<T> {
    pub records: Vec<T>,
    pub total: Total,
}

impl<T> QueryResult<T> {
    pub fn new(records: Vec<T>, total: Total) -> Self {
        Self { records, total }
    }

    /// Marks the total as unknown after a client-side filtering pass.
    pub fn retain<F>(&mut self, predicate: F)
    where
        F: FnMut(&T) -> bool,
    {
        self.records.retain(predicate);
        self.total = Total::Unknown;
    }

    pub fn map<U, F>(self, f: F) -> QueryResult<U>
    where
        F: FnMut(T) -> U,
    {
        QueryResult {
            records: self.records.into_iter().map(f).collect(),
            total: self.total,
        }
    }
}
