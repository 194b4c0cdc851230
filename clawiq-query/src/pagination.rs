use serde::Serialize;

use crate::error::QueryError;

/// Page size used by the command line when `--limit` is not given.
pub const DEFAULT_PAGE_LIMIT: i64 = 50;

/// Raw paging flags as typed by the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub page: Option<i64>,
}

/// Validated paging window. `page` is always derived from `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub limit: usize,
    pub offset: usize,
    pub page: usize,
}

impl PageInfo {
    /// Exclusive end of the window.
    pub fn end(&self) -> usize {
        self.offset.saturating_add(self.limit)
    }

    pub fn next_offset(&self) -> usize {
        self.end()
    }

    /// Returns the part of `items` this window covers.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.offset.min(items.len());
        let end = self.end().min(items.len());
        &items[start..end]
    }
}

pub fn compute_page_info(request: &PageRequest, default_limit: i64) -> Result<PageInfo, QueryError> {
    let limit = positive(request.limit.unwrap_or(default_limit), "limit")?;

    // a bad --page is reported even when --offset wins
    let offset_from_page = match request.page {
        Some(page) => (positive(page, "page")? - 1)
            .checked_mul(limit)
            .ok_or(QueryError::InvalidPageParameter {
                name: "page",
                reason: "is too large",
            })?,
        None => 0,
    };

    let offset = match request.offset {
        Some(offset) if offset < 0 => {
            return Err(QueryError::InvalidPageParameter {
                name: "offset",
                reason: "must be a non-negative integer",
            })
        }
        Some(offset) => to_usize(offset, "offset")?,
        None => offset_from_page,
    };

    Ok(PageInfo {
        limit,
        offset,
        page: offset / limit + 1,
    })
}

fn positive(value: i64, name: &'static str) -> Result<usize, QueryError> {
    if value <= 0 {
        return Err(QueryError::InvalidPageParameter {
            name,
            reason: "must be a positive integer",
        });
    }
    to_usize(value, name)
}

fn to_usize(value: i64, name: &'static str) -> Result<usize, QueryError> {
    usize::try_from(value).map_err(|_| QueryError::InvalidPageParameter {
        name,
        reason: "is too large",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn request(limit: Option<i64>, offset: Option<i64>, page: Option<i64>) -> PageRequest {
        PageRequest { limit, offset, page }
    }

    #[test]
    fn defaults_to_first_page() {
        let info = compute_page_info(&PageRequest::default(), DEFAULT_PAGE_LIMIT).unwrap();
        assert_eq!(info, PageInfo { limit: 50, offset: 0, page: 1 });
    }

    #[test]
    fn page_is_derived_from_offset() {
        let info = compute_page_info(&request(Some(50), Some(125), None), 50).unwrap();
        assert_eq!(info.page, 3);
        assert_eq!(info.offset, 125);
    }

    #[test]
    fn page_translates_to_offset() {
        let info = compute_page_info(&request(Some(50), None, Some(3)), 50).unwrap();
        assert_eq!(info, PageInfo { limit: 50, offset: 100, page: 3 });
    }

    #[test]
    fn explicit_offset_wins_over_page() {
        let info = compute_page_info(&request(Some(10), Some(5), Some(4)), 50).unwrap();
        assert_eq!(info, PageInfo { limit: 10, offset: 5, page: 1 });
    }

    #[test_case(Some(0), None, None, "limit" ; "zero limit")]
    #[test_case(Some(-3), None, None, "limit" ; "negative limit")]
    #[test_case(None, None, Some(0), "page" ; "zero page")]
    #[test_case(None, Some(10), Some(-1), "page" ; "bad page with offset")]
    #[test_case(None, Some(-1), None, "offset" ; "negative offset")]
    fn rejects_out_of_range_flags(
        limit: Option<i64>,
        offset: Option<i64>,
        page: Option<i64>,
        flag: &str,
    ) {
        match compute_page_info(&request(limit, offset, page), 50) {
            Err(QueryError::InvalidPageParameter { name, .. }) => assert_eq!(name, flag),
            other => panic!("expected invalid --{flag}, got {other:?}"),
        }
    }

    #[test]
    fn error_names_the_flag() {
        let err = compute_page_info(&request(Some(0), None, None), 50).unwrap_err();
        assert_eq!(err.to_string(), "--limit must be a positive integer");
    }

    #[test]
    fn slice_clamps_to_available_items() {
        let items: Vec<u32> = (0..7).collect();
        let info = PageInfo { limit: 5, offset: 5, page: 2 };
        assert_eq!(info.slice(&items), &[5, 6]);
        let past_end = PageInfo { limit: 5, offset: 10, page: 3 };
        assert!(past_end.slice(&items).is_empty());
        assert_eq!(info.next_offset(), 10);
    }
}
