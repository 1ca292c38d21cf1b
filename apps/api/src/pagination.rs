//! Page/limit query parameters and the `hasMore` computation shared by the
//! paginated listings.

use serde::Deserialize;

const DEFAULT_LIMIT: i64 = 6;
const MAX_LIMIT: i64 = 50;

/// `?page=&limit=` query parameters. Page numbering starts at 1.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageParams {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

/// There is another page iff the rows before and including this one do not
/// cover the total count.
pub fn has_more(offset: i64, returned: usize, total: i64) -> bool {
    offset + (returned as i64) < total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<i64>, limit: Option<i64>) -> PageParams {
        PageParams { page, limit }
    }

    #[test]
    fn test_defaults() {
        let p = params(None, None);
        assert_eq!(p.page(), 1);
        assert_eq!(p.limit(), 6);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn test_offset_from_page() {
        let p = params(Some(3), Some(10));
        assert_eq!(p.offset(), 20);
    }

    #[test]
    fn test_page_clamped_to_one() {
        let p = params(Some(0), None);
        assert_eq!(p.page(), 1);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn test_limit_clamped_to_max() {
        let p = params(None, Some(500));
        assert_eq!(p.limit(), 50);
    }

    #[test]
    fn test_has_more_when_rows_remain() {
        assert!(has_more(0, 6, 10));
    }

    #[test]
    fn test_no_more_on_exact_boundary() {
        // offset + returned == total ⇒ everything is covered
        assert!(!has_more(6, 4, 10));
    }

    #[test]
    fn test_no_more_past_end() {
        assert!(!has_more(12, 0, 10));
    }

    #[test]
    fn test_has_more_on_full_first_page() {
        assert!(has_more(0, 6, 7));
        assert!(!has_more(0, 6, 6));
    }
}
