use serde::{Deserialize, Serialize};

/// Fixed page size for every post feed.
pub const PAGE_SIZE: i64 = 10;

/// `?page=N` query parameter, 1-indexed. Missing or sub-1 values clamp to
/// page 1; pages past the end of the sequence come back empty, never as an
/// error.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
}

impl PageQuery {
    pub fn number(self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn offset(self) -> i64 {
        // Saturate so an absurd ?page= cannot wrap into a negative OFFSET
        self.number().saturating_sub(1).saturating_mul(PAGE_SIZE)
    }
}

/// One fixed-size slice of an ordered sequence.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub has_more: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, query: PageQuery, total: i64) -> Self {
        Self {
            has_more: query.offset().saturating_add(PAGE_SIZE) < total,
            page: query.number(),
            page_size: PAGE_SIZE,
            items,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<i64>) -> PageQuery {
        PageQuery { page }
    }

    #[test]
    fn missing_page_defaults_to_first() {
        assert_eq!(query(None).number(), 1);
        assert_eq!(query(None).offset(), 0);
    }

    #[test]
    fn sub_one_pages_clamp_to_first() {
        assert_eq!(query(Some(0)).number(), 1);
        assert_eq!(query(Some(-3)).offset(), 0);
    }

    #[test]
    fn offset_steps_by_page_size() {
        assert_eq!(query(Some(2)).offset(), 10);
        assert_eq!(query(Some(5)).offset(), 40);
    }

    #[test]
    fn eleven_items_span_two_pages() {
        let total = 11;
        let page1 = Page::new(vec![0; 10], query(Some(1)), total);
        assert!(page1.has_more);

        let page2 = Page::new(vec![0; 1], query(Some(2)), total);
        assert!(!page2.has_more);

        // Past the end: empty, not an error
        let page3 = Page::new(Vec::<i32>::new(), query(Some(3)), total);
        assert!(page3.items.is_empty());
        assert!(!page3.has_more);
    }

    #[test]
    fn huge_page_numbers_saturate_instead_of_overflowing() {
        let q = query(Some(i64::MAX));
        assert_eq!(q.offset(), i64::MAX);

        let page = Page::new(Vec::<i32>::new(), q, 25);
        assert!(page.items.is_empty());
        assert!(!page.has_more);
    }
}
