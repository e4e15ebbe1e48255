use serde::{Deserialize, Serialize};

/// Header carrying the true size of a filtered collection.
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// Parameters for a paginated, filtered collection request.
///
/// Serialized as `?_page=&_limit=&q=`; `q` is always sent, an empty
/// string meaning "no filter".
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListQuery {
    /// 1-based page number.
    pub page: u32,

    /// Page size.
    pub limit: u32,

    /// Full-text search term.
    #[serde(default)]
    pub q: String,
}

impl ListQuery {
    pub fn new(page: u32, limit: u32, q: impl Into<String>) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
            q: q.into(),
        }
    }

    /// Query-string pairs in wire order.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("_page", self.page.to_string()),
            ("_limit", self.limit.to_string()),
            ("q", self.q.clone()),
        ]
    }
}

/// One page of a collection plus its total size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,

    /// Total matching items. Exact when the server sent the count header,
    /// otherwise the page length (an under-count whenever the page is full
    /// and more items exist).
    pub total: u32,

    /// Whether `total` came from the server.
    pub total_exact: bool,
}

impl<T> Page<T> {
    /// Build a page from its items and the optional count header value.
    pub fn from_parts(items: Vec<T>, header_total: Option<u32>) -> Self {
        match header_total {
            Some(total) => Self {
                items,
                total,
                total_exact: true,
            },
            None => {
                let total = u32::try_from(items.len()).unwrap_or(u32::MAX);
                Self {
                    items,
                    total,
                    total_exact: false,
                }
            }
        }
    }
}

/// Number of pages needed for `total_items` at `per_page` items each.
pub fn total_pages(total_items: u32, per_page: u32) -> u32 {
    total_items.div_ceil(per_page.max(1))
}

// ── Pagination ──────────────────────────────────────────────────────

/// Pagination metadata for the product listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub current_page: u32,
    pub items_per_page: u32,
    pub total_items: u32,
}

impl Pagination {
    pub fn total_pages(&self) -> u32 {
        total_pages(self.total_items, self.items_per_page)
    }

    /// Last valid page; page 1 exists even for an empty collection.
    pub fn last_page(&self) -> u32 {
        self.total_pages().max(1)
    }

    /// Pager layout for the current position.
    pub fn window(&self) -> PageWindow {
        PageWindow::compute(self.current_page, self.total_pages())
    }
}

/// Most numbered buttons a pager shows at once.
pub const MAX_VISIBLE_PAGES: u32 = 5;

/// Above this many pages the pager adds first/last shortcuts and ellipses.
const SHORTCUT_THRESHOLD: u32 = 10;

/// Layout of a pager: which numbered pages are visible and which
/// shortcuts/ellipses surround them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    pub pages: Vec<u32>,
    pub first_shortcut: bool,
    pub leading_ellipsis: bool,
    pub trailing_ellipsis: bool,
    pub last_shortcut: bool,
    pub has_prev: bool,
    pub has_next: bool,
}

impl PageWindow {
    pub fn compute(current: u32, total_pages: u32) -> Self {
        let mut start = 1;
        let mut end = total_pages;

        if total_pages > MAX_VISIBLE_PAGES {
            let half = MAX_VISIBLE_PAGES / 2;
            start = current.saturating_sub(half).max(1);
            end = current.saturating_add(half).min(total_pages);

            if current <= half + 1 {
                start = 1;
                end = MAX_VISIBLE_PAGES;
            } else if current.saturating_add(half) >= total_pages {
                start = total_pages - MAX_VISIBLE_PAGES + 1;
                end = total_pages;
            }
        }

        let many = total_pages > SHORTCUT_THRESHOLD;
        Self {
            pages: (start..=end).collect(),
            first_shortcut: many && current > 3,
            leading_ellipsis: many && current > 4,
            trailing_ellipsis: many && current.saturating_add(3) < total_pages,
            last_shortcut: many && current.saturating_add(2) < total_pages,
            has_prev: current > 1,
            has_next: current < total_pages,
        }
    }
}

// ── PageRedirect ────────────────────────────────────────────────────

/// Instruction returned after a deletion; the caller applies the page change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRedirect {
    pub should_redirect: bool,
    pub new_page: u32,
}

impl PageRedirect {
    pub fn stay(page: u32) -> Self {
        Self {
            should_redirect: false,
            new_page: page,
        }
    }

    /// Decide where to go once the current page has been re-fetched after a
    /// deletion. Only an emptied page beyond the first one redirects, to
    /// `min(current - 1, new_total_pages)`, never below page 1.
    pub fn after_delete(
        current_page: u32,
        remaining_on_page: usize,
        new_total_items: u32,
        per_page: u32,
    ) -> Self {
        if remaining_on_page == 0 && current_page > 1 {
            let new_total_pages = total_pages(new_total_items, per_page);
            Self {
                should_redirect: true,
                new_page: (current_page - 1).min(new_total_pages).max(1),
            }
        } else {
            Self::stay(current_page)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_pairs() {
        let q = ListQuery::new(2, 8, "lamp");
        assert_eq!(
            q.query_pairs(),
            vec![
                ("_page", "2".to_string()),
                ("_limit", "8".to_string()),
                ("q", "lamp".to_string()),
            ]
        );
        assert_eq!(ListQuery::new(0, 0, "").page, 1);
    }

    #[test]
    fn test_page_total_from_header() {
        let page = Page::from_parts(vec![1, 2, 3], Some(42));
        assert_eq!(page.total, 42);
        assert!(page.total_exact);
    }

    #[test]
    fn test_page_total_falls_back_to_length() {
        let page = Page::from_parts(vec![1, 2, 3, 4, 5, 6, 7, 8], None);
        assert_eq!(page.total, 8);
        assert!(!page.total_exact);
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 8), 0);
        assert_eq!(total_pages(8, 8), 1);
        assert_eq!(total_pages(9, 8), 2);
        assert_eq!(total_pages(5, 0), 5);
    }

    #[test]
    fn test_last_page_never_zero() {
        let p = Pagination {
            current_page: 1,
            items_per_page: 8,
            total_items: 0,
        };
        assert_eq!(p.total_pages(), 0);
        assert_eq!(p.last_page(), 1);
    }

    #[test]
    fn test_window_small_collection() {
        let w = PageWindow::compute(2, 3);
        assert_eq!(w.pages, vec![1, 2, 3]);
        assert!(w.has_prev);
        assert!(w.has_next);
        assert!(!w.first_shortcut && !w.last_shortcut);
    }

    #[test]
    fn test_window_at_start() {
        let w = PageWindow::compute(1, 8);
        assert_eq!(w.pages, vec![1, 2, 3, 4, 5]);
        assert!(!w.has_prev);
    }

    #[test]
    fn test_window_at_end() {
        let w = PageWindow::compute(8, 8);
        assert_eq!(w.pages, vec![4, 5, 6, 7, 8]);
        assert!(!w.has_next);
    }

    #[test]
    fn test_window_middle_of_many() {
        let w = PageWindow::compute(10, 20);
        assert_eq!(w.pages, vec![8, 9, 10, 11, 12]);
        assert!(w.first_shortcut);
        assert!(w.leading_ellipsis);
        assert!(w.trailing_ellipsis);
        assert!(w.last_shortcut);
    }

    #[test]
    fn test_window_near_end_of_many() {
        let w = PageWindow::compute(18, 20);
        assert_eq!(w.pages, vec![16, 17, 18, 19, 20]);
        assert!(!w.trailing_ellipsis);
        assert!(!w.last_shortcut);
    }

    #[test]
    fn test_window_current_past_the_end() {
        let w = PageWindow::compute(15, 12);
        assert_eq!(w.pages, vec![8, 9, 10, 11, 12]);
        assert!(w.has_prev);
        assert!(!w.has_next);
        assert!(!w.trailing_ellipsis);

        let w = PageWindow::compute(u32::MAX, 13);
        assert_eq!(w.pages, vec![9, 10, 11, 12, 13]);
        assert!(w.has_prev);
        assert!(!w.has_next);
        assert!(!w.trailing_ellipsis);
        assert!(!w.last_shortcut);
    }

    #[test]
    fn test_redirect_after_emptying_last_page() {
        // Page 2 lost its only item; 8 items remain on page 1.
        let r = PageRedirect::after_delete(2, 0, 8, 8);
        assert_eq!(
            r,
            PageRedirect {
                should_redirect: true,
                new_page: 1
            }
        );
    }

    #[test]
    fn test_no_redirect_on_first_page() {
        assert_eq!(PageRedirect::after_delete(1, 0, 0, 8), PageRedirect::stay(1));
    }

    #[test]
    fn test_no_redirect_when_page_still_has_items() {
        assert_eq!(PageRedirect::after_delete(3, 2, 18, 8), PageRedirect::stay(3));
    }

    #[test]
    fn test_redirect_never_below_first_page() {
        let r = PageRedirect::after_delete(3, 0, 0, 8);
        assert!(r.should_redirect);
        assert_eq!(r.new_page, 1);
    }

    #[test]
    fn test_redirect_serializes_camel_case() {
        let json = serde_json::to_value(PageRedirect::stay(4)).unwrap();
        assert_eq!(json, serde_json::json!({"shouldRedirect": false, "newPage": 4}));
    }
}
