use serde::Deserialize;

/// One page of a paginated listing (`count`/`next`/`previous`/`results`).
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }
}

/// A listing body that may or may not be paginated.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Paged(Page<T>),
    Plain(Vec<T>),
}

impl<T> Listing<T> {
    pub fn into_page(self) -> Page<T> {
        match self {
            Listing::Paged(page) => page,
            Listing::Plain(results) => Page {
                count: results.len() as u64,
                next: None,
                previous: None,
                results,
            },
        }
    }
}

/// Query parameters for a listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub page: u32,
    pub page_size: Option<u32>,
    pub search: Option<String>,
    pub category: Option<i64>,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: None,
            search: None,
            category: None,
        }
    }
}

impl PageQuery {
    pub fn page(page: u32) -> Self {
        Self {
            page: page.max(1),
            ..Self::default()
        }
    }

    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("page", self.page.to_string())];
        if let Some(size) = self.page_size {
            pairs.push(("page_size", size.to_string()));
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.trim().is_empty()) {
            pairs.push(("search", search.trim().to_string()));
        }
        if let Some(category) = self.category {
            pairs.push(("category", category.to_string()));
        }
        pairs
    }
}

/// Keeps page number and filters consistent across requests.
///
/// Changing a filter always goes back to the first page, and navigation
/// stops at the ends the last response reported.
#[derive(Debug, Clone, Default)]
pub struct Pager {
    query: PageQuery,
    total: u64,
    has_next: bool,
    has_previous: bool,
}

impl Pager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &PageQuery {
        &self.query
    }

    pub fn current_page(&self) -> u32 {
        self.query.page
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Record what the server returned for the current query.
    pub fn update<T>(&mut self, page: &Page<T>) {
        self.total = page.count;
        self.has_next = page.has_next();
        self.has_previous = page.has_previous();
    }

    /// Advance to the next page if one exists. Returns whether it moved.
    pub fn next_page(&mut self) -> bool {
        if self.has_next {
            self.query.page += 1;
            true
        } else {
            false
        }
    }

    pub fn prev_page(&mut self) -> bool {
        if self.has_previous && self.query.page > 1 {
            self.query.page -= 1;
            true
        } else {
            false
        }
    }

    pub fn set_search(&mut self, search: Option<String>) {
        let search = search.filter(|s| !s.trim().is_empty());
        if self.query.search != search {
            self.query.search = search;
            self.reset();
        }
    }

    /// `None` or category id 0 means "All".
    pub fn set_category(&mut self, category: Option<i64>) {
        let category = category.filter(|id| *id != 0);
        if self.query.category != category {
            self.query.category = category;
            self.reset();
        }
    }

    pub fn set_page_size(&mut self, page_size: Option<u32>) {
        if self.query.page_size != page_size {
            self.query.page_size = page_size;
            self.reset();
        }
    }

    /// Number of pages for the reported total, given the page length
    /// actually observed.
    pub fn total_pages(&self, page_len: usize) -> u64 {
        let per_page = self
            .query
            .page_size
            .map(u64::from)
            .unwrap_or(page_len as u64)
            .max(1);
        self.total.div_ceil(per_page).max(1)
    }

    fn reset(&mut self) {
        self.query.page = 1;
        self.has_next = false;
        self.has_previous = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(count: u64, next: bool, previous: bool) -> Page<i64> {
        Page {
            count,
            next: next.then(|| "http://api/blog/posts/?page=2".to_string()),
            previous: previous.then(|| "http://api/blog/posts/?page=1".to_string()),
            results: vec![1, 2, 3, 4],
        }
    }

    #[test]
    fn test_listing_accepts_plain_array() {
        let listing: Listing<i64> = serde_json::from_str("[1, 2, 3]").unwrap();
        let page = listing.into_page();
        assert_eq!(page.count, 3);
        assert!(!page.has_next());
    }

    #[test]
    fn test_listing_accepts_page_object() {
        let listing: Listing<i64> = serde_json::from_str(
            r#"{"count": 9, "next": "http://x/?page=2", "previous": null, "results": [1]}"#,
        )
        .unwrap();
        let page = listing.into_page();
        assert_eq!(page.count, 9);
        assert!(page.has_next());
        assert!(!page.has_previous());
    }

    #[test]
    fn test_query_pairs_skip_blank_search() {
        let query = PageQuery {
            page: 2,
            page_size: None,
            search: Some("   ".into()),
            category: Some(4),
        };
        assert_eq!(
            query.to_pairs(),
            vec![("page", "2".to_string()), ("category", "4".to_string())]
        );
    }

    #[test]
    fn test_next_page_requires_next_link() {
        let mut pager = Pager::new();
        assert!(!pager.next_page());

        pager.update(&page(10, true, false));
        assert!(pager.next_page());
        assert_eq!(pager.current_page(), 2);
    }

    #[test]
    fn test_prev_page_stops_at_first() {
        let mut pager = Pager::new();
        pager.update(&page(10, true, true));
        assert!(!pager.prev_page());
        assert_eq!(pager.current_page(), 1);
    }

    #[test]
    fn test_filter_change_resets_to_first_page() {
        let mut pager = Pager::new();
        pager.update(&page(20, true, false));
        pager.next_page();
        pager.update(&page(20, true, true));
        pager.next_page();
        assert_eq!(pager.current_page(), 3);

        pager.set_search(Some("rust".into()));
        assert_eq!(pager.current_page(), 1);
        assert_eq!(pager.query().search.as_deref(), Some("rust"));
    }

    #[test]
    fn test_same_filter_keeps_page() {
        let mut pager = Pager::new();
        pager.set_category(Some(2));
        pager.update(&page(20, true, false));
        pager.next_page();
        pager.set_category(Some(2));
        assert_eq!(pager.current_page(), 2);
    }

    #[test]
    fn test_category_zero_means_all() {
        let mut pager = Pager::new();
        pager.set_category(Some(0));
        assert_eq!(pager.query().category, None);
    }

    #[test]
    fn test_total_pages() {
        let mut pager = Pager::new();
        pager.update(&page(10, true, false));
        assert_eq!(pager.total_pages(4), 3);
        assert_eq!(pager.total_pages(0), 10);
    }
}
