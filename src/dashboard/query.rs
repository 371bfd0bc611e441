use crate::models::{DateRange, DraftListQuery, StatusFilter};

/// Owns the current listing query. Every mutator reports whether the query changed.
#[derive(Debug, Default)]
pub struct QueryState {
    query: DraftListQuery,
}

impl QueryState {
    pub fn query(&self) -> &DraftListQuery {
        &self.query
    }

    pub fn set_status(&mut self, status: StatusFilter) -> bool {
        let changed = self.query.status != status || self.query.page != 1;
        self.query.status = status;
        self.query.page = 1;
        changed
    }

    pub fn set_date_range(&mut self, date_range: DateRange) -> bool {
        let changed = self.query.date_range != date_range || self.query.page != 1;
        self.query.date_range = date_range;
        self.query.page = 1;
        changed
    }

    /// Page is left alone here; it is reset when the debounced search fires.
    pub fn set_search(&mut self, search: &str) -> bool {
        if self.query.search == search {
            return false;
        }
        self.query.search = search.to_string();
        true
    }

    pub fn set_page(&mut self, page: u32) -> bool {
        let changed = self.query.page != page;
        self.query.page = page;
        changed
    }

    pub fn reset_page(&mut self) {
        self.query.page = 1;
    }

    pub fn clear_all(&mut self) {
        self.query = DraftListQuery::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DraftStatus;

    #[test]
    fn test_status_and_date_range_reset_page() {
        let mut state = QueryState::default();
        state.set_page(5);

        assert!(state.set_status(StatusFilter::Only(DraftStatus::Sent)));
        assert_eq!(state.query().page, 1);

        state.set_page(3);
        assert!(state.set_date_range(DateRange::Week));
        assert_eq!(state.query().page, 1);
        assert_eq!(state.query().status, StatusFilter::Only(DraftStatus::Sent));
    }

    #[test]
    fn test_search_does_not_reset_page() {
        let mut state = QueryState::default();
        state.set_page(4);

        assert!(state.set_search("acme"));
        assert_eq!(state.query().page, 4);
        assert_eq!(state.query().search, "acme");
        assert!(!state.set_search("acme"));
    }

    #[test]
    fn test_set_page_touches_only_page() {
        let mut state = QueryState::default();
        state.set_status(StatusFilter::Only(DraftStatus::Failed));
        state.set_search("q3");

        assert!(state.set_page(7));
        assert!(!state.set_page(7));
        assert_eq!(state.query().page, 7);
        assert_eq!(state.query().search, "q3");
        assert_eq!(state.query().status, StatusFilter::Only(DraftStatus::Failed));
    }

    #[test]
    fn test_set_page_accepts_out_of_range_values() {
        let mut state = QueryState::default();
        state.set_page(0);
        assert_eq!(state.query().page, 0);
        state.set_page(9_999);
        assert_eq!(state.query().page, 9_999);
    }

    #[test]
    fn test_same_status_on_first_page_is_no_change() {
        let mut state = QueryState::default();
        assert!(!state.set_status(StatusFilter::All));

        state.set_page(2);
        assert!(state.set_status(StatusFilter::All));
    }

    #[test]
    fn test_clear_all_restores_defaults() {
        let mut state = QueryState::default();
        state.set_status(StatusFilter::Only(DraftStatus::Generated));
        state.set_date_range(DateRange::Month);
        state.set_search("renewal");
        state.set_page(6);

        state.clear_all();
        assert_eq!(state.query(), &DraftListQuery::default());
    }
}
