use crate::fetch::SearchPage;
use crate::models::Event;
use crate::search::FacetCount;

/// Page counter, accumulated events and the idle/loading flag for one schedule session.
#[derive(Debug, Clone)]
pub struct PaginationState {
    page: u32,
    per_page: u32,
    exact: bool,
    events: Vec<Event>,
    has_more: bool,
    loading: bool,
    found: Option<u64>,
    facets: Vec<FacetCount>,
}

impl PaginationState {
    pub fn new(per_page: u32, exact: bool) -> Self {
        Self {
            page: 1,
            per_page,
            exact,
            events: Vec::new(),
            has_more: true,
            loading: false,
            found: None,
            facets: Vec::new(),
        }
    }

    /// Moves idle -> loading and returns the page to request.
    ///
    /// `None` while a load is in flight or once the last page has been seen.
    pub fn begin_load(&mut self) -> Option<u32> {
        if self.loading || !self.has_more {
            return None;
        }
        self.loading = true;
        Some(self.page)
    }

    /// Appends a fetched page and returns to idle.
    pub fn complete(&mut self, page: SearchPage) {
        let received = page.events.len();
        self.events.extend(page.events);
        if page.found.is_some() {
            self.found = page.found;
        }
        if !page.facets.is_empty() {
            self.facets = page.facets;
        }

        self.has_more = match (self.exact, self.found) {
            (true, Some(found)) => (self.events.len() as u64) < found,
            _ => received == self.per_page as usize,
        };
        self.page += 1;
        self.loading = false;
    }

    /// Returns to idle keeping whatever was already loaded.
    pub fn fail(&mut self) {
        self.loading = false;
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.per_page, self.exact);
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn found(&self) -> Option<u64> {
        self.found
    }

    pub fn facets(&self) -> &[FacetCount] {
        &self.facets
    }

    /// The "load more" control is shown only when idle with data left.
    pub fn can_load_more(&self) -> bool {
        !self.loading && self.has_more
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::event;

    fn page(ids: &[&str], found: Option<u64>) -> SearchPage {
        SearchPage {
            events: ids
                .iter()
                .map(|id| event(id, "07/12 (sábado)", "Palco", 0))
                .collect(),
            found,
            facets: Vec::new(),
            from_cache: false,
        }
    }

    #[test]
    fn starts_idle_on_page_one() {
        let state = PaginationState::new(2, false);
        assert_eq!(state.page(), 1);
        assert!(state.has_more());
        assert!(!state.is_loading());
        assert!(state.events().is_empty());
    }

    #[test]
    fn second_begin_is_refused_while_loading() {
        let mut state = PaginationState::new(2, false);
        assert_eq!(state.begin_load(), Some(1));
        assert!(!state.can_load_more());
        assert_eq!(state.begin_load(), None);
        state.complete(page(&["a", "b"], None));
        assert_eq!(state.begin_load(), Some(2));
    }

    #[test]
    fn short_page_ends_pagination() {
        let mut state = PaginationState::new(2, false);
        state.begin_load();
        state.complete(page(&["a", "b"], None));
        assert!(state.has_more());
        state.begin_load();
        state.complete(page(&["c"], None));
        assert!(!state.has_more());
        assert_eq!(state.page(), 3);
        assert_eq!(state.begin_load(), None);
    }

    #[test]
    fn accumulation_keeps_duplicates() {
        let mut state = PaginationState::new(1, false);
        state.begin_load();
        state.complete(page(&["a"], None));
        state.begin_load();
        state.complete(page(&["a"], None));
        assert_eq!(state.events().len(), 2);
    }

    #[test]
    fn failure_keeps_prior_state() {
        let mut state = PaginationState::new(2, false);
        state.begin_load();
        state.complete(page(&["a", "b"], None));
        assert_eq!(state.begin_load(), Some(2));
        state.fail();
        assert!(!state.is_loading());
        assert_eq!(state.page(), 2);
        assert_eq!(state.events().len(), 2);
        assert_eq!(state.begin_load(), Some(2));
    }

    #[test]
    fn exact_mode_stops_on_found_count() {
        let mut state = PaginationState::new(2, true);
        state.begin_load();
        state.complete(page(&["a", "b"], Some(4)));
        assert!(state.has_more());
        state.begin_load();
        state.complete(page(&["c", "d"], Some(4)));
        assert!(!state.has_more());
    }

    #[test]
    fn exact_mode_without_found_falls_back_to_page_size() {
        let mut state = PaginationState::new(2, true);
        state.begin_load();
        state.complete(page(&["a", "b"], None));
        assert!(state.has_more());
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut state = PaginationState::new(2, false);
        state.begin_load();
        state.complete(page(&["a"], Some(1)));
        state.reset();
        assert_eq!(state.page(), 1);
        assert!(state.has_more());
        assert!(state.events().is_empty());
        assert_eq!(state.found(), None);
    }
}
