use std::sync::Mutex;

use serde::Serialize;

use crate::fetch::EventFetcher;
use crate::grouping::{group_events, DayGroup};
use crate::pagination::PaginationState;
use crate::search::FacetCount;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoadOutcome {
    Loaded { count: usize, from_cache: bool },
    /// Nothing requested: a load is already running or there is no more data.
    Skipped,
    /// The fetch failed; state is unchanged apart from leaving `loading`.
    Failed,
}

/// Snapshot handed to the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleView {
    pub days: Vec<DayGroup>,
    pub total: usize,
    pub page: u32,
    pub has_more: bool,
    pub loading: bool,
    pub found: Option<u64>,
    pub facets: Vec<FacetCount>,
}

/// Owns the event list for one session and drives pagination against the fetcher.
pub struct ScheduleService {
    fetcher: EventFetcher,
    state: Mutex<PaginationState>,
}

impl ScheduleService {
    pub fn new(fetcher: EventFetcher) -> Self {
        let state = PaginationState::new(fetcher.per_page(), fetcher.config().exact_has_more);
        Self {
            fetcher,
            state: Mutex::new(state),
        }
    }

    /// Fetches the next page and appends it. Errors are logged, never returned.
    pub async fn load_more(&self) -> LoadOutcome {
        let page = match self.with_state(|state| state.begin_load()) {
            Some(page) => page,
            None => {
                tracing::debug!("load skipped: busy or exhausted");
                return LoadOutcome::Skipped;
            }
        };

        match self.fetcher.fetch_page(page).await {
            Ok(result) => {
                let count = result.events.len();
                let from_cache = result.from_cache;
                self.with_state(|state| state.complete(result));
                tracing::debug!(page, count, from_cache, "page loaded");
                LoadOutcome::Loaded { count, from_cache }
            }
            Err(err) => {
                tracing::warn!(page, %err, "failed to load events");
                self.with_state(|state| state.fail());
                LoadOutcome::Failed
            }
        }
    }

    /// Loads the first page only if nothing has been loaded yet.
    pub async fn load_initial(&self) -> LoadOutcome {
        let fresh = self.with_state(|state| state.page() == 1 && state.events().is_empty());
        if fresh {
            self.load_more().await
        } else {
            LoadOutcome::Skipped
        }
    }

    /// Drops the cache and accumulated list, then loads page one again.
    pub async fn reload(&self) -> LoadOutcome {
        let idle = self.with_state(|state| {
            if state.is_loading() {
                return false;
            }
            state.reset();
            true
        });
        if !idle {
            return LoadOutcome::Skipped;
        }
        self.fetcher.invalidate_cache();
        self.load_more().await
    }

    /// Drops the cached first page without touching the loaded list.
    pub fn invalidate_cache(&self) {
        self.fetcher.invalidate_cache();
    }

    pub fn view(&self) -> ScheduleView {
        self.with_state(|state| ScheduleView {
            days: group_events(state.events()),
            total: state.events().len(),
            page: state.page(),
            has_more: state.has_more(),
            loading: state.is_loading(),
            found: state.found(),
            facets: state.facets().to_vec(),
        })
    }

    pub fn state(&self) -> PaginationState {
        self.with_state(|state| state.clone())
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut PaginationState) -> T) -> T {
        let mut guard = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut guard)
    }
}
