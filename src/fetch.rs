use std::sync::Arc;

use chrono::Duration;
use serde::Serialize;
use thiserror::Error;

use crate::cache::EventCache;
use crate::clock::Clock;
use crate::config::SearchConfig;
use crate::db::Store;
use crate::models::Event;
use crate::search::{build_request, query_fingerprint, FacetCount, SearchBackend, SearchError};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Search(#[from] SearchError),
}

/// One page of events as handed to the pagination controller.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchPage {
    pub events: Vec<Event>,
    pub found: Option<u64>,
    pub facets: Vec<FacetCount>,
    pub from_cache: bool,
}

pub struct EventFetcher {
    config: SearchConfig,
    backend: Arc<dyn SearchBackend>,
    cache: Option<EventCache>,
    clock: Arc<dyn Clock>,
}

impl EventFetcher {
    /// Builds a fetcher; the cache is attached only when `config.cache_enabled`
    /// and only serves entries captured under the same query settings.
    pub fn new(
        config: SearchConfig,
        backend: Arc<dyn SearchBackend>,
        store: Arc<Store>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let cache = config.cache_enabled.then(|| {
            let ttl = Duration::seconds(config.cache_ttl_secs.min(u64::from(u32::MAX)) as i64);
            EventCache::new(store, ttl, query_fingerprint(&config))
        });
        Self {
            config,
            backend,
            cache,
            clock,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn per_page(&self) -> u32 {
        self.config.per_page.max(1)
    }

    pub async fn fetch_page(&self, page: u32) -> Result<SearchPage, FetchError> {
        if page <= 1 {
            if let Some(events) = self.cached_first_page() {
                tracing::debug!(count = events.len(), "serving first page from cache");
                return Ok(SearchPage {
                    events,
                    found: None,
                    facets: Vec::new(),
                    from_cache: true,
                });
            }
        }

        let request = build_request(&self.config, page, self.clock.now());
        tracing::debug!(page, per_page = self.config.per_page, "requesting events");
        let response = self.backend.multi_search(&request).await?;

        let mut results = response.results.into_iter();
        let primary = results
            .next()
            .ok_or_else(|| SearchError::Parse("missing primary result".to_string()))?;
        let found = primary.found;
        let mut facets = primary.facet_counts;
        if let Some(facet_result) = results.next() {
            if !facet_result.facet_counts.is_empty() {
                facets = facet_result.facet_counts;
            }
        }
        let events: Vec<Event> = primary
            .hits
            .into_iter()
            .map(|hit| Event::from(hit.document))
            .collect();

        if page <= 1 {
            self.store_first_page(&events);
        }

        Ok(SearchPage {
            events,
            found,
            facets,
            from_cache: false,
        })
    }

    /// Drops the cached first page, if caching is on.
    pub fn invalidate_cache(&self) {
        if let Some(cache) = &self.cache {
            if let Err(err) = cache.clear() {
                tracing::warn!(%err, "failed to clear event cache");
            }
        }
    }

    fn cached_first_page(&self) -> Option<Vec<Event>> {
        let cache = self.cache.as_ref()?;
        match cache.load_valid(self.clock.now()) {
            Ok(hit) => hit,
            Err(err) => {
                tracing::warn!(%err, "event cache unreadable, fetching instead");
                None
            }
        }
    }

    fn store_first_page(&self, events: &[Event]) {
        if let Some(cache) = &self.cache {
            if let Err(err) = cache.save(events, self.clock.now()) {
                tracing::warn!(%err, "failed to write event cache");
            }
        }
    }
}
