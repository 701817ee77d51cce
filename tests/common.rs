#![allow(dead_code)]
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use ccxp_agenda_lib::search::client::Hit;
use ccxp_agenda_lib::search::{
    MultiSearchRequest, MultiSearchResponse, SearchBackend, SearchError, SearchResult,
};
use ccxp_agenda_lib::models::EventDocument;
use ccxp_agenda_lib::{Clock, EventFetcher, ScheduleService, SearchConfig, Store};
use chrono::{DateTime, Duration, TimeZone, Utc};

/// Serves `documents` page by page, counting requests.
pub struct PagedBackend {
    documents: Vec<serde_json::Value>,
    calls: AtomicUsize,
}

impl PagedBackend {
    pub fn new(documents: Vec<serde_json::Value>) -> Arc<Self> {
        Arc::new(Self {
            documents,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchBackend for PagedBackend {
    async fn multi_search(
        &self,
        request: &MultiSearchRequest,
    ) -> Result<MultiSearchResponse, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut results = Vec::new();
        for search in &request.searches {
            let per_page = search.per_page as usize;
            let start = (search.page as usize - 1) * per_page;
            let mut hits = Vec::new();
            for raw in self.documents.iter().skip(start).take(per_page) {
                let document: EventDocument = serde_json::from_value(raw.clone())
                    .map_err(|e| SearchError::Parse(e.to_string()))?;
                hits.push(Hit { document });
            }
            results.push(SearchResult {
                hits,
                found: Some(self.documents.len() as u64),
                facet_counts: Vec::new(),
                error: None,
            });
        }
        Ok(MultiSearchResponse { results })
    }
}

pub struct TestClock(Mutex<DateTime<Utc>>);

impl TestClock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self(Mutex::new(
            Utc.with_ymd_and_hms(2024, 12, 7, 10, 0, 0).unwrap(),
        )))
    }

    pub fn advance(&self, by: Duration) {
        *self.0.lock().unwrap() += by;
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

pub fn document(id: &str, title: &str, day: &str, local: &str, start: i64) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": title,
        "day": day,
        "local": local,
        "startDate": start,
    })
}

pub fn schedule(
    backend: Arc<PagedBackend>,
    store: Arc<Store>,
    clock: Arc<TestClock>,
    per_page: u32,
) -> ScheduleService {
    let config = SearchConfig {
        per_page,
        ..SearchConfig::default()
    };
    ScheduleService::new(EventFetcher::new(config, backend, store, clock))
}
