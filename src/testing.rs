//! In-process doubles for the search service and the clock.

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Mutex,
};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::clock::Clock;
use crate::models::{Event, EventDocument};
use crate::search::{
    client::Hit, FacetCount, FacetValue, MultiSearchRequest, MultiSearchResponse, SearchBackend,
    SearchError, SearchResult,
};

pub fn event(id: &str, day: &str, local: &str, start_date: i64) -> Event {
    Event {
        id: id.to_string(),
        title: format!("Event {id}"),
        day: day.to_string(),
        local: local.to_string(),
        start_date,
        end_date: None,
        kind: None,
        local_order: None,
    }
}

/// Serves pages out of a fixed, already-sorted dataset.
pub struct FakeBackend {
    dataset: Vec<Event>,
    calls: AtomicUsize,
    failing: AtomicBool,
    report_found: bool,
}

impl FakeBackend {
    pub fn new(dataset: Vec<Event>) -> Self {
        Self {
            dataset,
            calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
            report_found: true,
        }
    }

    pub fn without_found(mut self) -> Self {
        self.report_found = false;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl SearchBackend for FakeBackend {
    async fn multi_search(
        &self,
        request: &MultiSearchRequest,
    ) -> Result<MultiSearchResponse, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(SearchError::Http("connection refused".to_string()));
        }

        let found = self.report_found.then_some(self.dataset.len() as u64);
        let results = request
            .searches
            .iter()
            .map(|search| {
                let per_page = search.per_page as usize;
                let start = (search.page.max(1) as usize - 1) * per_page;
                let hits = self
                    .dataset
                    .iter()
                    .skip(start)
                    .take(per_page)
                    .map(|event| Hit {
                        document: EventDocument {
                            id: Some(event.id.clone()),
                            title: event.title.clone(),
                            day: event.day.clone(),
                            local: event.local.clone(),
                            start_date: event.start_date,
                            end_date: event.end_date,
                            kind: event.kind.clone(),
                            local_order: event.local_order,
                        },
                    })
                    .collect();
                let facet_counts = if per_page == 0 {
                    vec![FacetCount {
                        field_name: "day".to_string(),
                        counts: vec![FacetValue {
                            value: "07/12 (sábado)".to_string(),
                            count: self.dataset.len() as u64,
                        }],
                    }]
                } else {
                    Vec::new()
                };
                SearchResult {
                    hits,
                    found,
                    facet_counts,
                    error: None,
                }
            })
            .collect();

        Ok(MultiSearchResponse { results })
    }
}

pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Utc.timestamp_opt(1_733_500_000, 0).unwrap()),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}
