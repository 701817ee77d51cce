use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::db::Store;
use crate::models::Event;

pub const EVENTS_KEY: &str = "events_cache";
pub const TIMESTAMP_KEY: &str = "events_cache_timestamp";
pub const QUERY_KEY: &str = "events_cache_query";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache storage error: {0}")]
    Storage(#[from] rusqlite::Error),
    #[error("cache parse error: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub events: Vec<Event>,
    pub captured_at_ms: i64,
}

impl CacheEntry {
    pub fn is_valid(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now.timestamp_millis() - self.captured_at_ms < ttl.num_milliseconds()
    }
}

/// Time-bounded snapshot of the first page of events, tied to the query
/// fingerprint it was captured under.
pub struct EventCache {
    store: Arc<Store>,
    ttl: Duration,
    query: String,
}

impl EventCache {
    pub fn new(store: Arc<Store>, ttl: Duration, query: impl Into<String>) -> Self {
        Self {
            store,
            ttl,
            query: query.into(),
        }
    }

    /// Entries written under another query, or without one, are misses.
    pub fn load(&self) -> Result<Option<CacheEntry>, CacheError> {
        let query = self.store.get(QUERY_KEY)?;
        if query.as_deref() != Some(self.query.as_str()) {
            if query.is_some() {
                tracing::debug!("event cache belongs to another query");
            }
            return Ok(None);
        }
        let (events, stamp) = match (self.store.get(EVENTS_KEY)?, self.store.get(TIMESTAMP_KEY)?) {
            (Some(events), Some(stamp)) => (events, stamp),
            _ => return Ok(None),
        };
        let captured_at_ms = stamp
            .trim()
            .parse::<i64>()
            .map_err(|err| CacheError::Parse(format!("timestamp {stamp:?}: {err}")))?;
        let events: Vec<Event> =
            serde_json::from_str(&events).map_err(|err| CacheError::Parse(err.to_string()))?;
        Ok(Some(CacheEntry {
            events,
            captured_at_ms,
        }))
    }

    /// Returns the cached events only while the entry is younger than the ttl.
    pub fn load_valid(&self, now: DateTime<Utc>) -> Result<Option<Vec<Event>>, CacheError> {
        Ok(self
            .load()?
            .filter(|entry| entry.is_valid(now, self.ttl))
            .map(|entry| entry.events))
    }

    pub fn save(&self, events: &[Event], now: DateTime<Utc>) -> Result<(), CacheError> {
        let payload =
            serde_json::to_string(events).map_err(|err| CacheError::Parse(err.to_string()))?;
        let stamp = now.timestamp_millis().to_string();
        self.store
            .set_many(&[
                (EVENTS_KEY, payload.as_str()),
                (TIMESTAMP_KEY, stamp.as_str()),
                (QUERY_KEY, self.query.as_str()),
            ])?;
        tracing::debug!(count = events.len(), "event cache refreshed");
        Ok(())
    }

    pub fn clear(&self) -> Result<(), CacheError> {
        self.store.remove(&[EVENTS_KEY, TIMESTAMP_KEY, QUERY_KEY])?;
        Ok(())
    }
}
