use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::db::Store;
use crate::models::Event;

pub const FAVORITES_KEY: &str = "favorites";

#[derive(Debug, Error)]
pub enum FavoritesError {
    #[error("favorites storage error: {0}")]
    Storage(#[from] rusqlite::Error),
    #[error("favorites serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("favorites mutex poisoned")]
    Poisoned,
}

/// User-curated events, keyed by id and written through on every toggle.
pub struct FavoritesStore {
    store: Arc<Store>,
    items: Mutex<Vec<Event>>,
}

impl FavoritesStore {
    /// Hydrates from storage. Unparseable data starts an empty list.
    pub fn load(store: Arc<Store>) -> Result<Self, FavoritesError> {
        let items = match store.get(FAVORITES_KEY)? {
            Some(raw) => match serde_json::from_str::<Vec<Event>>(&raw) {
                Ok(list) => dedup_by_id(list),
                Err(err) => {
                    tracing::warn!(%err, "stored favorites unreadable, starting empty");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        tracing::debug!(count = items.len(), "favorites loaded");
        Ok(Self {
            store,
            items: Mutex::new(items),
        })
    }

    /// Adds `event` if absent, removes it if present, then persists the whole list.
    ///
    /// Returns whether the event is a favorite afterwards. On a failed write the
    /// in-memory list is left as it was.
    pub fn toggle(&self, event: &Event) -> Result<bool, FavoritesError> {
        let mut items = self.items.lock().map_err(|_| FavoritesError::Poisoned)?;
        let mut next = items.clone();
        let now_favorite = match next.iter().position(|item| item.id == event.id) {
            Some(index) => {
                next.remove(index);
                false
            }
            None => {
                next.push(event.clone());
                true
            }
        };

        let payload = serde_json::to_string(&next)?;
        self.store.set(FAVORITES_KEY, &payload)?;
        *items = next;

        tracing::debug!(id = %event.id, now_favorite, "favorite toggled");
        Ok(now_favorite)
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.items
            .lock()
            .map(|items| items.iter().any(|item| item.id == id))
            .unwrap_or(false)
    }

    pub fn list(&self) -> Vec<Event> {
        self.items
            .lock()
            .map(|items| items.clone())
            .unwrap_or_default()
    }
}

fn dedup_by_id(list: Vec<Event>) -> Vec<Event> {
    let mut out: Vec<Event> = Vec::with_capacity(list.len());
    for event in list {
        if !out.iter().any(|existing| existing.id == event.id) {
            out.push(event);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::event;
    use std::collections::HashSet;

    fn ids(store: &FavoritesStore) -> HashSet<String> {
        store.list().into_iter().map(|e| e.id).collect()
    }

    #[test]
    fn toggle_adds_then_removes() {
        let favorites = FavoritesStore::load(Arc::new(Store::open_in_memory().unwrap())).unwrap();
        let e = event("1", "07/12 (sábado)", "Palco", 0);

        assert!(!favorites.is_favorite("1"));
        assert!(favorites.toggle(&e).unwrap());
        assert!(favorites.is_favorite("1"));
        assert!(!favorites.toggle(&e).unwrap());
        assert!(!favorites.is_favorite("1"));
    }

    #[test]
    fn double_toggle_restores_prior_set() {
        let favorites = FavoritesStore::load(Arc::new(Store::open_in_memory().unwrap())).unwrap();
        favorites.toggle(&event("a", "d", "v", 0)).unwrap();
        favorites.toggle(&event("b", "d", "v", 0)).unwrap();
        let before = ids(&favorites);

        let c = event("c", "d", "v", 0);
        favorites.toggle(&c).unwrap();
        favorites.toggle(&c).unwrap();
        assert_eq!(ids(&favorites), before);

        let a = event("a", "d", "v", 0);
        favorites.toggle(&a).unwrap();
        favorites.toggle(&a).unwrap();
        assert_eq!(ids(&favorites), before);
    }

    #[test]
    fn identity_is_the_id_only() {
        let favorites = FavoritesStore::load(Arc::new(Store::open_in_memory().unwrap())).unwrap();
        favorites.toggle(&event("1", "d", "Palco", 0)).unwrap();
        let renamed = event("1", "other day", "Other venue", 99);
        assert!(!favorites.toggle(&renamed).unwrap());
        assert!(favorites.list().is_empty());
    }

    #[test]
    fn every_toggle_is_persisted() {
        let store = Arc::new(Store::open_in_memory().unwrap());
        let favorites = FavoritesStore::load(store.clone()).unwrap();
        favorites.toggle(&event("1", "d", "v", 0)).unwrap();
        favorites.toggle(&event("2", "d", "v", 0)).unwrap();

        let reloaded = FavoritesStore::load(store).unwrap();
        let listed: Vec<_> = reloaded.list().into_iter().map(|e| e.id).collect();
        assert_eq!(listed, ["1", "2"]);
    }

    #[test]
    fn duplicates_in_storage_collapse_on_load() {
        let store = Arc::new(Store::open_in_memory().unwrap());
        let list = vec![
            event("1", "d", "first", 0),
            event("1", "d", "second", 0),
            event("2", "d", "v", 0),
        ];
        store
            .set(FAVORITES_KEY, &serde_json::to_string(&list).unwrap())
            .unwrap();
        let favorites = FavoritesStore::load(store).unwrap();
        let listed = favorites.list();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].local, "first");
    }

    #[test]
    fn corrupt_storage_starts_empty() {
        let store = Arc::new(Store::open_in_memory().unwrap());
        store.set(FAVORITES_KEY, "not json").unwrap();
        let favorites = FavoritesStore::load(store).unwrap();
        assert!(favorites.list().is_empty());
    }
}
