pub mod cache;
pub mod clock;
pub mod config;
pub mod db;
pub mod favorites;
pub mod fetch;
pub mod grouping;
pub mod import;
pub mod logging;
pub mod models;
pub mod pagination;
pub mod schedule;
pub mod search;
mod utils;

#[cfg(feature = "desktop")]
mod desktop;
#[cfg(test)]
mod testing;

pub use cache::{CacheEntry, EventCache};
pub use clock::{Clock, SystemClock};
pub use config::{AppConfig, ConfigStore, SearchConfig};
pub use db::Store;
pub use favorites::FavoritesStore;
pub use fetch::{EventFetcher, FetchError, SearchPage};
pub use grouping::{group_events, venues_for_day, DayGroup, VenueGroup};
pub use models::Event;
pub use pagination::PaginationState;
pub use schedule::{LoadOutcome, ScheduleService, ScheduleView};

#[cfg(feature = "desktop")]
pub use desktop::run;
