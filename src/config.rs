use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils;

const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8108/multi_search";
const DEFAULT_COLLECTION: &str = "events";
const DEFAULT_SORT: &str = "_text_match:desc,localOrder:asc,startDate:asc";
const DEFAULT_FACETS: &str = "day,local,type";
const DEFAULT_LOCALE: &str = "pt-BR";
const DEFAULT_PER_PAGE: u32 = 20;
const DEFAULT_CACHE_TTL_SECS: u64 = 60 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("config mutex poisoned")]
    Poisoned,
}

/// Everything the fetch pipeline needs to talk to the hosted search service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub collection: String,
    pub query: String,
    pub query_by: Vec<String>,
    pub query_by_weights: Vec<u32>,
    pub sort_by: String,
    pub facet_by: String,
    pub locale: String,
    /// Lower bound for `endDate`, in seconds. `None` means "now".
    pub min_end_date: Option<i64>,
    /// Day labels to restrict the grid to. Empty means no day filter.
    pub days: Vec<String>,
    pub per_page: u32,
    /// Append a facet-only sub-search to every request.
    pub facet_search: bool,
    pub cache_enabled: bool,
    pub cache_ttl_secs: u64,
    /// Use the server `found` count instead of the full-page heuristic.
    pub exact_has_more: bool,
    pub request_timeout_secs: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            collection: DEFAULT_COLLECTION.to_string(),
            query: "*".to_string(),
            query_by: vec!["title".into(), "local".into(), "type".into()],
            query_by_weights: vec![3, 2, 1],
            sort_by: DEFAULT_SORT.to_string(),
            facet_by: DEFAULT_FACETS.to_string(),
            locale: DEFAULT_LOCALE.to_string(),
            min_end_date: None,
            days: vec!["07/12 (sábado)".into(), "08/12 (domingo)".into()],
            per_page: DEFAULT_PER_PAGE,
            facet_search: true,
            cache_enabled: true,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            exact_has_more: false,
            request_timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub search: SearchConfig,
    pub log_level: Option<String>,
}

impl AppConfig {
    /// Applies `SEARCH_*` environment variables on top of the stored values.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(endpoint) = std::env::var("SEARCH_ENDPOINT") {
            self.search.endpoint = endpoint;
        }
        if let Ok(key) = std::env::var("SEARCH_API_KEY") {
            self.search.api_key = Some(key);
        }
        if let Ok(collection) = std::env::var("SEARCH_COLLECTION") {
            self.search.collection = collection;
        }
        if let Some(per_page) = std::env::var("SEARCH_PER_PAGE")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .filter(|n| *n > 0)
        {
            self.search.per_page = per_page;
        }
        if let Some(ttl) = std::env::var("SEARCH_CACHE_TTL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            self.search.cache_ttl_secs = ttl;
        }
        self
    }
}

pub struct ConfigStore {
    path: PathBuf,
    data: Mutex<AppConfig>,
}

impl ConfigStore {
    pub fn load() -> Self {
        Self::open(utils::config_path())
    }

    /// Opens the config at `path`, falling back to defaults when it is missing or unreadable.
    pub fn open(path: PathBuf) -> Self {
        let data = match read_config(&path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = ?path, %err, "config unreadable, using defaults");
                AppConfig::default()
            }
        };
        Self {
            path,
            data: Mutex::new(data),
        }
    }

    pub fn read(&self) -> AppConfig {
        self.data.lock().expect("config mutex poisoned").clone()
    }

    pub fn update<F>(&self, transform: F) -> Result<AppConfig, ConfigError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut guard = self.data.lock().map_err(|_| ConfigError::Poisoned)?;
        let mut next = guard.clone();
        transform(&mut next);
        write_config(&self.path, &next)?;
        *guard = next;
        tracing::debug!(path = ?self.path, "config saved");
        Ok(guard.clone())
    }
}

fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn write_config(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    utils::ensure_parent(path);
    let contents = serde_json::to_string_pretty(config)?;
    fs::write(path, contents)?;
    Ok(())
}
