use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::query::MultiSearchRequest;
use crate::config::SearchConfig;
use crate::models::EventDocument;

const API_KEY_PARAM: &str = "x-typesense-api-key";

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("http error: {0}")]
    Http(String),
    #[error("search api error: {0}")]
    Api(String),
    #[error("parse error: {0}")]
    Parse(String),
}

#[derive(Debug, Deserialize)]
pub struct MultiSearchResponse {
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub hits: Vec<Hit>,
    pub found: Option<u64>,
    #[serde(default)]
    pub facet_counts: Vec<FacetCount>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Hit {
    pub document: EventDocument,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FacetCount {
    pub field_name: String,
    #[serde(default)]
    pub counts: Vec<FacetValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FacetValue {
    pub value: String,
    pub count: u64,
}

impl MultiSearchResponse {
    /// Fails on the first sub-search that reported an error.
    pub fn check(self) -> Result<Self, SearchError> {
        if let Some(message) = self.results.iter().find_map(|r| r.error.clone()) {
            return Err(SearchError::Api(message));
        }
        if self.results.is_empty() {
            return Err(SearchError::Parse("response has no results".to_string()));
        }
        Ok(self)
    }
}

/// Seam between the fetch pipeline and the hosted search service.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn multi_search(
        &self,
        request: &MultiSearchRequest,
    ) -> Result<MultiSearchResponse, SearchError>;
}

pub struct HttpSearchBackend {
    url: Url,
    client: Client,
}

impl HttpSearchBackend {
    pub fn from_config(config: &SearchConfig) -> Result<Self, SearchError> {
        let mut url =
            Url::parse(&config.endpoint).map_err(|err| SearchError::Http(err.to_string()))?;
        if let Some(key) = config.api_key.as_deref().map(str::trim) {
            if !key.is_empty() {
                url.query_pairs_mut().append_pair(API_KEY_PARAM, key);
            }
        }

        let mut builder = Client::builder().user_agent("ccxp-agenda/0.1");
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|err| SearchError::Http(err.to_string()))?;

        Ok(Self { url, client })
    }
}

#[async_trait]
impl SearchBackend for HttpSearchBackend {
    async fn multi_search(
        &self,
        request: &MultiSearchRequest,
    ) -> Result<MultiSearchResponse, SearchError> {
        let response = self
            .client
            .post(self.url.clone())
            .json(request)
            .send()
            .await
            .map_err(|err| SearchError::Http(err.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| SearchError::Http(err.to_string()))?;

        if !status.is_success() {
            return Err(SearchError::Api(format!("status {}: {}", status, body)));
        }

        let payload: MultiSearchResponse =
            serde_json::from_str(&body).map_err(|err| SearchError::Parse(err.to_string()))?;
        payload.check()
    }
}
