use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::config::SearchConfig;

/// Body of a `multi_search` request.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MultiSearchRequest {
    pub searches: Vec<SearchParams>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchParams {
    pub collection: String,
    pub q: String,
    pub query_by: String,
    pub query_by_weights: String,
    pub sort_by: String,
    pub facet_by: String,
    pub filter_by: String,
    pub per_page: u32,
    pub page: u32,
}

/// Builds the request for `page` (1-based). The end-time bound falls back to `now`.
pub fn build_request(config: &SearchConfig, page: u32, now: DateTime<Utc>) -> MultiSearchRequest {
    let filter_by = filter_clause(config, now);
    let primary = SearchParams {
        collection: config.collection.clone(),
        q: config.query.clone(),
        query_by: config.query_by.join(","),
        query_by_weights: config
            .query_by_weights
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(","),
        sort_by: config.sort_by.clone(),
        facet_by: config.facet_by.clone(),
        filter_by,
        per_page: config.per_page.max(1),
        page: page.max(1),
    };

    let mut searches = Vec::with_capacity(2);
    if config.facet_search {
        let facets = SearchParams {
            per_page: 0,
            page: 1,
            ..primary.clone()
        };
        searches.push(primary);
        searches.push(facets);
    } else {
        searches.push(primary);
    }

    MultiSearchRequest { searches }
}

/// Hex sha256 over every setting that shapes the returned hits.
/// A cached page is only reusable while this stays the same.
pub fn query_fingerprint(config: &SearchConfig) -> String {
    let min_end = config
        .min_end_date
        .map(|bound| bound.to_string())
        .unwrap_or_else(|| "now".to_string());
    let weights = config
        .query_by_weights
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(",");
    let per_page = config.per_page.max(1).to_string();
    let days = config.days.join("`");
    let query_by = config.query_by.join(",");
    let fields = [
        config.endpoint.as_str(),
        config.collection.as_str(),
        config.query.as_str(),
        query_by.as_str(),
        weights.as_str(),
        config.sort_by.as_str(),
        config.facet_by.as_str(),
        config.locale.as_str(),
        min_end.as_str(),
        days.as_str(),
        per_page.as_str(),
    ];

    let mut hasher = Sha256::new();
    for field in fields {
        hasher.update(field.as_bytes());
        hasher.update(b"\x1f");
    }
    format!("{:x}", hasher.finalize())
}

fn filter_clause(config: &SearchConfig, now: DateTime<Utc>) -> String {
    let bound = config.min_end_date.unwrap_or_else(|| now.timestamp());
    let mut clauses = vec![
        format!("locale:={}", config.locale),
        format!("endDate:>={bound}"),
    ];
    if !config.days.is_empty() {
        let days = config
            .days
            .iter()
            .map(|day| format!("`{}`", day.replace('`', "")))
            .collect::<Vec<_>>()
            .join(",");
        clauses.push(format!("day:=[{days}]"));
    }
    clauses.join(" && ")
}
