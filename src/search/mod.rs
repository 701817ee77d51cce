pub mod client;
pub mod query;

pub use client::{
    FacetCount, FacetValue, HttpSearchBackend, MultiSearchResponse, SearchBackend, SearchError,
    SearchResult,
};
pub use query::{build_request, query_fingerprint, MultiSearchRequest, SearchParams};
