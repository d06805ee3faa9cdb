use async_trait::async_trait;

use crate::error::RecommendResult;
use crate::models::{Document, SearchHit};
use crate::query::ScoredQuery;

/// Repository trait over the opaque document store.
///
/// Point lookups, searches, and bulk fetches are independent I/O operations;
/// timeouts and retry policy belong to the implementation, not this contract.
/// A fetched document is correct-as-of-read-time; no snapshot isolation is
/// provided across calls.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a single document by id. `None` when the id is absent.
    async fn get(&self, collection: &str, id: &str) -> RecommendResult<Option<Document>>;

    /// Execute a vector re-scored search. Hits come back ranked by strictly
    /// non-increasing re-score value, at most `query.limit` of them.
    async fn scored_search(
        &self,
        collection: &str,
        query: ScoredQuery,
    ) -> RecommendResult<Vec<SearchHit>>;

    /// Execute a plain text query sorted descending on a document field.
    /// No vector scoring is applied.
    async fn sorted_search(
        &self,
        collection: &str,
        query: &str,
        sort_field: &str,
        size: usize,
    ) -> RecommendResult<Vec<SearchHit>>;

    /// Fetch several documents by id, restricted to the given source fields.
    /// Absent ids are omitted from the result.
    async fn multi_get(
        &self,
        collection: &str,
        ids: Vec<String>,
        fields: Vec<String>,
    ) -> RecommendResult<Vec<Document>>;
}
