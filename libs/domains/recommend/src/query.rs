//! Scored-query construction and the typed re-scoring step.
//!
//! The store executes the text filter; ranking is produced by re-scoring
//! each filter-matched candidate with the mode and query vector carried in
//! the [`ScoredQuery`]. The engine-native scripted scorer of the original
//! index plugin is replaced by this closed set of typed variants.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::ToSchema;

use crate::codec;
use crate::models::{Document, ScoringMode, SearchHit};
use crate::scoring;

/// Universal filter: match every document in the collection.
pub const MATCH_ALL: &str = "*";

/// Counter incremented for every candidate excluded from re-scoring.
pub const CANDIDATES_SKIPPED_COUNTER: &str = "recommend_candidates_skipped_total";

/// A vector re-scored search request against one collection.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScoredQuery {
    /// Text filter expression; [`MATCH_ALL`] selects the whole collection.
    pub filter: String,
    pub mode: ScoringMode,
    pub vector: Vec<f64>,
    /// Maximum number of ranked hits to return.
    pub limit: usize,
}

impl ScoredQuery {
    pub fn new(vector: Vec<f64>, mode: ScoringMode) -> Self {
        Self {
            filter: MATCH_ALL.to_string(),
            mode,
            vector,
            limit: 10,
        }
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn is_match_all(&self) -> bool {
        self.filter.trim() == MATCH_ALL || self.filter.trim().is_empty()
    }

    /// Wire-level filter clause understood by the store.
    pub fn filter_clause(&self) -> Value {
        if self.is_match_all() {
            json!({ "match_all": {} })
        } else {
            json!({ "query_string": { "query": self.filter } })
        }
    }
}

/// Rank candidates by the typed score, descending, keeping the top `limit`.
///
/// A candidate with no model field, an undecodable payload, or a mismatched
/// vector length is excluded from ranking; the exclusion is counted and
/// logged, never surfaced to the caller. Candidates never fail the query.
pub fn rescore(
    query: &[f64],
    mode: ScoringMode,
    candidates: Vec<Document>,
    limit: usize,
) -> Vec<SearchHit> {
    let mut hits: Vec<SearchHit> = Vec::with_capacity(candidates.len());

    for document in candidates {
        let Some(model) = document.model() else {
            skip_candidate(&document.id, "missing_model");
            continue;
        };

        let values = match codec::decode(&model.factor) {
            Ok(values) => values,
            Err(err) => {
                tracing::debug!(doc_id = %document.id, error = %err, "Candidate payload rejected");
                skip_candidate(&document.id, "malformed_payload");
                continue;
            }
        };

        let score = match scoring::score(query, &values, mode) {
            Ok(score) => score,
            Err(err) => {
                tracing::debug!(doc_id = %document.id, error = %err, "Candidate scoring rejected");
                skip_candidate(&document.id, "dimension_mismatch");
                continue;
            }
        };

        hits.push(SearchHit {
            id: document.id,
            score,
            source: document.source,
        });
    }

    hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    hits.truncate(limit);
    hits
}

fn skip_candidate(id: &str, reason: &'static str) {
    metrics::counter!(CANDIDATES_SKIPPED_COUNTER, "reason" => reason).increment(1);
    tracing::warn!(doc_id = %id, reason, "Candidate excluded from re-scoring");
}
