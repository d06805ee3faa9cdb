//! Similarity scoring between a query vector and one candidate vector.
//!
//! Both modes are pure functions with no shared state, safe to evaluate
//! concurrently across candidates.

use crate::error::{RecommendError, RecommendResult};
use crate::models::ScoringMode;

/// Score one candidate against the query vector.
///
/// Fails with `DimensionMismatch` when the lengths differ, for every mode.
/// In cosine mode a zero norm on either side yields `0.0` rather than
/// dividing by zero.
pub fn score(query: &[f64], candidate: &[f64], mode: ScoringMode) -> RecommendResult<f64> {
    if query.len() != candidate.len() {
        return Err(RecommendError::DimensionMismatch {
            query: query.len(),
            candidate: candidate.len(),
        });
    }

    let dot: f64 = query.iter().zip(candidate).map(|(q, c)| q * c).sum();

    match mode {
        ScoringMode::Dot => Ok(dot),
        ScoringMode::Cosine => {
            let query_norm = norm(query);
            let candidate_norm = norm(candidate);

            if query_norm == 0.0 || candidate_norm == 0.0 {
                return Ok(0.0);
            }

            Ok(dot / (query_norm * candidate_norm))
        }
    }
}

fn norm(values: &[f64]) -> f64 {
    values.iter().map(|v| v * v).sum::<f64>().sqrt()
}
