//! Reversible codec between a dense factor vector and the position-tagged
//! token string stored in the text-indexed vector field.

use crate::error::{RecommendError, RecommendResult};

/// Encode a factor vector into `position|value` tokens joined by single
/// spaces, in index order.
///
/// Values use the shortest decimal form that round-trips exactly through
/// `f64` parsing, so `decode(&encode(v)) == v` for finite inputs; `1.0`
/// encodes as `"1.0"`, not `"1"`.
pub fn encode(values: &[f64]) -> String {
    values
        .iter()
        .enumerate()
        .map(|(position, value)| format!("{}|{:?}", position, value))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Decode an encoded payload back into a factor vector.
///
/// Tokens are consumed in order; the writer emits them in position order and
/// decode does not re-sort. Each token is split at the `|` delimiter and the
/// second segment parsed as `f64`.
pub fn decode(payload: &str) -> RecommendResult<Vec<f64>> {
    if payload.trim().is_empty() {
        return Err(RecommendError::EmptyPayload);
    }

    payload
        .split_whitespace()
        .map(|token| {
            let value = token.split('|').nth(1).ok_or_else(|| {
                RecommendError::MalformedPayload(format!(
                    "token '{}' lacks the '|' delimiter",
                    token
                ))
            })?;

            value.parse::<f64>().map_err(|_| {
                RecommendError::MalformedPayload(format!("value '{}' is not a number", value))
            })
        })
        .collect()
}
