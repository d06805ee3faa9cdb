use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Outcome of a poster lookup.
///
/// Lookup failures are sentinels, not errors: a missing poster or a rejected
/// credential must never fail the surrounding recommendation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Poster {
    Url(String),
    Unavailable,
    CredentialError,
}

/// Trait for poster image providers.
///
/// Implementations resolve a movie database id to an image URL.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PosterProvider: Send + Sync {
    /// Resolve the poster URL for a movie database id.
    async fn poster_url(&self, tmdb_id: &str) -> Poster;
}
