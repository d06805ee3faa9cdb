//! Recommendation Domain
//!
//! Latent-factor recommendation scoring on top of a text search index:
//! factor vectors produced by an external matrix-factorization trainer are
//! stored as position-tagged token strings, and queries re-rank candidate
//! documents by similarity between a query vector and each stored vector,
//! optionally combined with a text filter.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────┐
//! │        Handlers         │  ← HTTP endpoints
//! └───────────┬─────────────┘
//! ┌───────────▼─────────────┐     ┌─────────────────┐
//! │ RecommendationService   │────▶│  PosterProvider  │
//! └───────────┬─────────────┘     │     (trait)      │
//! ┌───────────▼─────────────┐     └────────┬────────┘
//! │  DocumentStore (trait)  │     ┌────────▼────────┐
//! └───────────┬─────────────┘     │   TmdbProvider   │
//! ┌───────────▼─────────────┐     └─────────────────┘
//! │      ElasticStore       │  ← query construction + typed re-scoring
//! └─────────────────────────┘     (codec / scoring / query modules)
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_recommend::{ElasticConfig, ElasticStore, RecommendationService, handlers};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = ElasticStore::new(ElasticConfig::from_env()?)?;
//! let service = RecommendationService::new(store);
//!
//! let router = handlers::router(service);
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod elastic;
pub mod error;
pub mod handlers;
pub mod models;
pub mod poster;
pub mod query;
pub mod repository;
pub mod scoring;
pub mod service;

// Re-export commonly used types
pub use elastic::{ElasticConfig, ElasticStore};
pub use error::{RecommendError, RecommendResult};
pub use handlers::ApiDoc;
pub use models::{
    Document, ModelFactors, MovieSummary, RatedMovie, Recommendation, ScoringMode, SearchHit,
    SimilarMovies, UserRecommendations, UserSummary,
};
pub use poster::{Poster, PosterProvider, TmdbConfig, TmdbProvider};
pub use query::ScoredQuery;
pub use repository::DocumentStore;
pub use service::{Collections, RecommendationService};
