use std::collections::HashMap;
use std::sync::Arc;

use crate::codec;
use crate::error::{RecommendError, RecommendResult};
use crate::models::{
    MOVIE_ID_FIELD, MovieSummary, RATING_FIELD, RatedMovie, Recommendation, ScoringMode, SearchHit,
    SimilarMovies, TITLE_FIELD, TMDB_ID_FIELD, USER_ID_FIELD, UserRecommendations, UserSummary,
};
use crate::poster::{Poster, PosterProvider};
use crate::query::ScoredQuery;
use crate::repository::DocumentStore;

/// Collection names the service addresses in the store.
#[derive(Debug, Clone)]
pub struct Collections {
    pub movies: String,
    pub users: String,
    pub ratings: String,
}

impl Default for Collections {
    fn default() -> Self {
        Self {
            movies: "movies".to_string(),
            users: "users".to_string(),
            ratings: "ratings".to_string(),
        }
    }
}

/// Recommendation service orchestrating the store and optional poster
/// enrichment.
///
/// Both vector flows share one shape: fetch the reference document, decode
/// its stored factor vector, execute a re-scored query, post-process the
/// ranked hits. The service is read-only and stateless per request.
pub struct RecommendationService<R: DocumentStore> {
    store: Arc<R>,
    posters: Option<Arc<dyn PosterProvider>>,
    collections: Collections,
}

impl<R: DocumentStore> RecommendationService<R> {
    pub fn new(store: R) -> Self {
        Self {
            store: Arc::new(store),
            posters: None,
            collections: Collections::default(),
        }
    }

    pub fn with_poster_provider(mut self, provider: Arc<dyn PosterProvider>) -> Self {
        self.posters = Some(provider);
        self
    }

    pub fn with_collections(mut self, collections: Collections) -> Self {
        self.collections = collections;
        self
    }

    /// Movies similar to the given movie, ranked by cosine similarity
    /// between factor vectors. The reference movie itself is dropped from
    /// the top of the ranking when it appears there.
    pub async fn similar_movies(
        &self,
        movie_id: &str,
        filter: &str,
        num: usize,
    ) -> RecommendResult<SimilarMovies> {
        let document = self
            .store
            .get(&self.collections.movies, movie_id)
            .await?
            .ok_or_else(|| RecommendError::NotFound {
                collection: self.collections.movies.clone(),
                id: movie_id.to_string(),
            })?;

        let model = document
            .model()
            .ok_or_else(|| RecommendError::NoVector(movie_id.to_string()))?;
        let vector = codec::decode(&model.factor)?;

        // Over-fetch by one so a full page survives the self-match drop.
        let query = ScoredQuery::new(vector, ScoringMode::Cosine)
            .with_filter(filter)
            .with_limit(num + 1);

        let hits = self
            .store
            .scored_search(&self.collections.movies, query)
            .await?;
        let hits = drop_self_match(hits, movie_id, num);
        let results = self.enrich(hits).await;

        tracing::info!(movie_id = %movie_id, results = results.len(), "Served similar movies");

        Ok(SimilarMovies {
            reference: MovieSummary::from_document(&document),
            results,
        })
    }

    /// Top movies for the given user, ranked by predicted rating (raw dot
    /// product of user and movie factor vectors). No self-match filtering:
    /// a user is never a candidate in the movies collection.
    pub async fn recommendations_for_user(
        &self,
        user_id: &str,
        filter: &str,
        num: usize,
    ) -> RecommendResult<UserRecommendations> {
        let document = self
            .store
            .get(&self.collections.users, user_id)
            .await?
            .ok_or_else(|| RecommendError::NotFound {
                collection: self.collections.users.clone(),
                id: user_id.to_string(),
            })?;

        let model = document
            .model()
            .ok_or_else(|| RecommendError::NoVector(user_id.to_string()))?;
        let vector = codec::decode(&model.factor)?;

        let query = ScoredQuery::new(vector, ScoringMode::Dot)
            .with_filter(filter)
            .with_limit(num);

        let hits = self
            .store
            .scored_search(&self.collections.movies, query)
            .await?;
        let results = self.enrich(hits).await;

        tracing::info!(user_id = %user_id, results = results.len(), "Served user recommendations");

        Ok(UserRecommendations {
            user: UserSummary::from_document(&document),
            results,
        })
    }

    /// Movies the user rated, highest rating first. Display context only;
    /// no vector scoring is applied.
    pub async fn top_rated_for_user(
        &self,
        user_id: &str,
        num: usize,
    ) -> RecommendResult<Vec<RatedMovie>> {
        let rating_hits = self
            .store
            .sorted_search(
                &self.collections.ratings,
                &format!("{}:{}", USER_ID_FIELD, user_id),
                RATING_FIELD,
                num,
            )
            .await?;

        let rated: Vec<(String, Option<f64>)> = rating_hits
            .iter()
            .filter_map(|hit| {
                let movie_id = hit.field_str(MOVIE_ID_FIELD)?;
                let rating = hit.source.get(RATING_FIELD).and_then(|v| v.as_f64());
                Some((movie_id, rating))
            })
            .collect();

        if rated.is_empty() {
            return Ok(vec![]);
        }

        let ids: Vec<String> = rated.iter().map(|(id, _)| id.clone()).collect();
        let movies = self
            .store
            .multi_get(
                &self.collections.movies,
                ids,
                vec![TMDB_ID_FIELD.to_string(), TITLE_FIELD.to_string()],
            )
            .await?;

        let by_id: HashMap<&str, &crate::models::Document> =
            movies.iter().map(|doc| (doc.id.as_str(), doc)).collect();

        // Preserve the rating order, not the bulk-fetch order.
        Ok(rated
            .into_iter()
            .map(|(movie_id, rating)| {
                let movie = by_id.get(movie_id.as_str());
                RatedMovie {
                    title: movie.and_then(|doc| doc.field_str(TITLE_FIELD)),
                    tmdb_id: movie.and_then(|doc| doc.field_str(TMDB_ID_FIELD)),
                    movie_id,
                    rating,
                }
            })
            .collect())
    }

    /// Attach poster URLs when a provider is configured. Sentinel outcomes
    /// degrade to posterless results; they never fail the request.
    async fn enrich(&self, hits: Vec<SearchHit>) -> Vec<Recommendation> {
        let mut results = Vec::with_capacity(hits.len());

        for hit in &hits {
            let mut recommendation = Recommendation::from_hit(hit);

            if let (Some(provider), Some(tmdb_id)) = (&self.posters, &recommendation.tmdb_id) {
                match provider.poster_url(tmdb_id).await {
                    Poster::Url(url) => recommendation.poster = Some(url),
                    Poster::Unavailable => {}
                    Poster::CredentialError => {
                        tracing::warn!(
                            tmdb_id = %tmdb_id,
                            "Poster API rejected the configured credentials; serving results without imagery"
                        );
                    }
                }
            }

            results.push(recommendation);
        }

        results
    }
}

/// Drop the rank-0 hit only when it is the reference itself, then truncate.
/// An item is maximally similar to itself, so the top slot carries no
/// information; any other document at rank 0 is kept.
fn drop_self_match(mut hits: Vec<SearchHit>, reference_id: &str, num: usize) -> Vec<SearchHit> {
    if hits.first().is_some_and(|hit| hit.id == reference_id) {
        hits.remove(0);
    }
    hits.truncate(num);
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Document;
    use crate::poster::MockPosterProvider;
    use crate::repository::MockDocumentStore;
    use mockall::predicate;
    use serde_json::json;

    fn movie_doc(id: &str, factor: &str) -> Document {
        Document::new(
            id,
            json!({
                "movieId": id,
                "title": format!("Movie {}", id),
                "tmdbId": format!("tmdb-{}", id),
                "@model": { "factor": factor, "version": "v1", "timestamp": "2016-01-01 00:00:00" }
            }),
        )
    }

    fn user_doc(id: &str, factor: &str) -> Document {
        Document::new(
            id,
            json!({
                "userId": id,
                "@model": { "factor": factor, "version": "v1", "timestamp": "2016-01-01 00:00:00" }
            }),
        )
    }

    fn hit(id: &str, score: f64) -> SearchHit {
        SearchHit {
            id: id.to_string(),
            score,
            source: json!({ "title": format!("Movie {}", id), "tmdbId": format!("tmdb-{}", id) }),
        }
    }

    #[tokio::test]
    async fn test_similar_movies_not_found() {
        let mut store = MockDocumentStore::new();
        store
            .expect_get()
            .with(predicate::eq("movies"), predicate::eq("404"))
            .returning(|_, _| Ok(None));

        let service = RecommendationService::new(store);
        let result = service.similar_movies("404", "*", 5).await;

        assert!(matches!(result, Err(RecommendError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_similar_movies_without_vector() {
        let mut store = MockDocumentStore::new();
        store.expect_get().returning(|_, id| {
            Ok(Some(Document::new(id, json!({ "title": "No model" }))))
        });

        let service = RecommendationService::new(store);
        let result = service.similar_movies("1", "*", 5).await;

        assert!(matches!(result, Err(RecommendError::NoVector(_))));
    }

    #[tokio::test]
    async fn test_similar_movies_reference_decode_error_surfaces() {
        let mut store = MockDocumentStore::new();
        store
            .expect_get()
            .returning(|_, id| Ok(Some(movie_doc(id, "garbage"))));

        let service = RecommendationService::new(store);
        let result = service.similar_movies("1", "*", 5).await;

        assert!(matches!(result, Err(RecommendError::MalformedPayload(_))));
    }

    #[tokio::test]
    async fn test_similar_movies_drops_self_match() {
        let mut store = MockDocumentStore::new();
        store
            .expect_get()
            .returning(|_, id| Ok(Some(movie_doc(id, "0|1.0 1|0.5"))));
        store
            .expect_scored_search()
            .withf(|collection, query| {
                collection == "movies"
                    && query.mode == ScoringMode::Cosine
                    && query.limit == 3
            })
            .returning(|_, _| {
                Ok(vec![hit("2628", 1.0), hit("260", 0.9), hit("1196", 0.8)])
            });

        let service = RecommendationService::new(store);
        let similar = service.similar_movies("2628", "*", 2).await.unwrap();

        assert_eq!(similar.reference.id, "2628");
        assert_eq!(similar.results.len(), 2);
        assert!(similar.results.iter().all(|r| r.id != "2628"));
        assert_eq!(similar.results[0].id, "260");
    }

    #[tokio::test]
    async fn test_similar_movies_keeps_foreign_rank_zero() {
        let mut store = MockDocumentStore::new();
        store
            .expect_get()
            .returning(|_, id| Ok(Some(movie_doc(id, "0|1.0"))));
        store
            .expect_scored_search()
            .returning(|_, _| Ok(vec![hit("260", 0.99), hit("1196", 0.8)]));

        let service = RecommendationService::new(store);
        let similar = service.similar_movies("2628", "*", 2).await.unwrap();

        // Rank 0 is another document; the conservative rule keeps it.
        assert_eq!(similar.results.len(), 2);
        assert_eq!(similar.results[0].id, "260");
    }

    #[tokio::test]
    async fn test_similar_movies_scores_non_increasing() {
        let mut store = MockDocumentStore::new();
        store
            .expect_get()
            .returning(|_, id| Ok(Some(movie_doc(id, "0|1.0"))));
        store.expect_scored_search().returning(|_, _| {
            Ok(vec![
                hit("a", 0.9),
                hit("b", 0.9),
                hit("c", 0.5),
                hit("d", 0.1),
            ])
        });

        let service = RecommendationService::new(store);
        let similar = service.similar_movies("x", "*", 5).await.unwrap();

        assert!(similar.results.len() <= 5);
        assert!(
            similar
                .results
                .windows(2)
                .all(|w| w[0].score >= w[1].score)
        );
    }

    #[tokio::test]
    async fn test_user_recommendations_use_dot_mode() {
        let mut store = MockDocumentStore::new();
        store
            .expect_get()
            .with(predicate::eq("users"), predicate::eq("12"))
            .returning(|_, id| Ok(Some(user_doc(id, "0|0.5 1|0.5"))));
        store
            .expect_scored_search()
            .withf(|collection, query| {
                collection == "movies" && query.mode == ScoringMode::Dot && query.limit == 5
            })
            .returning(|_, _| Ok(vec![hit("1", 4.8), hit("2", 4.2)]));

        let service = RecommendationService::new(store);
        let recommendations = service
            .recommendations_for_user("12", "*", 5)
            .await
            .unwrap();

        assert_eq!(recommendations.user.id, "12");
        assert_eq!(recommendations.user.model_version.as_deref(), Some("v1"));
        assert_eq!(recommendations.results.len(), 2);
    }

    #[tokio::test]
    async fn test_user_recommendations_without_vector() {
        let mut store = MockDocumentStore::new();
        store
            .expect_get()
            .returning(|_, id| Ok(Some(Document::new(id, json!({ "userId": id })))));

        let service = RecommendationService::new(store);
        let result = service.recommendations_for_user("12", "*", 5).await;

        assert!(matches!(result, Err(RecommendError::NoVector(_))));
    }

    #[tokio::test]
    async fn test_user_recommendations_pass_filter_through() {
        let mut store = MockDocumentStore::new();
        store
            .expect_get()
            .returning(|_, id| Ok(Some(user_doc(id, "0|1.0"))));
        store
            .expect_scored_search()
            .withf(|_, query| query.filter == "release_date:[2012 TO *]")
            .returning(|_, _| Ok(vec![]));

        let service = RecommendationService::new(store);
        let recommendations = service
            .recommendations_for_user("12", "release_date:[2012 TO *]", 5)
            .await
            .unwrap();

        assert!(recommendations.results.is_empty());
    }

    #[tokio::test]
    async fn test_top_rated_preserves_rating_order() {
        let mut store = MockDocumentStore::new();
        store
            .expect_sorted_search()
            .with(
                predicate::eq("ratings"),
                predicate::eq("userId:12"),
                predicate::eq("rating"),
                predicate::eq(3usize),
            )
            .returning(|_, _, _, _| {
                Ok(vec![
                    SearchHit {
                        id: "r1".to_string(),
                        score: 0.0,
                        source: json!({ "movieId": 260, "rating": 5.0 }),
                    },
                    SearchHit {
                        id: "r2".to_string(),
                        score: 0.0,
                        source: json!({ "movieId": 1, "rating": 4.5 }),
                    },
                ])
            });
        store
            .expect_multi_get()
            .withf(|collection, ids, fields| {
                collection == "movies"
                    && ids == &["260".to_string(), "1".to_string()]
                    && fields.contains(&"title".to_string())
            })
            .returning(|_, _, _| {
                // Bulk fetch answers out of order; the service re-orders.
                Ok(vec![
                    Document::new("1", json!({ "title": "Toy Story", "tmdbId": "862" })),
                    Document::new("260", json!({ "title": "Star Wars", "tmdbId": "11" })),
                ])
            });

        let service = RecommendationService::new(store);
        let rated = service.top_rated_for_user("12", 3).await.unwrap();

        assert_eq!(rated.len(), 2);
        assert_eq!(rated[0].movie_id, "260");
        assert_eq!(rated[0].title.as_deref(), Some("Star Wars"));
        assert_eq!(rated[0].rating, Some(5.0));
        assert_eq!(rated[1].movie_id, "1");
    }

    #[tokio::test]
    async fn test_top_rated_with_no_ratings() {
        let mut store = MockDocumentStore::new();
        store
            .expect_sorted_search()
            .returning(|_, _, _, _| Ok(vec![]));

        let service = RecommendationService::new(store);
        let rated = service.top_rated_for_user("99", 5).await.unwrap();

        assert!(rated.is_empty());
    }

    #[tokio::test]
    async fn test_poster_credential_error_is_tolerated() {
        let mut store = MockDocumentStore::new();
        store
            .expect_get()
            .returning(|_, id| Ok(Some(movie_doc(id, "0|1.0"))));
        store
            .expect_scored_search()
            .returning(|_, _| Ok(vec![hit("260", 0.9)]));

        let mut posters = MockPosterProvider::new();
        posters
            .expect_poster_url()
            .returning(|_| Poster::CredentialError);

        let service =
            RecommendationService::new(store).with_poster_provider(Arc::new(posters));
        let similar = service.similar_movies("2628", "*", 5).await.unwrap();

        assert_eq!(similar.results.len(), 1);
        assert!(similar.results[0].poster.is_none());
    }

    #[tokio::test]
    async fn test_poster_url_is_attached() {
        let mut store = MockDocumentStore::new();
        store
            .expect_get()
            .returning(|_, id| Ok(Some(movie_doc(id, "0|1.0"))));
        store
            .expect_scored_search()
            .returning(|_, _| Ok(vec![hit("260", 0.9)]));

        let mut posters = MockPosterProvider::new();
        posters
            .expect_poster_url()
            .with(predicate::eq("tmdb-260"))
            .returning(|_| Poster::Url("https://image.tmdb.org/t/p/w500/sw.jpg".to_string()));

        let service =
            RecommendationService::new(store).with_poster_provider(Arc::new(posters));
        let similar = service.similar_movies("2628", "*", 5).await.unwrap();

        assert_eq!(
            similar.results[0].poster.as_deref(),
            Some("https://image.tmdb.org/t/p/w500/sw.jpg")
        );
    }
}
