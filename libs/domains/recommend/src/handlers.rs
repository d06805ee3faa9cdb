use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::{IntoParams, OpenApi};

use crate::error::RecommendResult;
use crate::models::{RatedMovie, Recommendation, SimilarMovies, UserRecommendations};
use crate::query::MATCH_ALL;
use crate::repository::DocumentStore;
use crate::service::RecommendationService;

/// OpenAPI documentation for the recommendation API
#[derive(OpenApi)]
#[openapi(
    paths(similar_movies, user_recommendations, top_rated),
    components(schemas(SimilarMovies, UserRecommendations, RatedMovie, Recommendation)),
    tags(
        (name = "recommendations", description = "Latent-factor movie recommendations")
    )
)]
pub struct ApiDoc;

/// Create the recommendations router with all HTTP endpoints
pub fn router<R: DocumentStore + 'static>(service: RecommendationService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/movies/{id}/similar", get(similar_movies))
        .route("/users/{id}/recommendations", get(user_recommendations))
        .route("/users/{id}/top-rated", get(top_rated))
        .with_state(shared_service)
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct RankedQueryParams {
    /// Text filter expression; defaults to match-all.
    pub q: Option<String>,
    /// Maximum number of results.
    pub limit: Option<usize>,
}

const DEFAULT_LIMIT: usize = 10;

/// Movies similar to a movie, ranked by cosine similarity
#[utoipa::path(
    get,
    path = "/movies/{id}/similar",
    tag = "recommendations",
    params(
        ("id" = String, Path, description = "Movie ID"),
        RankedQueryParams
    ),
    responses(
        (status = 200, description = "Reference movie and ranked similar movies", body = SimilarMovies),
        (status = 404, description = "Movie not found"),
        (status = 422, description = "Movie has no model vector or the stored vector is unreadable"),
        (status = 503, description = "Store unavailable")
    )
)]
async fn similar_movies<R: DocumentStore>(
    State(service): State<Arc<RecommendationService<R>>>,
    Path(id): Path<String>,
    Query(params): Query<RankedQueryParams>,
) -> RecommendResult<Json<SimilarMovies>> {
    let filter = params.q.unwrap_or_else(|| MATCH_ALL.to_string());
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);

    let similar = service.similar_movies(&id, &filter, limit).await?;
    Ok(Json(similar))
}

/// Recommended movies for a user, ranked by predicted rating
#[utoipa::path(
    get,
    path = "/users/{id}/recommendations",
    tag = "recommendations",
    params(
        ("id" = String, Path, description = "User ID"),
        RankedQueryParams
    ),
    responses(
        (status = 200, description = "User reference and ranked recommendations", body = UserRecommendations),
        (status = 404, description = "User not found"),
        (status = 422, description = "User has no model vector or the stored vector is unreadable"),
        (status = 503, description = "Store unavailable")
    )
)]
async fn user_recommendations<R: DocumentStore>(
    State(service): State<Arc<RecommendationService<R>>>,
    Path(id): Path<String>,
    Query(params): Query<RankedQueryParams>,
) -> RecommendResult<Json<UserRecommendations>> {
    let filter = params.q.unwrap_or_else(|| MATCH_ALL.to_string());
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);

    let recommendations = service
        .recommendations_for_user(&id, &filter, limit)
        .await?;
    Ok(Json(recommendations))
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct TopRatedParams {
    /// Maximum number of rated movies.
    pub limit: Option<usize>,
}

/// Movies a user rated, highest rating first
#[utoipa::path(
    get,
    path = "/users/{id}/top-rated",
    tag = "recommendations",
    params(
        ("id" = String, Path, description = "User ID"),
        TopRatedParams
    ),
    responses(
        (status = 200, description = "Rated movies, highest first", body = Vec<RatedMovie>),
        (status = 503, description = "Store unavailable")
    )
)]
async fn top_rated<R: DocumentStore>(
    State(service): State<Arc<RecommendationService<R>>>,
    Path(id): Path<String>,
    Query(params): Query<TopRatedParams>,
) -> RecommendResult<Json<Vec<RatedMovie>>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);

    let rated = service.top_rated_for_user(&id, limit).await?;
    Ok(Json(rated))
}
