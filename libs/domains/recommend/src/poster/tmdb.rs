use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use super::provider::{Poster, PosterProvider};
use crate::error::{RecommendError, RecommendResult};

/// TMDb API configuration
#[derive(Debug, Clone)]
pub struct TmdbConfig {
    pub api_key: String,
    pub base_url: String,
    pub image_base_url: String,
}

impl TmdbConfig {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: "https://api.themoviedb.org/3".to_string(),
            image_base_url: "https://image.tmdb.org/t/p/w500".to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn from_env() -> RecommendResult<Self> {
        let api_key = std::env::var("TMDB_API_KEY")
            .map_err(|_| RecommendError::Config("TMDB_API_KEY not set".to_string()))?;

        let base_url = std::env::var("TMDB_BASE_URL")
            .unwrap_or_else(|_| "https://api.themoviedb.org/3".to_string());

        Ok(Self {
            api_key,
            base_url,
            image_base_url: "https://image.tmdb.org/t/p/w500".to_string(),
        })
    }
}

/// TMDb-backed poster provider
pub struct TmdbProvider {
    client: Client,
    config: TmdbConfig,
}

impl TmdbProvider {
    pub fn new(config: TmdbConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn from_env() -> RecommendResult<Self> {
        Ok(Self::new(TmdbConfig::from_env()?))
    }
}

#[derive(Debug, Deserialize)]
struct MovieInfo {
    poster_path: Option<String>,
}

fn image_url(image_base_url: &str, poster_path: &str) -> String {
    format!("{}{}", image_base_url, poster_path)
}

#[async_trait]
impl PosterProvider for TmdbProvider {
    async fn poster_url(&self, tmdb_id: &str) -> Poster {
        let url = format!(
            "{}/movie/{}",
            self.config.base_url,
            urlencoding::encode(tmdb_id)
        );

        let response = match self
            .client
            .get(url)
            .query(&[("api_key", self.config.api_key.as_str())])
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                tracing::debug!(tmdb_id = %tmdb_id, error = %err, "Poster lookup failed");
                return Poster::Unavailable;
            }
        };

        if response.status() == StatusCode::UNAUTHORIZED {
            return Poster::CredentialError;
        }

        if !response.status().is_success() {
            return Poster::Unavailable;
        }

        match response.json::<MovieInfo>().await {
            Ok(MovieInfo {
                poster_path: Some(path),
            }) => Poster::Url(image_url(&self.config.image_base_url, &path)),
            _ => Poster::Unavailable,
        }
    }
}
