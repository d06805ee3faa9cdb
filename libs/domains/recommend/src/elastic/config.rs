use crate::error::RecommendResult;

/// Connection configuration for the search-engine store.
#[derive(Debug, Clone)]
pub struct ElasticConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    /// Upper bound on filter-matched candidates fetched per scored search.
    pub candidate_window: usize,
}

impl ElasticConfig {
    pub fn new(url: String) -> Self {
        Self {
            url,
            api_key: None,
            timeout_secs: 30,
            candidate_window: 1000,
        }
    }

    pub fn with_api_key(mut self, api_key: String) -> Self {
        self.api_key = Some(api_key);
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_candidate_window(mut self, candidate_window: usize) -> Self {
        self.candidate_window = candidate_window;
        self
    }

    pub fn from_env() -> RecommendResult<Self> {
        let url =
            std::env::var("ELASTIC_URL").unwrap_or_else(|_| "http://localhost:9200".to_string());

        let api_key = std::env::var("ELASTIC_API_KEY").ok();

        let timeout_secs = std::env::var("ELASTIC_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        let candidate_window = std::env::var("ELASTIC_CANDIDATE_WINDOW")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(1000);

        Ok(Self {
            url,
            api_key,
            timeout_secs,
            candidate_window,
        })
    }
}

impl Default for ElasticConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9200".to_string(),
            api_key: None,
            timeout_secs: 30,
            candidate_window: 1000,
        }
    }
}
