use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};

use super::ElasticConfig;
use crate::error::{RecommendError, RecommendResult};
use crate::models::{Document, SearchHit};
use crate::query::{self, ScoredQuery};
use crate::repository::DocumentStore;

/// Search-engine-backed implementation of [`DocumentStore`].
///
/// The engine evaluates only the text filter; ranking happens in
/// [`query::rescore`], so no engine-side scripting is required.
pub struct ElasticStore {
    client: Client,
    config: ElasticConfig,
}

impl ElasticStore {
    pub fn new(config: ElasticConfig) -> RecommendResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RecommendError::Config(format!("Failed to build client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn from_env() -> RecommendResult<Self> {
        Self::new(ElasticConfig::from_env()?)
    }

    fn endpoint(&self, collection: &str, suffix: &str) -> String {
        format!(
            "{}/{}/{}",
            self.config.url,
            urlencoding::encode(collection),
            suffix
        )
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_key {
            Some(key) => builder.header("Authorization", format!("ApiKey {}", key)),
            None => builder,
        }
    }

    async fn execute_search(&self, collection: &str, body: Value) -> RecommendResult<Vec<RawHit>> {
        let response = self
            .request(self.client.post(self.endpoint(collection, "_search")))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(RecommendError::Store(format!(
                "Search failed ({}): {}",
                status, error_text
            )));
        }

        let search_response: SearchResponse = response.json().await?;
        Ok(search_response.hits.hits)
    }
}

fn scored_search_body(query: &ScoredQuery, candidate_window: usize) -> Value {
    json!({
        "query": query.filter_clause(),
        "size": candidate_window,
        "_source": true,
    })
}

fn sorted_search_body(query_string: &str, sort_field: &str, size: usize) -> Value {
    json!({
        "query": { "query_string": { "query": query_string } },
        "sort": [ { sort_field: { "order": "desc" } } ],
        "size": size,
    })
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: SearchHits,
}

#[derive(Debug, Deserialize)]
struct SearchHits {
    hits: Vec<RawHit>,
}

#[derive(Debug, Deserialize)]
struct RawHit {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_score")]
    score: Option<f64>,
    #[serde(rename = "_source", default)]
    source: Value,
}

#[derive(Debug, Deserialize)]
struct GetResponse {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default)]
    found: bool,
    #[serde(rename = "_source", default)]
    source: Value,
}

#[derive(Debug, Deserialize)]
struct MultiGetResponse {
    docs: Vec<GetResponse>,
}

#[async_trait]
impl DocumentStore for ElasticStore {
    async fn get(&self, collection: &str, id: &str) -> RecommendResult<Option<Document>> {
        let url = format!(
            "{}/{}",
            self.endpoint(collection, "_doc"),
            urlencoding::encode(id)
        );

        let response = self.request(self.client.get(url)).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(RecommendError::Store(format!(
                "Lookup failed ({}): {}",
                status, error_text
            )));
        }

        let get_response: GetResponse = response.json().await?;
        if !get_response.found {
            return Ok(None);
        }

        Ok(Some(Document::new(get_response.id, get_response.source)))
    }

    async fn scored_search(
        &self,
        collection: &str,
        query: ScoredQuery,
    ) -> RecommendResult<Vec<SearchHit>> {
        let body = scored_search_body(&query, self.config.candidate_window);
        let raw_hits = self.execute_search(collection, body).await?;

        if raw_hits.len() == self.config.candidate_window {
            tracing::debug!(
                collection = %collection,
                window = self.config.candidate_window,
                "Candidate window saturated; ranking covers a bounded sample"
            );
        }

        let candidates = raw_hits
            .into_iter()
            .map(|hit| Document::new(hit.id, hit.source))
            .collect();

        Ok(query::rescore(
            &query.vector,
            query.mode,
            candidates,
            query.limit,
        ))
    }

    async fn sorted_search(
        &self,
        collection: &str,
        query: &str,
        sort_field: &str,
        size: usize,
    ) -> RecommendResult<Vec<SearchHit>> {
        let body = sorted_search_body(query, sort_field, size);
        let raw_hits = self.execute_search(collection, body).await?;

        Ok(raw_hits
            .into_iter()
            .map(|hit| SearchHit {
                id: hit.id,
                score: hit.score.unwrap_or_default(),
                source: hit.source,
            })
            .collect())
    }

    async fn multi_get(
        &self,
        collection: &str,
        ids: Vec<String>,
        fields: Vec<String>,
    ) -> RecommendResult<Vec<Document>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let response = self
            .request(self.client.post(self.endpoint(collection, "_mget")))
            .query(&[("_source", fields.join(","))])
            .json(&json!({ "ids": ids }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(RecommendError::Store(format!(
                "Bulk lookup failed ({}): {}",
                status, error_text
            )));
        }

        let multi_get: MultiGetResponse = response.json().await?;

        Ok(multi_get
            .docs
            .into_iter()
            .filter(|doc| doc.found)
            .map(|doc| Document::new(doc.id, doc.source))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScoringMode;

    #[test]
    fn test_scored_search_body_match_all() {
        let query = ScoredQuery::new(vec![1.0, 2.0], ScoringMode::Cosine);
        let body = scored_search_body(&query, 500);

        assert_eq!(body["query"], json!({ "match_all": {} }));
        assert_eq!(body["size"], 500);
    }

    #[test]
    fn test_scored_search_body_with_filter() {
        let query =
            ScoredQuery::new(vec![1.0], ScoringMode::Dot).with_filter("title:(NOT matrix)");
        let body = scored_search_body(&query, 1000);

        assert_eq!(
            body["query"],
            json!({ "query_string": { "query": "title:(NOT matrix)" } })
        );
    }

    #[test]
    fn test_sorted_search_body() {
        let body = sorted_search_body("userId:12", "rating", 5);

        assert_eq!(body["query"]["query_string"]["query"], "userId:12");
        assert_eq!(body["sort"][0]["rating"]["order"], "desc");
        assert_eq!(body["size"], 5);
    }

    #[test]
    fn test_search_response_deserializes() {
        let payload = r#"{
            "took": 3,
            "hits": {
                "total": { "value": 2 },
                "hits": [
                    { "_id": "2628", "_score": 1.0, "_source": { "title": "Star Wars" } },
                    { "_id": "1", "_score": null, "_source": { "title": "Toy Story" } }
                ]
            }
        }"#;

        let response: SearchResponse = serde_json::from_str(payload).unwrap();
        assert_eq!(response.hits.hits.len(), 2);
        assert_eq!(response.hits.hits[0].id, "2628");
        assert_eq!(response.hits.hits[1].score, None);
    }

    #[test]
    fn test_multi_get_response_skips_missing() {
        let payload = r#"{
            "docs": [
                { "_id": "1", "found": true, "_source": { "title": "Toy Story" } },
                { "_id": "404", "found": false }
            ]
        }"#;

        let response: MultiGetResponse = serde_json::from_str(payload).unwrap();
        let found: Vec<_> = response.docs.into_iter().filter(|d| d.found).collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "1");
    }
}
