use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Attribute under which the factorization trainer nests its fields on a
/// stored document. Writer (ETL) and reader agree on this name.
pub const MODEL_ATTR: &str = "@model";

/// Fully qualified name of the encoded vector field.
pub const FACTOR_FIELD: &str = "@model.factor";

pub const MOVIE_ID_FIELD: &str = "movieId";
pub const USER_ID_FIELD: &str = "userId";
pub const TMDB_ID_FIELD: &str = "tmdbId";
pub const TITLE_FIELD: &str = "title";
pub const RATING_FIELD: &str = "rating";

/// Similarity mode applied when re-scoring candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ScoringMode {
    /// Raw dot product. Unnormalized, so vector magnitude affects the score;
    /// used for rating prediction (user vector against movie vectors).
    Dot,
    /// Dot product normalized by both Euclidean norms. Scale-invariant;
    /// used for taste similarity (movie vector against movie vectors).
    #[default]
    Cosine,
}

impl ScoringMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringMode::Dot => "dot",
            ScoringMode::Cosine => "cosine",
        }
    }
}

/// Model fields the trainer attaches to a document: the encoded factor
/// vector plus provenance. `version` and `timestamp` are opaque strings
/// owned by the trainer; this layer reads them verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ModelFactors {
    pub factor: String,
    pub version: String,
    pub timestamp: String,
}

/// A document fetched from the store: identifier plus raw source fields.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Document {
    pub id: String,
    #[schema(value_type = Object)]
    pub source: Value,
}

impl Document {
    pub fn new(id: impl Into<String>, source: Value) -> Self {
        Self {
            id: id.into(),
            source,
        }
    }

    /// Extract the trainer-written model fields, if present and well-formed.
    pub fn model(&self) -> Option<ModelFactors> {
        let attr = self.source.get(MODEL_ATTR)?;
        serde_json::from_value(attr.clone()).ok()
    }

    /// Read a source field as a string. Numeric ids written by the ETL are
    /// rendered in their decimal form.
    pub fn field_str(&self, field: &str) -> Option<String> {
        field_to_string(self.source.get(field)?)
    }
}

/// A ranked hit from a scored or sorted search.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SearchHit {
    pub id: String,
    pub score: f64,
    #[schema(value_type = Object)]
    pub source: Value,
}

impl SearchHit {
    pub fn field_str(&self, field: &str) -> Option<String> {
        field_to_string(self.source.get(field)?)
    }
}

fn field_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Summary of the reference movie a similarity query was built from.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MovieSummary {
    pub id: String,
    pub title: Option<String>,
    pub tmdb_id: Option<String>,
    /// Training run that produced the reference vector, when known.
    pub model_version: Option<String>,
}

impl MovieSummary {
    pub fn from_document(document: &Document) -> Self {
        Self {
            id: document.id.clone(),
            title: document.field_str(TITLE_FIELD),
            tmdb_id: document.field_str(TMDB_ID_FIELD),
            model_version: document.model().map(|m| m.version),
        }
    }
}

/// Summary of the user a recommendation query was built from.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    pub id: String,
    pub model_version: Option<String>,
}

impl UserSummary {
    pub fn from_document(document: &Document) -> Self {
        Self {
            id: document.id.clone(),
            model_version: document.model().map(|m| m.version),
        }
    }
}

/// A recommended movie with its re-scored rank value.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Recommendation {
    pub id: String,
    pub title: Option<String>,
    pub tmdb_id: Option<String>,
    pub score: f64,
    /// Poster image URL when enrichment is configured and succeeded.
    pub poster: Option<String>,
}

impl Recommendation {
    pub fn from_hit(hit: &SearchHit) -> Self {
        Self {
            id: hit.id.clone(),
            title: hit.field_str(TITLE_FIELD),
            tmdb_id: hit.field_str(TMDB_ID_FIELD),
            score: hit.score,
            poster: None,
        }
    }
}

/// Response of a similar-movies query: the reference plus ranked results.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SimilarMovies {
    pub reference: MovieSummary,
    pub results: Vec<Recommendation>,
}

/// Response of a user-recommendations query.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserRecommendations {
    pub user: UserSummary,
    pub results: Vec<Recommendation>,
}

/// A movie the user rated, for display context. No vector scoring involved.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RatedMovie {
    pub movie_id: String,
    pub title: Option<String>,
    pub tmdb_id: Option<String>,
    pub rating: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scoring_mode_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ScoringMode::Dot).unwrap(), "\"dot\"");
        assert_eq!(
            serde_json::to_string(&ScoringMode::Cosine).unwrap(),
            "\"cosine\""
        );
    }

    #[test]
    fn test_model_extraction() {
        let document = Document::new(
            "2628",
            json!({
                "title": "Star Wars: Episode I",
                "@model": {
                    "factor": "0|0.1 1|0.2",
                    "version": "als-20160101",
                    "timestamp": "2016-01-01 12:00:00"
                }
            }),
        );

        let model = document.model().expect("model fields present");
        assert_eq!(model.factor, "0|0.1 1|0.2");
        assert_eq!(model.version, "als-20160101");
    }

    #[test]
    fn test_model_absent() {
        let document = Document::new("1", json!({"title": "Toy Story"}));
        assert!(document.model().is_none());
    }

    #[test]
    fn test_field_str_renders_numbers() {
        let document = Document::new("1", json!({"movieId": 42, "tmdbId": "862"}));
        assert_eq!(document.field_str(MOVIE_ID_FIELD).as_deref(), Some("42"));
        assert_eq!(document.field_str(TMDB_ID_FIELD).as_deref(), Some("862"));
        assert_eq!(document.field_str("missing"), None);
    }
}
