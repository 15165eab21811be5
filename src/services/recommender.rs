/// Optional external recommender integration
///
/// The remote service takes an emotion label and answers in one of several
/// shapes. Rather than inspecting types ad hoc inside the resolver, the
/// response is classified once into a tagged variant; the resolver then
/// branches on that.
use std::time::Duration;

use reqwest::Client as HttpClient;
use serde_json::{json, Value};

use crate::models::{MovieId, MovieRecord};

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

const RECOMMEND_TIMEOUT: Duration = Duration::from_secs(6);

/// Classified external recommender response.
#[derive(Debug, Clone, PartialEq)]
pub enum ExternalRecommendation {
    /// Catalog identifiers to fetch full records for.
    Ids(Vec<MovieId>),
    /// Already-normalized movie records, used verbatim.
    Movies(Vec<MovieRecord>),
    /// Unusable shape, transport failure, or integration not configured.
    None,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Recommender: Send + Sync {
    async fn recommend(&self, emotion: &str) -> ExternalRecommendation;
}

/// Client for a POST-style recommender endpoint.
#[derive(Clone)]
pub struct HttpRecommender {
    http_client: HttpClient,
    api_url: String,
}

impl HttpRecommender {
    pub fn new(api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_url,
        }
    }
}

#[async_trait::async_trait]
impl Recommender for HttpRecommender {
    async fn recommend(&self, emotion: &str) -> ExternalRecommendation {
        let response = match self
            .http_client
            .post(&self.api_url)
            .json(&json!({ "emotion": emotion }))
            .timeout(RECOMMEND_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "External recommender call failed");
                return ExternalRecommendation::None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(
                status = %response.status(),
                "External recommender returned non-success status"
            );
            return ExternalRecommendation::None;
        }

        match response.json::<Value>().await {
            Ok(payload) => classify_response(&payload),
            Err(e) => {
                tracing::warn!(error = %e, "External recommender returned malformed payload");
                ExternalRecommendation::None
            }
        }
    }
}

/// Classifies a recommender payload into a tagged variant.
///
/// Recognized shapes, in priority order:
/// - object with a list under `recommended_ids` or `ids`: id list
/// - object with a list under `movies`: movie list
/// - object with a list under `results`: disambiguated by first element
/// - bare list: disambiguated by first element (empty means an empty id list)
pub fn classify_response(payload: &Value) -> ExternalRecommendation {
    if let Some(map) = payload.as_object() {
        for key in ["recommended_ids", "ids"] {
            if let Some(list) = map.get(key).and_then(Value::as_array) {
                return ExternalRecommendation::Ids(parse_ids(list));
            }
        }
        if let Some(list) = map.get("movies").and_then(Value::as_array) {
            return ExternalRecommendation::Movies(parse_movies(list));
        }
        if let Some(list) = map.get("results").and_then(Value::as_array) {
            return classify_list(list);
        }
        return ExternalRecommendation::None;
    }

    if let Some(list) = payload.as_array() {
        return classify_list(list);
    }

    ExternalRecommendation::None
}

fn classify_list(list: &[Value]) -> ExternalRecommendation {
    match list.first() {
        None => ExternalRecommendation::Ids(Vec::new()),
        Some(first) if first.is_object() => {
            if has_id_field(first) {
                ExternalRecommendation::Movies(parse_movies(list))
            } else {
                ExternalRecommendation::None
            }
        }
        Some(first) if first.is_number() || first.is_string() => {
            ExternalRecommendation::Ids(parse_ids(list))
        }
        Some(_) => ExternalRecommendation::None,
    }
}

fn has_id_field(entry: &Value) -> bool {
    entry.get("id").is_some() || entry.get("tmdb_id").is_some()
}

fn parse_ids(list: &[Value]) -> Vec<MovieId> {
    list.iter()
        .filter_map(|entry| serde_json::from_value::<MovieId>(entry.clone()).ok())
        .collect()
}

fn parse_movies(list: &[Value]) -> Vec<MovieRecord> {
    list.iter()
        .filter_map(|entry| serde_json::from_value::<MovieRecord>(entry.clone()).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommended_ids_key() {
        let payload = json!({"recommended_ids": [10, 20]});
        assert_eq!(
            classify_response(&payload),
            ExternalRecommendation::Ids(vec![MovieId::Num(10), MovieId::Num(20)])
        );
    }

    #[test]
    fn test_ids_key() {
        let payload = json!({"ids": ["tt1", 2]});
        assert_eq!(
            classify_response(&payload),
            ExternalRecommendation::Ids(vec![
                MovieId::Text("tt1".to_string()),
                MovieId::Num(2)
            ])
        );
    }

    #[test]
    fn test_recommended_ids_takes_priority_over_movies() {
        let payload = json!({
            "recommended_ids": [1],
            "movies": [{"id": 2, "title": "Ignored"}]
        });
        assert_eq!(
            classify_response(&payload),
            ExternalRecommendation::Ids(vec![MovieId::Num(1)])
        );
    }

    #[test]
    fn test_movies_key() {
        let payload = json!({"movies": [{"id": 3, "title": "Arrival"}]});
        match classify_response(&payload) {
            ExternalRecommendation::Movies(movies) => {
                assert_eq!(movies.len(), 1);
                assert_eq!(movies[0].title.as_deref(), Some("Arrival"));
                assert_eq!(movies[0].tmdb_id, Some(MovieId::Num(3)));
            }
            other => panic!("expected movies, got {:?}", other),
        }
    }

    #[test]
    fn test_results_with_objects_are_movies() {
        let payload = json!({"results": [{"id": 9, "name": "Coco"}]});
        match classify_response(&payload) {
            ExternalRecommendation::Movies(movies) => {
                assert_eq!(movies[0].title.as_deref(), Some("Coco"));
            }
            other => panic!("expected movies, got {:?}", other),
        }
    }

    #[test]
    fn test_results_with_primitives_are_ids() {
        let payload = json!({"results": [4, 5]});
        assert_eq!(
            classify_response(&payload),
            ExternalRecommendation::Ids(vec![MovieId::Num(4), MovieId::Num(5)])
        );
    }

    #[test]
    fn test_bare_empty_list_is_empty_ids() {
        assert_eq!(
            classify_response(&json!([])),
            ExternalRecommendation::Ids(Vec::new())
        );
    }

    #[test]
    fn test_bare_object_list_normalizes_alias_fields() {
        let payload = json!([{
            "tmdb_id": 7,
            "name": "Parasite",
            "poster_path": "/parasite.jpg",
            "first_air_date": "2019-05-30"
        }]);
        match classify_response(&payload) {
            ExternalRecommendation::Movies(movies) => {
                assert_eq!(movies[0].title.as_deref(), Some("Parasite"));
                assert_eq!(movies[0].poster.as_deref(), Some("/parasite.jpg"));
                assert_eq!(movies[0].release_date.as_deref(), Some("2019-05-30"));
                assert_eq!(movies[0].tmdb_id, Some(MovieId::Num(7)));
            }
            other => panic!("expected movies, got {:?}", other),
        }
    }

    #[test]
    fn test_object_list_without_id_field_is_unusable() {
        let payload = json!([{"title": "No id"}]);
        assert_eq!(classify_response(&payload), ExternalRecommendation::None);
    }

    #[test]
    fn test_unrecognized_shapes_yield_none() {
        assert_eq!(classify_response(&json!("happy")), ExternalRecommendation::None);
        assert_eq!(classify_response(&json!(42)), ExternalRecommendation::None);
        assert_eq!(
            classify_response(&json!({"unknown": true})),
            ExternalRecommendation::None
        );
    }
}
