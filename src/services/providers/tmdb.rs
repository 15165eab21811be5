/// TMDb catalog provider
///
/// Wraps two call shapes: free-text movie search and fetch-by-id. Every
/// remote failure degrades to "no data for that unit of work"; the only
/// special case is a missing API key, which is logged once at construction
/// and turns every call into an empty result.
use std::time::Duration;

use reqwest::Client as HttpClient;
use serde_json::Value;

use crate::{
    error::{AppError, AppResult},
    models::{MovieId, MovieRecord, TmdbMovie},
    services::providers::CatalogProvider,
};

const SEARCH_TIMEOUT: Duration = Duration::from_secs(10);
const DETAILS_TIMEOUT: Duration = Duration::from_secs(8);

#[derive(Clone)]
pub struct TmdbCatalog {
    http_client: HttpClient,
    api_key: Option<String>,
    api_url: String,
    poster_base: String,
}

impl TmdbCatalog {
    pub fn new(api_key: Option<String>, api_url: String, poster_base: String) -> Self {
        if api_key.is_none() {
            tracing::warn!("TMDB_API_KEY not set; movie recommendations will be disabled");
        }

        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
            poster_base,
        }
    }

    /// Fetches full details for a single movie id.
    async fn fetch_single(&self, api_key: &str, id: &MovieId) -> AppResult<MovieRecord> {
        let url = format!("{}/movie/{}", self.api_url, id);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", api_key)])
            .timeout(DETAILS_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::ExternalApi(format!(
                "TMDb details returned status {} for id {}",
                status, id
            )));
        }

        let movie: TmdbMovie = response.json().await?;
        Ok(movie.into_record(&self.poster_base))
    }
}

#[async_trait::async_trait]
impl CatalogProvider for TmdbCatalog {
    async fn search_by_genre(&self, keyword: &str, limit: usize) -> AppResult<Vec<MovieRecord>> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Ok(Vec::new());
        };

        let url = format!("{}/search/movie", self.api_url);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", api_key), ("query", keyword), ("page", "1")])
            .timeout(SEARCH_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDb search returned status {}: {}",
                status, body
            )));
        }

        let payload: Value = response.json().await?;
        let results = payload["results"].as_array().cloned().unwrap_or_default();

        // Keep the provider's relevance order; skip entries that do not
        // deserialize rather than failing the whole page.
        let records: Vec<MovieRecord> = results
            .into_iter()
            .filter_map(|entry| serde_json::from_value::<TmdbMovie>(entry).ok())
            .take(limit)
            .map(|movie| movie.into_record(&self.poster_base))
            .collect();

        tracing::info!(
            keyword = %keyword,
            results = records.len(),
            provider = "tmdb",
            "Genre search completed"
        );

        Ok(records)
    }

    async fn fetch_by_ids(&self, ids: &[MovieId]) -> AppResult<Vec<MovieRecord>> {
        let Some(api_key) = self.api_key.as_deref().map(str::to_owned) else {
            return Ok(Vec::new());
        };

        let mut records = Vec::new();
        for id in ids {
            match self.fetch_single(&api_key, id).await {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(movie_id = %id, error = %e, "Skipping id after fetch failure");
                }
            }
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyless_catalog() -> TmdbCatalog {
        TmdbCatalog::new(
            None,
            "http://test.local".to_string(),
            "http://posters.local".to_string(),
        )
    }

    #[tokio::test]
    async fn test_missing_key_search_is_empty_not_error() {
        let catalog = keyless_catalog();
        let records = catalog.search_by_genre("Comedy", 3).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_missing_key_fetch_by_ids_is_empty_not_error() {
        let catalog = keyless_catalog();
        let ids = vec![MovieId::Num(10), MovieId::Num(20)];
        let records = catalog.fetch_by_ids(&ids).await.unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_search_payload_normalization() {
        let payload: Value = serde_json::from_str(
            r#"{"results": [
                {"id": 1, "title": "Up", "overview": "Balloons.", "poster_path": "/up.jpg", "release_date": "2009-05-29"},
                {"id": 2, "title": "Brave", "poster_path": null}
            ]}"#,
        )
        .unwrap();

        let results = payload["results"].as_array().cloned().unwrap();
        let records: Vec<MovieRecord> = results
            .into_iter()
            .filter_map(|entry| serde_json::from_value::<TmdbMovie>(entry).ok())
            .map(|movie| movie.into_record("http://posters.local"))
            .collect();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].poster.as_deref(), Some("http://posters.local/up.jpg"));
        assert_eq!(records[1].poster, None);
    }
}
