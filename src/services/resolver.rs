/// Recommendation resolver
///
/// Maps an emotion label to movie records. An external recommender, when one
/// is configured, gets first say; the built-in genre mapping is the fallback.
/// Remote failures never abort a resolution, they only shrink it, and an
/// empty result is a valid outcome rather than an error.
use std::sync::Arc;

use crate::{
    models::{dedup_by_id, emotion, MovieRecord},
    services::{
        providers::CatalogProvider,
        recommender::{ExternalRecommendation, Recommender},
    },
};

/// Upper bound on genres consumed from the mapping per resolution.
const MAX_GENRES: usize = 3;

pub struct RecommendationResolver {
    catalog: Arc<dyn CatalogProvider>,
    recommender: Option<Arc<dyn Recommender>>,
    max_per_genre: usize,
}

impl RecommendationResolver {
    pub fn new(
        catalog: Arc<dyn CatalogProvider>,
        recommender: Option<Arc<dyn Recommender>>,
        max_per_genre: usize,
    ) -> Self {
        Self {
            catalog,
            recommender,
            max_per_genre,
        }
    }

    /// Resolves an emotion label into an ordered list of movie records.
    pub async fn resolve(&self, emotion: &str) -> Vec<MovieRecord> {
        if let Some(recommender) = &self.recommender {
            match recommender.recommend(emotion).await {
                ExternalRecommendation::Movies(movies) if !movies.is_empty() => {
                    tracing::info!(
                        count = movies.len(),
                        source = "external",
                        "Using recommender-supplied movie records"
                    );
                    return movies;
                }
                ExternalRecommendation::Ids(ids) if !ids.is_empty() => {
                    match self.catalog.fetch_by_ids(&ids).await {
                        Ok(records) if !records.is_empty() => {
                            tracing::info!(
                                requested = ids.len(),
                                fetched = records.len(),
                                source = "external",
                                "Fetched records for recommender ids"
                            );
                            return records;
                        }
                        Ok(_) => {
                            tracing::info!(
                                requested = ids.len(),
                                "Recommender ids yielded no records; falling back to genre search"
                            );
                        }
                        Err(e) => {
                            tracing::warn!(
                                error = %e,
                                "Failed to fetch movies for recommender ids; falling back"
                            );
                        }
                    }
                }
                // Empty id/movie lists and unusable shapes all fall through.
                _ => {}
            }
        }

        self.resolve_by_genre(emotion).await
    }

    /// Built-in fallback: one catalog search per mapped genre, then a stable
    /// dedup over the accumulated results.
    async fn resolve_by_genre(&self, emotion: &str) -> Vec<MovieRecord> {
        let genres = emotion::genres_for(emotion);

        let mut combined = Vec::new();
        for genre in genres.iter().take(MAX_GENRES) {
            match self.catalog.search_by_genre(genre, self.max_per_genre).await {
                Ok(records) => combined.extend(records),
                Err(e) => {
                    tracing::warn!(
                        genre = %genre,
                        error = %e,
                        "Genre search failed; continuing with remaining genres"
                    );
                }
            }
        }

        dedup_by_id(combined)
    }
}
