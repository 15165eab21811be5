use std::sync::Arc;

use crate::{
    config::Config,
    services::{
        classifier::{DeepfaceClassifier, EmotionClassifier},
        providers::{tmdb::TmdbCatalog, CatalogProvider},
        recommender::{HttpRecommender, Recommender},
        resolver::RecommendationResolver,
    },
};

/// Shared application state
///
/// Everything here is read-only after startup; requests share no mutable
/// state with each other.
pub struct AppState {
    pub classifier: Arc<dyn EmotionClassifier>,
    pub resolver: RecommendationResolver,
    pub webcam_device: String,
}

impl AppState {
    pub fn new(
        classifier: Arc<dyn EmotionClassifier>,
        resolver: RecommendationResolver,
        webcam_device: String,
    ) -> Self {
        Self {
            classifier,
            resolver,
            webcam_device,
        }
    }

    /// Wires the production components from configuration.
    pub fn from_config(config: &Config) -> Self {
        let catalog: Arc<dyn CatalogProvider> = Arc::new(TmdbCatalog::new(
            config.tmdb_api_key.clone(),
            config.tmdb_api_url.clone(),
            config.poster_base_url.clone(),
        ));

        let recommender = config
            .recommender_api_url
            .clone()
            .map(|url| Arc::new(HttpRecommender::new(url)) as Arc<dyn Recommender>);

        let classifier: Arc<dyn EmotionClassifier> =
            Arc::new(DeepfaceClassifier::new(config.emotion_api_url.clone()));

        let resolver = RecommendationResolver::new(catalog, recommender, config.max_per_genre);

        Self::new(classifier, resolver, config.webcam_device.clone())
    }
}
