use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// TMDb API key. Absent key disables catalog lookups (every call
    /// degrades to an empty result) rather than failing startup.
    #[serde(default)]
    pub tmdb_api_key: Option<String>,

    /// TMDb API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// CDN base for poster path fragments
    #[serde(default = "default_poster_base_url")]
    pub poster_base_url: String,

    /// Optional external recommender endpoint; absence disables that path
    #[serde(default)]
    pub recommender_api_url: Option<String>,

    /// Emotion analyzer sidecar endpoint
    #[serde(default = "default_emotion_api_url")]
    pub emotion_api_url: String,

    /// Video device used for server-side capture
    #[serde(default = "default_webcam_device")]
    pub webcam_device: String,

    /// Maximum records kept per genre search
    #[serde(default = "default_max_per_genre")]
    pub max_per_genre: usize,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_poster_base_url() -> String {
    "https://image.tmdb.org/t/p/w500".to_string()
}

fn default_emotion_api_url() -> String {
    "http://127.0.0.1:5005/analyze".to_string()
}

fn default_webcam_device() -> String {
    "/dev/video0".to_string()
}

fn default_max_per_genre() -> usize {
    3
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let mut config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.normalize();
        Ok(config)
    }

    /// Blank optional values behave as unset so that e.g.
    /// `RECOMMENDER_API_URL=""` does not enable the external path.
    fn normalize(&mut self) {
        let blank = |v: &Option<String>| v.as_deref().map_or(false, |s| s.trim().is_empty());
        if blank(&self.tmdb_api_key) {
            self.tmdb_api_key = None;
        }
        if blank(&self.recommender_api_url) {
            self.recommender_api_url = None;
        }
    }
}
