/// Facial emotion classifier seam
///
/// Classification itself is delegated to an external analyzer; this module
/// only ships a decoded frame out and extracts the dominant-emotion label
/// from whichever payload shape the analyzer responds with.
use std::time::Duration;

use base64::Engine;
use image::{ImageEncoder, RgbImage};
use reqwest::Client as HttpClient;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

const ANALYZE_TIMEOUT: Duration = Duration::from_secs(6);

/// Fallback label used whenever no emotion could be determined.
pub const NEUTRAL: &str = "neutral";

#[cfg_attr(test, automock)]
#[async_trait]
pub trait EmotionClassifier: Send + Sync {
    /// Returns the dominant emotion for a frame, or `None` when the analyzer
    /// could not produce one. Callers substitute [`NEUTRAL`].
    async fn classify(&self, frame: &RgbImage) -> AppResult<Option<String>>;
}

/// Client for a DeepFace-style analyzer sidecar.
#[derive(Clone)]
pub struct DeepfaceClassifier {
    http_client: HttpClient,
    api_url: String,
}

impl DeepfaceClassifier {
    pub fn new(api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_url,
        }
    }

    async fn analyze(&self, frame: &RgbImage) -> AppResult<Option<String>> {
        let mut png = Vec::new();
        image::codecs::png::PngEncoder::new(&mut png)
            .write_image(
                frame.as_raw(),
                frame.width(),
                frame.height(),
                image::ColorType::Rgb8,
            )
            .map_err(|e| AppError::Internal(format!("Failed to encode frame: {}", e)))?;

        let encoded = base64::prelude::BASE64_STANDARD.encode(&png);

        // Relaxed detection: the analyzer must still answer when it is not
        // confident a face is present.
        let response = self
            .http_client
            .post(&self.api_url)
            .json(&json!({
                "img": format!("data:image/png;base64,{}", encoded),
                "actions": ["emotion"],
                "enforce_detection": false,
            }))
            .timeout(ANALYZE_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::ExternalApi(format!(
                "Emotion analyzer returned status {}",
                status
            )));
        }

        let payload: Value = response.json().await?;
        Ok(dominant_emotion(&payload))
    }
}

#[async_trait::async_trait]
impl EmotionClassifier for DeepfaceClassifier {
    async fn classify(&self, frame: &RgbImage) -> AppResult<Option<String>> {
        match self.analyze(frame).await {
            Ok(label) => Ok(label),
            Err(e) => {
                tracing::debug!(error = %e, "Emotion analysis failed");
                Ok(None)
            }
        }
    }
}

/// Classifies a frame, collapsing every failure mode to [`NEUTRAL`].
pub async fn classify_or_neutral(classifier: &dyn EmotionClassifier, frame: &RgbImage) -> String {
    match classifier.classify(frame).await {
        Ok(Some(label)) => label,
        Ok(None) => NEUTRAL.to_string(),
        Err(e) => {
            tracing::debug!(error = %e, "Classifier failed; defaulting to neutral");
            NEUTRAL.to_string()
        }
    }
}

/// Extracts the dominant-emotion label from an analyzer payload.
///
/// Accepts either an object exposing `dominant_emotion` or a list whose
/// first element does. The label is lowercased.
pub fn dominant_emotion(payload: &Value) -> Option<String> {
    let entry = match payload {
        Value::Array(items) => items.first()?,
        other => other,
    };

    entry
        .get("dominant_emotion")
        .and_then(Value::as_str)
        .map(|label| label.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dominant_emotion_from_object() {
        let payload = json!({"dominant_emotion": "happy", "region": {}});
        assert_eq!(dominant_emotion(&payload), Some("happy".to_string()));
    }

    #[test]
    fn test_dominant_emotion_from_list() {
        let payload = json!([{"dominant_emotion": "sad"}, {"dominant_emotion": "happy"}]);
        assert_eq!(dominant_emotion(&payload), Some("sad".to_string()));
    }

    #[test]
    fn test_dominant_emotion_is_lowercased() {
        let payload = json!({"dominant_emotion": "Angry"});
        assert_eq!(dominant_emotion(&payload), Some("angry".to_string()));
    }

    #[test]
    fn test_missing_field_yields_none() {
        assert_eq!(dominant_emotion(&json!({"emotion": "happy"})), None);
        assert_eq!(dominant_emotion(&json!([])), None);
        assert_eq!(dominant_emotion(&json!("happy")), None);
    }
}
