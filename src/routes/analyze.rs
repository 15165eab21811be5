use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use base64::Engine;
use image::RgbImage;
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    routes::RecommendationResponse,
    services::classifier::{classify_or_neutral, NEUTRAL},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    /// Base64 image payload, with or without a `data:image/...;base64,` prefix.
    pub image: String,
}

/// Handler for browser-captured frames.
///
/// An undecodable payload is not an error: the mood falls back to neutral
/// and recommendations are still produced.
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<AnalyzeRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    let mood = match decode_data_url(&request.image) {
        Ok(frame) => classify_or_neutral(state.classifier.as_ref(), &frame).await,
        Err(e) => {
            tracing::debug!(error = %e, "Posted frame could not be decoded");
            NEUTRAL.to_string()
        }
    };

    let recommendations = state.resolver.resolve(&mood).await;

    tracing::info!(
        request_id = %request_id,
        mood = %mood,
        recommendations = recommendations.len(),
        "Analysis completed"
    );

    Ok(Json(RecommendationResponse {
        mood,
        recommendations,
    }))
}

/// Strips an optional data-URL prefix and decodes the payload to an RGB
/// buffer.
fn decode_data_url(payload: &str) -> AppResult<RgbImage> {
    let encoded = match payload.split_once(',') {
        Some((_, rest)) => rest,
        None => payload,
    };

    let bytes = base64::prelude::BASE64_STANDARD
        .decode(encoded.trim())
        .map_err(|e| AppError::InvalidInput(format!("Invalid base64 image: {}", e)))?;

    let image = image::load_from_memory(&bytes)
        .map_err(|e| AppError::InvalidInput(format!("Unreadable image data: {}", e)))?;

    Ok(image.to_rgb8())
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1x1 white PNG
    const TINY_PNG_B64: &str =
        "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAIAAACQd1PeAAAADElEQVR4nGP4//8/AAX+Av4N70a4AAAAAElFTkSuQmCC";

    #[test]
    fn test_decode_with_data_url_prefix() {
        let payload = format!("data:image/png;base64,{}", TINY_PNG_B64);
        let frame = decode_data_url(&payload).unwrap();
        assert_eq!((frame.width(), frame.height()), (1, 1));
    }

    #[test]
    fn test_decode_without_prefix() {
        let frame = decode_data_url(TINY_PNG_B64).unwrap();
        assert_eq!((frame.width(), frame.height()), (1, 1));
    }

    #[test]
    fn test_invalid_base64_is_rejected() {
        assert!(decode_data_url("data:image/png;base64,!!!").is_err());
    }

    #[test]
    fn test_non_image_bytes_are_rejected() {
        let payload = base64::prelude::BASE64_STANDARD.encode(b"not an image");
        assert!(decode_data_url(&payload).is_err());
    }
}
