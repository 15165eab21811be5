use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Extension, Json,
};

use crate::{
    capture,
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    routes::RecommendationResponse,
    services::classifier::{classify_or_neutral, NEUTRAL},
    state::AppState,
};

/// Upload types accepted for emotion analysis.
const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

/// Handler for the form-driven flow: either an uploaded image or the
/// server-side webcam, selected by the `source` field.
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    mut multipart: Multipart,
) -> AppResult<Json<RecommendationResponse>> {
    let mut source = "upload".to_string();
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Malformed multipart body: {}", e)))?
    {
        match field.name() {
            Some("source") => {
                source = field
                    .text()
                    .await
                    .map_err(|e| AppError::InvalidInput(format!("Unreadable source field: {}", e)))?;
            }
            Some("image") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::InvalidInput(format!("Unreadable upload: {}", e)))?;
                upload = Some((filename, data.to_vec()));
            }
            _ => {}
        }
    }

    let mood = if source == "webcam" {
        webcam_mood(&state).await
    } else {
        let (filename, data) =
            upload.ok_or_else(|| AppError::InvalidInput("No file uploaded".to_string()))?;

        if filename.is_empty() {
            return Err(AppError::InvalidInput("No file selected".to_string()));
        }
        if !allowed_file(&filename) {
            return Err(AppError::InvalidInput(format!(
                "Unsupported file type. Allowed: {}",
                ALLOWED_EXTENSIONS.join(", ")
            )));
        }

        upload_mood(&state, &data).await
    };

    let recommendations = state.resolver.resolve(&mood).await;

    tracing::info!(
        request_id = %request_id,
        source = %source,
        mood = %mood,
        recommendations = recommendations.len(),
        "Recommendation completed"
    );

    Ok(Json(RecommendationResponse {
        mood,
        recommendations,
    }))
}

/// Headless endpoint: always uses the server webcam, answers JSON.
pub async fn api_recommend(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<RecommendationResponse>> {
    let mood = webcam_mood(&state).await;
    let recommendations = state.resolver.resolve(&mood).await;

    Ok(Json(RecommendationResponse {
        mood,
        recommendations,
    }))
}

/// Grabs a frame from the server camera and classifies it. An unavailable
/// camera or a failed grab yields the neutral mood, not an error.
async fn webcam_mood(state: &AppState) -> String {
    match capture::capture_rgb_frame(&state.webcam_device).await {
        Ok(frame) => classify_or_neutral(state.classifier.as_ref(), &frame).await,
        Err(e) => {
            tracing::warn!(error = %e, "Webcam not available");
            NEUTRAL.to_string()
        }
    }
}

/// Decodes uploaded bytes and classifies them; undecodable uploads degrade
/// to the neutral mood.
async fn upload_mood(state: &AppState, data: &[u8]) -> String {
    if data.is_empty() {
        return NEUTRAL.to_string();
    }

    match image::load_from_memory(data) {
        Ok(img) => classify_or_neutral(state.classifier.as_ref(), &img.to_rgb8()).await,
        Err(e) => {
            tracing::debug!(error = %e, "Uploaded file could not be decoded as an image");
            NEUTRAL.to_string()
        }
    }
}

fn allowed_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}
