/// Server-side webcam capture
///
/// A [`CameraLease`] scopes device access to a single request: it owns the
/// capture process and its `Drop` kills a still-running one, so the device
/// is released even when a handler bails out partway through.
use std::process::Stdio;
use std::time::Duration;

use image::RgbImage;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};

use crate::error::{AppError, AppResult};

const GRAB_TIMEOUT: Duration = Duration::from_secs(10);
const REAP_TIMEOUT: Duration = Duration::from_secs(2);

pub struct CameraLease {
    device: String,
    child: Option<Child>,
}

impl CameraLease {
    pub fn open(device: &str) -> Self {
        Self {
            device: device.to_string(),
            child: None,
        }
    }

    /// Grabs a single frame from the device as encoded PNG bytes.
    pub async fn grab_frame(&mut self) -> AppResult<Vec<u8>> {
        let mut child = Command::new("ffmpeg")
            .args(["-v", "error", "-f", "v4l2", "-i"])
            .arg(&self.device)
            .args(["-frames:v", "1", "-f", "image2", "-c:v", "png", "pipe:1"])
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| AppError::Capture(format!("Failed to start capture: {}", e)))?;

        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| AppError::Capture("Capture process has no stdout".to_string()))?;
        self.child = Some(child);

        let mut frame = Vec::new();
        match tokio::time::timeout(GRAB_TIMEOUT, stdout.read_to_end(&mut frame)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                return Err(AppError::Capture(format!("Failed to read frame: {}", e)));
            }
            Err(_) => {
                return Err(AppError::Capture(
                    "Timed out waiting for a webcam frame".to_string(),
                ));
            }
        }

        // Stdout hit EOF, so ffmpeg is done; reap it and check the status.
        if let Some(child) = self.child.as_mut() {
            match tokio::time::timeout(REAP_TIMEOUT, child.wait()).await {
                Ok(Ok(status)) => {
                    self.child = None;
                    if !status.success() {
                        return Err(AppError::Capture(format!(
                            "Capture process exited with status {}",
                            status
                        )));
                    }
                }
                Ok(Err(e)) => {
                    self.child = None;
                    return Err(AppError::Capture(format!(
                        "Failed to reap capture process: {}",
                        e
                    )));
                }
                Err(_) => {
                    return Err(AppError::Capture(
                        "Capture process did not exit".to_string(),
                    ));
                }
            }
        }

        if frame.is_empty() {
            return Err(AppError::Capture("Webcam produced no frame data".to_string()));
        }

        Ok(frame)
    }
}

impl Drop for CameraLease {
    fn drop(&mut self) {
        if let Some(child) = self.child.as_mut() {
            tracing::debug!(device = %self.device, "Releasing webcam, killing capture process");
            let _ = child.start_kill();
        }
    }
}

/// Grabs one frame from the device and decodes it to an RGB buffer.
///
/// The device lease lives only inside this call, so the camera is released
/// before the caller continues, on every path.
pub async fn capture_rgb_frame(device: &str) -> AppResult<RgbImage> {
    let mut lease = CameraLease::open(device);
    let bytes = lease.grab_frame().await?;

    let image = image::load_from_memory(&bytes)
        .map_err(|e| AppError::Capture(format!("Failed to decode webcam frame: {}", e)))?;
    Ok(image.to_rgb8())
}
