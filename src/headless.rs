//! One-shot detection for the `detect` subcommand.

use std::path::Path;

use anyhow::Context;

use crate::{client::DetectionService, upload::ImageUpload, view::UploadState};

pub const NO_OBJECTS_LINE: &str = "No objects detected.";

/// Submits `image_path` through a fresh [`UploadState`] and returns the lines
/// to print. Writes the annotated JPEG to `annotated_out` when given.
pub async fn detect_once<S: DetectionService>(
    service: &S,
    image_path: &Path,
    annotated_out: Option<&Path>,
) -> anyhow::Result<Vec<String>> {
    let upload = ImageUpload::from_path(image_path).await?;

    let mut state = UploadState::new();
    state.submit_image(service, Some(upload)).await;

    if let Some(error) = state.last_error() {
        anyhow::bail!("detection failed: {error}");
    }

    let mut lines: Vec<String> = state
        .count_entries()
        .iter()
        .map(ToString::to_string)
        .collect();
    if lines.is_empty() {
        lines.push(NO_OBJECTS_LINE.to_string());
    }

    if let (Some(path), Some(preview)) = (annotated_out, state.annotated_image_preview()) {
        let bytes = preview
            .decode()
            .context("annotated image is not valid base64")?;
        tokio::fs::write(path, bytes)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), "annotated image written");
    }

    Ok(lines)
}
