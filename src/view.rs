//! View-model for the upload-and-detect screen.
//!
//! [`UploadState`] owns every piece of display state. The GUI shell (or the
//! headless CLI) feeds it drag/drop events and submission outcomes; rendering
//! reads it back through the accessors.

use std::fmt::Display;

use crate::{
    client::DetectionService,
    models::{CountEntry, DetectionCounts, DetectionResponse, ImagePreview},
    upload::ImageUpload,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragEvent {
    Enter,
    Over,
    Leave,
}

/// Identifies one submission. Later submissions carry larger tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubmissionTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewKind {
    Original,
    Detected,
}

impl PreviewKind {
    pub fn title(self) -> &'static str {
        match self {
            PreviewKind::Original => "Original Image",
            PreviewKind::Detected => "Detected Objects",
        }
    }
}

#[derive(Debug, Default)]
pub struct UploadState {
    original_image_preview: Option<ImagePreview>,
    annotated_image_preview: Option<ImagePreview>,
    detection_counts: Option<DetectionCounts>,
    last_error: Option<String>,
    is_drag_active: bool,
    in_flight: usize,
    latest_ticket: u64,
}

impl UploadState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    pub fn is_drag_active(&self) -> bool {
        self.is_drag_active
    }

    pub fn original_image_preview(&self) -> Option<&ImagePreview> {
        self.original_image_preview.as_ref()
    }

    pub fn annotated_image_preview(&self) -> Option<&ImagePreview> {
        self.annotated_image_preview.as_ref()
    }

    pub fn detection_counts(&self) -> Option<&DetectionCounts> {
        self.detection_counts.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Rows for the results card, in response order. Empty before the first result.
    pub fn count_entries(&self) -> Vec<CountEntry> {
        self.detection_counts
            .as_ref()
            .map(DetectionCounts::entries)
            .unwrap_or_default()
    }

    /// Previews that are present, original first.
    pub fn previews(&self) -> impl Iterator<Item = (PreviewKind, &ImagePreview)> {
        [
            (PreviewKind::Original, self.original_image_preview.as_ref()),
            (PreviewKind::Detected, self.annotated_image_preview.as_ref()),
        ]
        .into_iter()
        .filter_map(|(kind, preview)| preview.map(|preview| (kind, preview)))
    }

    pub fn handle_drag_event(&mut self, event: DragEvent) {
        self.is_drag_active = match event {
            DragEvent::Enter | DragEvent::Over => true,
            DragEvent::Leave => false,
        };
    }

    /// Ends the drag gesture and returns the file to submit. Only the first
    /// dropped file is kept.
    pub fn handle_drop<T>(&mut self, files: impl IntoIterator<Item = T>) -> Option<T> {
        self.is_drag_active = false;
        files.into_iter().next()
    }

    /// Marks a submission as in flight. Must be paired with
    /// [`UploadState::complete_submission`].
    pub fn begin_submission(&mut self) -> SubmissionTicket {
        self.in_flight += 1;
        self.latest_ticket += 1;
        self.last_error = None;
        SubmissionTicket(self.latest_ticket)
    }

    /// Applies the outcome of a submission. Results from a submission that has
    /// since been superseded are dropped; failures leave previous results in place.
    pub fn complete_submission<E: Display>(
        &mut self,
        ticket: SubmissionTicket,
        outcome: Result<DetectionResponse, E>,
    ) {
        let is_latest = ticket.0 == self.latest_ticket;

        match outcome {
            Ok(response) if is_latest => {
                tracing::info!(
                    ticket = ticket.0,
                    classes = response.counts.len(),
                    "detection results applied"
                );
                self.original_image_preview =
                    Some(ImagePreview::from_base64(&response.original_image));
                self.annotated_image_preview =
                    Some(ImagePreview::from_base64(&response.annotated_image));
                self.detection_counts = Some(response.counts);
            }
            Ok(_) => {
                tracing::warn!(
                    ticket = ticket.0,
                    latest = self.latest_ticket,
                    "discarding results of a superseded upload"
                );
            }
            Err(err) => {
                tracing::error!(ticket = ticket.0, error = %err, "image detection failed");
                if is_latest {
                    self.last_error = Some(err.to_string());
                }
            }
        }

        self.in_flight = self.in_flight.saturating_sub(1);
    }

    /// Runs one full submission against `service`. A missing file is a no-op.
    pub async fn submit_image<S: DetectionService>(
        &mut self,
        service: &S,
        file: Option<ImageUpload>,
    ) {
        let Some(upload) = file else {
            return;
        };

        let ticket = self.begin_submission();
        let outcome = service.detect(upload).await;
        self.complete_submission(ticket, outcome);
    }
}
