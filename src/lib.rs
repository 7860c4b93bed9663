pub mod client;
pub mod config;
pub mod headless;
pub mod models;
pub mod telemetry;
pub mod upload;
pub mod view;

pub use client::{DetectError, DetectionService, HttpDetectionClient};
pub use models::{CountEntry, DetectionCounts, DetectionResponse, ImagePreview};
pub use upload::ImageUpload;
pub use view::{DragEvent, PreviewKind, SubmissionTicket, UploadState};

#[cfg(feature = "gui")]
pub mod gui;
