mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from screw_counter for tests
pub use screw_counter::{
    DetectError, DetectionResponse, DetectionService, HttpDetectionClient, ImagePreview,
    ImageUpload, UploadState,
};
