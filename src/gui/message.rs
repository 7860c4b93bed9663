use std::{path::PathBuf, sync::Arc};

use crate::{
    client::DetectError,
    models::DetectionResponse,
    view::{DragEvent, SubmissionTicket},
};

#[derive(Debug, Clone)]
pub enum Message {
    Drag(DragEvent),
    FileDropped(PathBuf),
    BrowseRequested,
    FilePicked(Option<PathBuf>),
    Detected(SubmissionTicket, Result<DetectionResponse, Arc<DetectError>>),
}
