use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use image::{ImageBuffer, Rgb};
use screw_counter::HttpDetectionClient;
use serde_json::{Value, json};
use tempfile::NamedTempFile;

/// Creates a 100x100 red test image and returns the temp file.
/// The file will be automatically cleaned up when dropped.
pub fn create_test_image() -> NamedTempFile {
    let img = ImageBuffer::from_fn(100, 100, |_, _| Rgb([255u8, 0u8, 0u8]));
    let file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("Failed to create temp image file");
    img.save_with_format(file.path(), image::ImageFormat::Png)
        .expect("Failed to save test image");
    file
}

/// The body a well-behaved detection service sends back.
pub fn detection_body(original: &str, annotated: &str, counts: Value) -> Value {
    json!({
        "original_image": original,
        "annotated_image": annotated,
        "counts": counts,
    })
}

/// What the fake service answers with.
#[derive(Clone)]
pub enum Reply {
    Json(Value),
    Status(StatusCode, &'static str),
    Raw(&'static str),
}

/// One multipart field as seen by the fake service.
#[derive(Debug, Clone)]
pub struct ReceivedPart {
    pub name: Option<String>,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Clone)]
struct FakeState {
    reply: Reply,
    received: Arc<Mutex<Vec<ReceivedPart>>>,
}

/// A detection service on an ephemeral local port. Stops with the test runtime.
pub struct FakeDetectionService {
    pub endpoint: String,
    received: Arc<Mutex<Vec<ReceivedPart>>>,
}

impl FakeDetectionService {
    pub fn client(&self) -> HttpDetectionClient {
        HttpDetectionClient::new(self.endpoint.clone()).expect("Failed to build client")
    }

    pub fn received(&self) -> Vec<ReceivedPart> {
        self.received.lock().unwrap().clone()
    }
}

pub async fn spawn_detection_service(reply: Reply) -> FakeDetectionService {
    let received = Arc::new(Mutex::new(Vec::new()));
    let state = FakeState {
        reply,
        received: received.clone(),
    };

    let app = Router::new()
        .route("/detect", post(detect))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fake detection service");
    let addr = listener.local_addr().expect("Failed to read local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    FakeDetectionService {
        endpoint: format!("http://{addr}/detect"),
        received,
    }
}

/// An endpoint nothing listens on.
pub async fn unreachable_endpoint() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind throwaway listener");
    let addr = listener.local_addr().expect("Failed to read local address");
    drop(listener);
    format!("http://{addr}/detect")
}

async fn detect(State(state): State<FakeState>, mut multipart: Multipart) -> Response {
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().map(str::to_owned);
        let file_name = field.file_name().map(str::to_owned);
        let content_type = field.content_type().map(str::to_owned);
        let bytes = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        state.received.lock().unwrap().push(ReceivedPart {
            name,
            file_name,
            content_type,
            bytes,
        });
    }

    match state.reply {
        Reply::Json(body) => Json(body).into_response(),
        Reply::Status(status, body) => (status, body).into_response(),
        Reply::Raw(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
    }
}
