use std::{path::PathBuf, sync::Arc};

use iced::{
    Alignment::Center,
    Element, Event, Length, Subscription, Task, Theme, event,
    widget::{column, container, image, row, scrollable, text},
    window,
};
use rfd::AsyncFileDialog;

use super::{Message, widgets};
use crate::{
    client::{DetectionService, HttpDetectionClient},
    models::ImagePreview,
    upload::ImageUpload,
    view::{DragEvent, PreviewKind, UploadState},
};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "bmp", "gif"];

pub fn run(client: HttpDetectionClient) -> iced::Result {
    iced::application(
        move || ScrewCounterApp::new(client.clone()),
        ScrewCounterApp::update,
        ScrewCounterApp::view,
    )
    .title(|_state: &ScrewCounterApp| "Screw Counter".to_string())
    .theme(|_state: &ScrewCounterApp| Theme::Dark)
    .subscription(ScrewCounterApp::subscription)
    .run()
}

pub struct ScrewCounterApp {
    state: UploadState,
    client: Arc<HttpDetectionClient>,
    original_handle: Option<image::Handle>,
    annotated_handle: Option<image::Handle>,
    /// Set by the first file of a drop, cleared by the next hover.
    drop_consumed: bool,
}

impl ScrewCounterApp {
    pub fn new(client: HttpDetectionClient) -> (Self, Task<Message>) {
        (
            Self {
                state: UploadState::new(),
                client: Arc::new(client),
                original_handle: None,
                annotated_handle: None,
                drop_consumed: false,
            },
            Task::none(),
        )
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Drag(event) => {
                if event == DragEvent::Enter {
                    self.drop_consumed = false;
                }
                self.state.handle_drag_event(event);
                Task::none()
            }
            Message::FileDropped(path) => self.handle_drop(path),
            Message::BrowseRequested => Task::perform(
                AsyncFileDialog::new()
                    .set_title("Select an image")
                    .add_filter("Images", IMAGE_EXTENSIONS)
                    .pick_file(),
                |handle| Message::FilePicked(handle.map(|file| file.path().to_path_buf())),
            ),
            Message::FilePicked(path) => self.handle_file_pick(path),
            Message::Detected(ticket, outcome) => {
                self.state.complete_submission(ticket, outcome);
                self.refresh_previews();
                Task::none()
            }
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let mut content = column![
            text("Screw Counter").size(32),
            widgets::upload_area(self.state.is_drag_active()),
        ]
        .spacing(20)
        .padding(20)
        .align_x(Center)
        .max_width(960);

        if self.state.is_busy() {
            content = content.push(widgets::loading());
        }

        if let Some(error) = self.state.last_error() {
            content = content.push(widgets::error_line(error));
        }

        if self.state.detection_counts().is_some() {
            content = content.push(widgets::results_card(self.state.count_entries()));
        }

        let cards: Vec<Element<'_, Message>> = self
            .state
            .previews()
            .map(|(kind, _)| widgets::image_card(kind.title(), self.handle_for(kind)))
            .collect();
        if !cards.is_empty() {
            content = content.push(row(cards).spacing(20));
        }

        container(scrollable(content))
            .center_x(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    pub fn subscription(&self) -> Subscription<Message> {
        event::listen_with(file_drag_events)
    }

    /// winit reports one `FileDropped` per file. The first one is submitted,
    /// the rest are ignored until a new hover starts another gesture. Drops
    /// that arrive without any hover are still submitted.
    fn handle_drop(&mut self, path: PathBuf) -> Task<Message> {
        if self.drop_consumed {
            tracing::debug!(path = %path.display(), "ignoring additional dropped file");
            return Task::none();
        }
        self.drop_consumed = true;
        match self.state.handle_drop([path]) {
            Some(path) => self.submit_path(path),
            None => Task::none(),
        }
    }

    fn handle_file_pick(&mut self, path: Option<PathBuf>) -> Task<Message> {
        match path {
            Some(path) => self.submit_path(path),
            None => Task::none(),
        }
    }

    fn submit_path(&mut self, path: PathBuf) -> Task<Message> {
        let ticket = self.state.begin_submission();
        let client = Arc::clone(&self.client);
        tracing::info!(path = %path.display(), "submitting image");

        Task::perform(
            async move {
                let upload = ImageUpload::from_path(&path).await?;
                client.detect(upload).await
            },
            move |outcome| Message::Detected(ticket, outcome.map_err(Arc::new)),
        )
    }

    fn refresh_previews(&mut self) {
        self.original_handle = preview_handle(self.state.original_image_preview());
        self.annotated_handle = preview_handle(self.state.annotated_image_preview());
    }

    fn handle_for(&self, kind: PreviewKind) -> Option<&image::Handle> {
        match kind {
            PreviewKind::Original => self.original_handle.as_ref(),
            PreviewKind::Detected => self.annotated_handle.as_ref(),
        }
    }
}

fn preview_handle(preview: Option<&ImagePreview>) -> Option<image::Handle> {
    match preview?.decode() {
        Ok(bytes) => Some(image::Handle::from_bytes(bytes)),
        Err(err) => {
            tracing::warn!(error = %err, "preview is not valid base64");
            None
        }
    }
}

fn file_drag_events(event: Event, _status: event::Status, _window: window::Id) -> Option<Message> {
    match event {
        Event::Window(window::Event::FileHovered(_)) => Some(Message::Drag(DragEvent::Enter)),
        Event::Window(window::Event::FilesHoveredLeft) => Some(Message::Drag(DragEvent::Leave)),
        Event::Window(window::Event::FileDropped(path)) => Some(Message::FileDropped(path)),
        _ => None,
    }
}
