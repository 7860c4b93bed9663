use iced::{
    Alignment::Center,
    Color, Element, Length, Theme, border,
    widget::{button, column, container, container::Style, image, row, text},
};
use iced_widget::container::bordered_box;

use crate::{gui::Message, models::CountEntry};

/// Drop target with the "browse" button. Highlighted while files hover the window.
pub fn upload_area<'a>(drag_active: bool) -> Element<'a, Message> {
    let prompt = row![
        text("Drop your image here or"),
        button("browse")
            .on_press(Message::BrowseRequested)
            .style(button::text),
    ]
    .spacing(6)
    .align_y(Center);

    container(
        column![prompt, text("Supports: JPG, PNG, WEBP").size(12)]
            .spacing(8)
            .align_x(Center),
    )
    .padding(40)
    .center_x(Length::Fill)
    .style(move |theme: &Theme| upload_area_style(theme, drag_active))
    .into()
}

fn upload_area_style(theme: &Theme, drag_active: bool) -> Style {
    let palette = theme.palette();
    let style = bordered_box(theme);
    if drag_active {
        style
            .border(border::rounded(8.0).width(2.0).color(palette.primary))
            .background(palette.primary.scale_alpha(0.15))
    } else {
        style.border(
            border::rounded(8.0)
                .width(2.0)
                .color(palette.text.scale_alpha(0.4)),
        )
    }
}

pub fn loading<'a>() -> Element<'a, Message> {
    container(text("Processing image...")).padding(10).into()
}

pub fn error_line<'a>(error: &'a str) -> Element<'a, Message> {
    text(format!("Error: {error}"))
        .color(Color::from_rgb8(0xe5, 0x48, 0x4d))
        .into()
}

pub fn results_card<'a>(entries: Vec<CountEntry>) -> Element<'a, Message> {
    let grid = entries
        .into_iter()
        .fold(row![].spacing(16), |grid, entry| grid.push(count_card(entry)));

    container(column![text("Detection Results").size(24), grid].spacing(12))
        .padding(20)
        .width(Length::Fill)
        .style(bordered_box)
        .into()
}

fn count_card<'a>(entry: CountEntry) -> Element<'a, Message> {
    container(
        column![
            text(entry.label()).size(14),
            text(entry.count.to_string()).size(28),
        ]
        .spacing(4)
        .align_x(Center),
    )
    .padding(12)
    .style(bordered_box)
    .into()
}

pub fn image_card<'a>(title: &'a str, handle: Option<&image::Handle>) -> Element<'a, Message> {
    let body: Element<'a, Message> = match handle {
        Some(handle) => image(handle.clone()).width(Length::Fill).into(),
        None => text("Preview unavailable").into(),
    };

    container(column![text(title).size(18), body].spacing(10))
        .padding(12)
        .width(Length::FillPortion(1))
        .style(bordered_box)
        .into()
}
