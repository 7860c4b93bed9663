mod app;
mod message;
mod widgets;

pub use app::{ScrewCounterApp, run};
pub use message::Message;
