//! Terminal rendering.
//!
//! - [`DocumentView`] draws a [`Document`](crate::dom::Document) (the page and
//!   its modals) and records a [`HitMap`] for mouse clicks
//! - [`markup`] flattens modal markup to plain text
//! - [`StatusBar`] and [`ToastManager`] are the demo's chrome

mod document_view;
pub mod markup;
mod status_bar;
mod stylesheet;
mod toast;

use ratatui::Frame;
use ratatui::layout::Rect;

use crate::Theme;

pub use document_view::{DocumentView, HitMap};
pub use status_bar::{Keybinding, StatusBar, StatusInfo};
pub use stylesheet::transition_rules;
pub use toast::{Toast, ToastManager, ToastType};

/// Chrome drawn around the document.
pub trait Component {
    /// Called on each tick for time-based updates.
    fn handle_tick(&mut self) {}

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme);
}
