//! HTML rendering of marker popups.
//!
//! Substrates that display popups as HTML use this; the projection itself
//! only carries the structured `Popup`.

use askama::Template;

use crate::domain::StopCategory;

use super::marker::Popup;

#[derive(Template)]
#[template(path = "popup.html")]
struct PopupTemplate<'a> {
    title: &'a str,
    description: Option<&'a str>,
    category: StopCategory,
    time: Option<&'a str>,
    day: Option<u32>,
}

/// Render a popup as an HTML fragment. Text content is escaped.
pub fn render_popup(popup: &Popup) -> Result<String, askama::Error> {
    PopupTemplate {
        title: &popup.title,
        description: popup.description.as_deref(),
        category: popup.category,
        time: popup.time.as_deref(),
        day: popup.day,
    }
    .render()
}
