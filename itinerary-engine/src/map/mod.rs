//! Map projection.
//!
//! Turns resolved stops into declarative marker descriptors, a route
//! polyline and a fit-bounds request for whatever map substrate renders
//! them. Stops without coordinates are skipped without error.

mod config;
mod marker;
mod popup;
mod projector;

pub use config::MapConfig;
pub use marker::{FitBounds, Marker, MarkerIcon, MarkerRef, Polyline, Popup};
pub use popup::render_popup;
pub use projector::{MapProjector, MapView, Projection, ProjectionMode};
