//! Declarative map descriptors.
//!
//! These types describe what to draw, not how. A rendering substrate maps
//! each `MarkerIcon` to its own styling.

use serde::Serialize;

use crate::domain::{Bounds, LatLng, StopCategory};

/// Which icon a marker should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MarkerIcon {
    /// First stop of the whole trip.
    Start,
    /// Last stop of the whole trip.
    End,
    /// Interior stop, labelled with its day ordinal.
    Day { ordinal: u32, active: bool },
    /// Stop in a flat list, styled by category.
    Category { category: StopCategory },
}

/// Identifies the stop a marker was built from.
///
/// `day_index` is `None` for markers projected from a flat stop list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerRef {
    pub day_index: Option<usize>,
    pub stop_index: usize,
}

/// Content shown when a marker is opened.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Popup {
    pub title: String,
    pub description: Option<String>,
    pub category: StopCategory,
    /// Time of day as `HH:MM`.
    pub time: Option<String>,
    /// Day ordinal in day-grouped projections.
    pub day: Option<u32>,
}

/// A single map marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub position: LatLng,
    pub icon: MarkerIcon,
    #[serde(rename = "popupContent")]
    pub popup: Popup,
    pub target: MarkerRef,
}

/// Route line through resolved stops in traversal order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Polyline {
    pub positions: Vec<LatLng>,
}

impl Polyline {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Total length along the line in metres.
    pub fn length_m(&self) -> f64 {
        self.positions
            .windows(2)
            .map(|w| w[0].distance_m(&w[1]))
            .sum()
    }
}

/// Request for the substrate to fit its viewport.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FitBounds {
    pub positions: Vec<LatLng>,
    pub padding_px: u32,
    pub bounds: Bounds,
}
