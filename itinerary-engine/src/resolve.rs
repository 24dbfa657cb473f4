//! Stop coordinate resolution.
//!
//! Normalizes any stop into a single `(position, name, description,
//! category)` record for map and transport consumers. A stop that yields no
//! finite coordinate pair is unresolvable; consumers skip it silently.

use serde::Serialize;

use crate::domain::{CustomPoint, Day, LatLng, PlaceRef, Stop, StopCategory, StopKind};

/// Which field of a stop supplied its coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateSource {
    Location,
    Hotel,
    Custom,
    Legacy,
}

/// A stop with usable coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedStop {
    pub position: LatLng,
    pub name: String,
    pub description: Option<String>,
    pub category: StopCategory,
    pub source: CoordinateSource,
}

/// Resolve a stop's coordinates and display data.
///
/// Sources are tried in the order location reference, hotel reference,
/// custom point, legacy flat point, whether the reference is the stop's own
/// or an extra one. The category reflects the source that resolved, except
/// for the legacy point, which keeps the stop's declared category. Returns
/// `None` when no source yields coordinates.
pub fn resolve_stop(stop: &Stop) -> Option<ResolvedStop> {
    stop.location()
        .and_then(|r| from_place(r, StopCategory::Location, CoordinateSource::Location))
        .or_else(|| {
            stop.hotel()
                .and_then(|r| from_place(r, StopCategory::Hotel, CoordinateSource::Hotel))
        })
        .or_else(|| stop.custom_point().and_then(from_custom))
        .or_else(|| legacy(stop))
}

/// Resolved stops of a day, in order, paired with their stop index.
pub fn resolve_day(day: &Day) -> Vec<(usize, ResolvedStop)> {
    day.stops
        .iter()
        .enumerate()
        .filter_map(|(i, stop)| resolve_stop(stop).map(|r| (i, r)))
        .collect()
}

fn from_place(r: &PlaceRef, category: StopCategory, source: CoordinateSource) -> Option<ResolvedStop> {
    let position = r.position()?;
    let place = r.place.as_ref();
    Some(ResolvedStop {
        position,
        name: place.map(|p| p.name.clone()).unwrap_or_else(|| fallback_name(category)),
        description: place.and_then(|p| p.description.clone()),
        category,
        source,
    })
}

fn from_custom(c: &CustomPoint) -> Option<ResolvedStop> {
    Some(ResolvedStop {
        position: c.position?,
        name: c.name.clone(),
        description: c.description.clone(),
        category: StopCategory::Custom,
        source: CoordinateSource::Custom,
    })
}

fn legacy(stop: &Stop) -> Option<ResolvedStop> {
    let position = stop.legacy_point?;
    let category = stop.category();
    let description = match &stop.kind {
        StopKind::Location(r) | StopKind::Hotel(r) => r.place.as_ref().and_then(|p| p.description.clone()),
        StopKind::Custom(c) => c.description.clone(),
        StopKind::Transport(_) => None,
    };

    Some(ResolvedStop {
        position,
        name: stop.name().map(str::to_string).unwrap_or_else(|| fallback_name(category)),
        description: description.or_else(|| stop.notes.clone()),
        category,
        source: CoordinateSource::Legacy,
    })
}

fn fallback_name(category: StopCategory) -> String {
    match category {
        StopCategory::Location => "Location".to_string(),
        StopCategory::Hotel => "Hotel".to_string(),
        StopCategory::Transport => "Transport".to_string(),
        StopCategory::Custom => "Custom stop".to_string(),
    }
}
