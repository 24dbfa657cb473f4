//! Stop types.
//!
//! A stop is one visitable point within a day. Stops come from different
//! origins (curated locations, hotels, transport options, ad-hoc points),
//! modelled as a tagged union so each origin is resolved by its own rule.

use std::fmt;

use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::Serialize;

use super::LatLng;

/// A place known to the backend (a curated location or a hotel).
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub name: String,
    pub description: Option<String>,
    /// Missing when the backend has no coordinates on record.
    pub position: Option<LatLng>,
}

/// Reference to a backend place, with its resolved data when available.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceRef {
    pub id: String,
    /// `None` when the reference was not populated by the API.
    pub place: Option<Place>,
}

impl PlaceRef {
    pub fn new(id: impl Into<String>, place: Option<Place>) -> Self {
        Self {
            id: id.into(),
            place,
        }
    }

    pub fn position(&self) -> Option<LatLng> {
        self.place.as_ref().and_then(|p| p.position)
    }
}

/// Reference to a transport option booked as part of a day.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRef {
    pub id: String,
    pub name: Option<String>,
}

/// An ad-hoc point entered by the traveler.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomPoint {
    pub name: String,
    pub description: Option<String>,
    pub position: Option<LatLng>,
}

/// Where a stop comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum StopKind {
    Location(PlaceRef),
    Hotel(PlaceRef),
    Transport(TransportRef),
    Custom(CustomPoint),
}

impl StopKind {
    pub fn category(&self) -> StopCategory {
        match self {
            StopKind::Location(_) => StopCategory::Location,
            StopKind::Hotel(_) => StopCategory::Hotel,
            StopKind::Transport(_) => StopCategory::Transport,
            StopKind::Custom(_) => StopCategory::Custom,
        }
    }
}

/// Display category of a stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StopCategory {
    Location,
    Hotel,
    Transport,
    Custom,
}

impl StopCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopCategory::Location => "location",
            StopCategory::Hotel => "hotel",
            StopCategory::Transport => "transport",
            StopCategory::Custom => "custom",
        }
    }

    /// Parse the wire name of a stop type.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "location" => Some(StopCategory::Location),
            "hotel" => Some(StopCategory::Hotel),
            "transport" => Some(StopCategory::Transport),
            "custom" => Some(StopCategory::Custom),
            _ => None,
        }
    }
}

impl fmt::Display for StopCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// References a stop carries besides the one its kind names.
///
/// The backend lets one stop hold several at once. They are kept so a
/// resubmit writes them back unchanged, and so coordinate resolution can
/// fall back to them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExtraRefs {
    pub location: Option<PlaceRef>,
    pub hotel: Option<PlaceRef>,
    pub transport: Option<TransportRef>,
    pub custom: Option<CustomPoint>,
}

/// A stop within a day.
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    /// Declared type of the stop and its own reference.
    pub kind: StopKind,
    pub extra: ExtraRefs,
    /// Display order within the day.
    pub order: u32,
    pub time: Option<NaiveTime>,
    pub notes: Option<String>,
    pub estimated_cost: Option<Decimal>,
    /// Flat `{lat, lng}` point written by older clients.
    pub legacy_point: Option<LatLng>,
}

impl Stop {
    /// Create a stop with no schedule, notes or cost.
    pub fn new(kind: StopKind) -> Self {
        Self {
            kind,
            extra: ExtraRefs::default(),
            order: 0,
            time: None,
            notes: None,
            estimated_cost: None,
            legacy_point: None,
        }
    }

    /// A custom stop at the given position.
    pub fn custom(name: impl Into<String>, position: LatLng) -> Self {
        Self::new(StopKind::Custom(CustomPoint {
            name: name.into(),
            description: None,
            position: Some(position),
        }))
    }

    pub fn with_time(mut self, time: NaiveTime) -> Self {
        self.time = Some(time);
        self
    }

    pub fn with_legacy_point(mut self, point: LatLng) -> Self {
        self.legacy_point = Some(point);
        self
    }

    pub fn with_extra(mut self, extra: ExtraRefs) -> Self {
        self.extra = extra;
        self
    }

    pub fn category(&self) -> StopCategory {
        self.kind.category()
    }

    /// The location reference, whether it is the stop's own or an extra one.
    pub fn location(&self) -> Option<&PlaceRef> {
        match &self.kind {
            StopKind::Location(r) => Some(r),
            _ => self.extra.location.as_ref(),
        }
    }

    pub fn hotel(&self) -> Option<&PlaceRef> {
        match &self.kind {
            StopKind::Hotel(r) => Some(r),
            _ => self.extra.hotel.as_ref(),
        }
    }

    pub fn transport(&self) -> Option<&TransportRef> {
        match &self.kind {
            StopKind::Transport(t) => Some(t),
            _ => self.extra.transport.as_ref(),
        }
    }

    pub fn custom_point(&self) -> Option<&CustomPoint> {
        match &self.kind {
            StopKind::Custom(c) => Some(c),
            _ => self.extra.custom.as_ref(),
        }
    }

    /// The best display name available without resolving coordinates.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            StopKind::Location(r) | StopKind::Hotel(r) => r.place.as_ref().map(|p| p.name.as_str()),
            StopKind::Transport(t) => t.name.as_deref(),
            StopKind::Custom(c) => Some(c.name.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_follows_kind() {
        let stop = Stop::custom("Picnic", LatLng::new(1.0, 2.0).unwrap());
        assert_eq!(stop.category(), StopCategory::Custom);

        let hotel = Stop::new(StopKind::Hotel(PlaceRef::new("h1", None)));
        assert_eq!(hotel.category(), StopCategory::Hotel);
    }

    #[test]
    fn category_parse_roundtrip() {
        for c in [
            StopCategory::Location,
            StopCategory::Hotel,
            StopCategory::Transport,
            StopCategory::Custom,
        ] {
            assert_eq!(StopCategory::parse(c.as_str()), Some(c));
        }
        assert_eq!(StopCategory::parse("museum"), None);
    }

    #[test]
    fn accessors_see_own_and_extra_references() {
        let stop = Stop::new(StopKind::Hotel(PlaceRef::new("h1", None))).with_extra(ExtraRefs {
            location: Some(PlaceRef::new("l1", None)),
            custom: Some(CustomPoint {
                name: "Gate".into(),
                description: None,
                position: None,
            }),
            ..ExtraRefs::default()
        });

        assert_eq!(stop.hotel().map(|r| r.id.as_str()), Some("h1"));
        assert_eq!(stop.location().map(|r| r.id.as_str()), Some("l1"));
        assert_eq!(stop.custom_point().map(|c| c.name.as_str()), Some("Gate"));
        assert!(stop.transport().is_none());
        assert_eq!(stop.category(), StopCategory::Hotel);
    }

    #[test]
    fn name_of_unpopulated_reference_is_none() {
        let stop = Stop::new(StopKind::Location(PlaceRef::new("loc1", None)));
        assert_eq!(stop.name(), None);
    }
}
