//! Geographic coordinate types.

use std::fmt;

use serde::{Serialize, Serializer};

/// Mean Earth radius in metres, used for great-circle distances.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A finite latitude/longitude pair in decimal degrees.
///
/// Both components are guaranteed finite by construction, so a `LatLng`
/// can always be placed on a map.
///
/// # Examples
///
/// ```
/// use itinerary_engine::domain::LatLng;
///
/// let nyc = LatLng::new(40.7128, -74.0060).unwrap();
/// assert_eq!(nyc.lat(), 40.7128);
///
/// assert!(LatLng::new(f64::NAN, 0.0).is_none());
/// assert!(LatLng::new(0.0, f64::INFINITY).is_none());
/// ```
#[derive(Clone, Copy, PartialEq)]
pub struct LatLng {
    lat: f64,
    lng: f64,
}

impl LatLng {
    /// Create a coordinate pair, returning `None` unless both are finite.
    pub fn new(lat: f64, lng: f64) -> Option<Self> {
        if lat.is_finite() && lng.is_finite() {
            Some(Self { lat, lng })
        } else {
            None
        }
    }

    /// Create a coordinate pair from optional components.
    ///
    /// This is the shape coordinates arrive in from the API, where either
    /// half may be missing.
    pub fn from_parts(lat: Option<f64>, lng: Option<f64>) -> Option<Self> {
        Self::new(lat?, lng?)
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }

    /// The pair in `[lat, lng]` order, as map substrates expect it.
    pub fn as_array(&self) -> [f64; 2] {
        [self.lat, self.lng]
    }

    /// Great-circle distance to another point in metres (haversine).
    pub fn distance_m(&self, other: &LatLng) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let delta_lat = (other.lat - self.lat).to_radians();
        let delta_lng = (other.lng - self.lng).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_M * c
    }
}

impl fmt::Debug for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LatLng({}, {})", self.lat, self.lng)
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5},{:.5}", self.lat, self.lng)
    }
}

impl Serialize for LatLng {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_array().serialize(serializer)
    }
}

/// Axis-aligned bounding box over a set of coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl Bounds {
    /// Smallest box containing every point, or `None` for an empty input.
    pub fn enclosing<'a>(points: impl IntoIterator<Item = &'a LatLng>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let (mut south, mut west, mut north, mut east) =
            (first.lat, first.lng, first.lat, first.lng);

        for p in iter {
            south = south.min(p.lat);
            north = north.max(p.lat);
            west = west.min(p.lng);
            east = east.max(p.lng);
        }

        Some(Self {
            south_west: LatLng {
                lat: south,
                lng: west,
            },
            north_east: LatLng {
                lat: north,
                lng: east,
            },
        })
    }

    /// Returns true if the point lies inside or on the edge of the box.
    pub fn contains(&self, p: &LatLng) -> bool {
        p.lat >= self.south_west.lat
            && p.lat <= self.north_east.lat
            && p.lng >= self.south_west.lng
            && p.lng <= self.north_east.lng
    }
}
