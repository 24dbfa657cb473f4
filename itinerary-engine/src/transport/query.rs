//! Route search requests.

use crate::domain::{Day, LatLng};
use crate::resolve::resolve_day;

use crate::api::ApiError;

/// Error from a route search.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Neither both positions nor both names are known
    #[error("invalid route query: {0}")]
    InvalidQuery(&'static str),

    /// The route service failed
    #[error("route search failed: {0}")]
    Api(#[from] ApiError),
}

/// One end of a route search.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Endpoint {
    pub name: Option<String>,
    pub position: Option<LatLng>,
}

impl Endpoint {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            position: None,
        }
    }

    pub fn at(position: LatLng) -> Self {
        Self {
            name: None,
            position: Some(position),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    fn usable_name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }
}

/// A validated route search.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteQuery {
    /// GPS search; the service classifies matches as direct or nearby.
    Coordinates { from: LatLng, to: LatLng },
    /// Name search; the service returns an unclassified list.
    Names { from: String, to: String },
}

impl RouteQuery {
    /// Build a query from two endpoints.
    ///
    /// GPS is preferred when both ends have a position. Otherwise both ends
    /// need a name.
    pub fn from_endpoints(origin: &Endpoint, destination: &Endpoint) -> Result<Self, SearchError> {
        if let (Some(from), Some(to)) = (origin.position, destination.position) {
            return Ok(RouteQuery::Coordinates { from, to });
        }

        match (origin.usable_name(), destination.usable_name()) {
            (Some(from), Some(to)) => Ok(RouteQuery::Names {
                from: from.to_string(),
                to: to.to_string(),
            }),
            (None, _) => Err(SearchError::InvalidQuery("origin has neither position nor name")),
            (_, None) => Err(SearchError::InvalidQuery(
                "destination has neither position nor name",
            )),
        }
    }

    /// Query string parameters for `GET /transportation/find-routes`.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        match self {
            RouteQuery::Coordinates { from, to } => vec![
                ("fromLat", from.lat().to_string()),
                ("fromLng", from.lng().to_string()),
                ("toLat", to.lat().to_string()),
                ("toLng", to.lng().to_string()),
            ],
            RouteQuery::Names { from, to } => {
                vec![("fromName", from.clone()), ("toName", to.clone())]
            }
        }
    }

    pub fn is_coordinate(&self) -> bool {
        matches!(self, RouteQuery::Coordinates { .. })
    }
}

/// The travel segment of a day: its first and last resolvable stops.
///
/// Returns `None` unless at least two stops resolve.
pub fn day_endpoints(day: &Day) -> Option<(Endpoint, Endpoint)> {
    let resolved = resolve_day(day);
    if resolved.len() < 2 {
        return None;
    }

    let (_, first) = resolved.first()?;
    let (_, last) = resolved.last()?;
    Some((
        Endpoint::at(first.position).with_name(first.name.clone()),
        Endpoint::at(last.position).with_name(last.name.clone()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Place, PlaceRef, Stop, StopKind, TransportRef};

    fn ll(lat: f64, lng: f64) -> LatLng {
        LatLng::new(lat, lng).unwrap()
    }

    #[test]
    fn gps_preferred_when_both_ends_have_it() {
        let origin = Endpoint::at(ll(1.0, 2.0)).with_name("A");
        let destination = Endpoint::at(ll(3.0, 4.0)).with_name("B");

        let q = RouteQuery::from_endpoints(&origin, &destination).unwrap();
        assert!(q.is_coordinate());
        assert_eq!(
            q.params(),
            vec![
                ("fromLat", "1".to_string()),
                ("fromLng", "2".to_string()),
                ("toLat", "3".to_string()),
                ("toLng", "4".to_string()),
            ]
        );
    }

    #[test]
    fn falls_back_to_names() {
        let origin = Endpoint::at(ll(1.0, 2.0)).with_name("Harbour");
        let destination = Endpoint::named(" Old Town ");

        let q = RouteQuery::from_endpoints(&origin, &destination).unwrap();
        assert_eq!(
            q,
            RouteQuery::Names {
                from: "Harbour".into(),
                to: "Old Town".into()
            }
        );
    }

    #[test]
    fn rejects_unusable_endpoints() {
        let err = RouteQuery::from_endpoints(&Endpoint::default(), &Endpoint::named("B"));
        assert!(matches!(err, Err(SearchError::InvalidQuery(_))));

        let err = RouteQuery::from_endpoints(&Endpoint::at(ll(1.0, 1.0)), &Endpoint::named("  "));
        assert!(matches!(err, Err(SearchError::InvalidQuery(_))));
    }

    #[test]
    fn hotel_and_custom_stops_become_endpoints() {
        let hotel = Stop::new(StopKind::Hotel(PlaceRef::new(
            "h1",
            Some(Place {
                name: "Grand".into(),
                description: None,
                position: Some(ll(40.0, -74.0)),
            }),
        )));
        let transport = Stop::new(StopKind::Transport(TransportRef {
            id: "t1".into(),
            name: None,
        }));
        let custom = Stop::custom("Pier", ll(40.1, -74.1));
        let day = Day::default().with_stops(vec![hotel, transport, custom]);

        let (origin, destination) = day_endpoints(&day).unwrap();

        assert_eq!(origin.position, Some(ll(40.0, -74.0)));
        assert_eq!(origin.name.as_deref(), Some("Grand"));
        assert_eq!(destination.position, Some(ll(40.1, -74.1)));
        assert_eq!(destination.name.as_deref(), Some("Pier"));
    }

    #[test]
    fn single_resolvable_stop_has_no_segment() {
        let day = Day::default().with_stops(vec![Stop::custom("Pier", ll(40.1, -74.1))]);
        assert!(day_endpoints(&day).is_none());
    }
}
