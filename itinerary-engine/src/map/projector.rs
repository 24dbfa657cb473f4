//! Projection of stops onto map markers and a route line.

use serde::Serialize;
use tracing::debug;

use crate::domain::{Bounds, Day, Stop};
use crate::resolve::{ResolvedStop, resolve_stop};

use super::config::MapConfig;
use super::marker::{FitBounds, Marker, MarkerIcon, MarkerRef, Polyline, Popup};

/// Which input a projection was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionMode {
    Days,
    Flat,
}

/// Everything the substrate needs to draw a non-empty map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapView {
    pub mode: ProjectionMode,
    pub markers: Vec<Marker>,
    pub route: Polyline,
    pub fit: FitBounds,
}

impl MapView {
    /// The stop behind a clicked marker.
    pub fn select(&self, marker_index: usize) -> Option<MarkerRef> {
        self.markers.get(marker_index).map(|m| m.target)
    }
}

/// Result of projecting stops.
///
/// `Empty` means no stop resolved; the consumer shows a placeholder.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Projection {
    Empty,
    Map(MapView),
}

impl Projection {
    pub fn is_empty(&self) -> bool {
        matches!(self, Projection::Empty)
    }

    pub fn view(&self) -> Option<&MapView> {
        match self {
            Projection::Empty => None,
            Projection::Map(view) => Some(view),
        }
    }
}

/// Builds map projections from itinerary stops.
#[derive(Debug, Clone, Default)]
pub struct MapProjector {
    config: MapConfig,
}

impl MapProjector {
    pub fn new(config: MapConfig) -> Self {
        Self { config }
    }

    /// Project stops onto the map.
    ///
    /// Day-grouped stops take precedence whenever at least one day has a
    /// stop; otherwise the flat list is used. `active_day` is a 0-based day
    /// index whose markers are emphasized.
    pub fn project(&self, days: &[Day], flat: &[Stop], active_day: Option<usize>) -> Projection {
        let markers = if days.iter().any(|d| !d.stops.is_empty()) {
            self.day_markers(days, active_day)
        } else {
            self.flat_markers(flat)
        };

        let Some(first) = markers.first() else {
            debug!("no resolvable stops to project");
            return Projection::Empty;
        };

        let mode = if first.target.day_index.is_some() {
            ProjectionMode::Days
        } else {
            ProjectionMode::Flat
        };

        let positions: Vec<_> = markers.iter().map(|m| m.position).collect();
        let Some(bounds) = Bounds::enclosing(&positions) else {
            return Projection::Empty;
        };

        debug!(markers = markers.len(), ?mode, "projected stops");

        Projection::Map(MapView {
            mode,
            markers,
            route: Polyline {
                positions: positions.clone(),
            },
            fit: FitBounds {
                positions,
                padding_px: self.config.fit_padding_px,
                bounds,
            },
        })
    }

    fn day_markers(&self, days: &[Day], active_day: Option<usize>) -> Vec<Marker> {
        let resolved: Vec<(usize, usize, &Stop, ResolvedStop)> = days
            .iter()
            .enumerate()
            .flat_map(|(day_idx, day)| {
                day.stops.iter().enumerate().filter_map(move |(stop_idx, stop)| {
                    resolve_stop(stop).map(|r| (day_idx, stop_idx, stop, r))
                })
            })
            .collect();

        let last = resolved.len().saturating_sub(1);

        resolved
            .into_iter()
            .enumerate()
            .map(|(k, (day_idx, stop_idx, stop, r))| {
                let ordinal = day_idx as u32 + 1;
                let icon = if k == 0 {
                    MarkerIcon::Start
                } else if k == last {
                    MarkerIcon::End
                } else {
                    MarkerIcon::Day {
                        ordinal,
                        active: active_day == Some(day_idx),
                    }
                };

                Marker {
                    position: r.position,
                    icon,
                    popup: popup(stop, r, Some(ordinal)),
                    target: MarkerRef {
                        day_index: Some(day_idx),
                        stop_index: stop_idx,
                    },
                }
            })
            .collect()
    }

    fn flat_markers(&self, stops: &[Stop]) -> Vec<Marker> {
        stops
            .iter()
            .enumerate()
            .filter_map(|(stop_idx, stop)| {
                let r = resolve_stop(stop)?;
                Some(Marker {
                    position: r.position,
                    icon: MarkerIcon::Category {
                        category: r.category,
                    },
                    popup: popup(stop, r, None),
                    target: MarkerRef {
                        day_index: None,
                        stop_index: stop_idx,
                    },
                })
            })
            .collect()
    }
}

fn popup(stop: &Stop, r: ResolvedStop, day: Option<u32>) -> Popup {
    Popup {
        title: r.name,
        description: r.description,
        category: r.category,
        time: stop.time.map(|t| t.format("%H:%M").to_string()),
        day,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LatLng, Place, PlaceRef, StopCategory, StopKind};
    use chrono::NaiveTime;

    fn ll(lat: f64, lng: f64) -> LatLng {
        LatLng::new(lat, lng).unwrap()
    }

    fn hotel(lat: f64, lng: f64) -> Stop {
        Stop::new(StopKind::Hotel(PlaceRef::new(
            "h1",
            Some(Place {
                name: "Hotel".into(),
                description: None,
                position: Some(ll(lat, lng)),
            }),
        )))
    }

    fn unresolvable() -> Stop {
        Stop::new(StopKind::Location(PlaceRef::new("missing", None)))
    }

    fn projector() -> MapProjector {
        MapProjector::default()
    }

    fn view(p: Projection) -> MapView {
        match p {
            Projection::Map(v) => v,
            Projection::Empty => panic!("expected a map view"),
        }
    }

    #[test]
    fn hotel_then_custom_gives_two_vertex_route() {
        let day = Day::default().with_stops(vec![hotel(40.0, -74.0), Stop::custom("Pier", ll(40.1, -74.1))]);

        let v = view(projector().project(&[day], &[], None));

        assert_eq!(v.mode, ProjectionMode::Days);
        assert_eq!(v.route.positions, vec![ll(40.0, -74.0), ll(40.1, -74.1)]);
        assert_eq!(v.markers[0].icon, MarkerIcon::Start);
        assert_eq!(v.markers[1].icon, MarkerIcon::End);
    }

    #[test]
    fn interior_markers_carry_day_ordinal_and_active_flag() {
        let days = vec![
            Day::default().with_stops(vec![Stop::custom("A", ll(1.0, 1.0)), Stop::custom("B", ll(1.1, 1.1))]),
            Day::default().with_stops(vec![Stop::custom("C", ll(2.0, 2.0)), Stop::custom("D", ll(2.1, 2.1))]),
        ];

        let v = view(projector().project(&days, &[], Some(1)));
        let icons: Vec<_> = v.markers.iter().map(|m| m.icon).collect();

        assert_eq!(
            icons,
            vec![
                MarkerIcon::Start,
                MarkerIcon::Day {
                    ordinal: 1,
                    active: false
                },
                MarkerIcon::Day {
                    ordinal: 2,
                    active: true
                },
                MarkerIcon::End,
            ]
        );
    }

    #[test]
    fn unresolvable_stops_do_not_break_route() {
        let days = vec![
            Day::default().with_stops(vec![Stop::custom("A", ll(1.0, 1.0)), unresolvable()]),
            Day::default(),
            Day::default().with_stops(vec![unresolvable(), Stop::custom("B", ll(2.0, 2.0))]),
        ];

        let v = view(projector().project(&days, &[], None));

        assert_eq!(v.route.positions, vec![ll(1.0, 1.0), ll(2.0, 2.0)]);
        assert_eq!(
            v.select(1),
            Some(MarkerRef {
                day_index: Some(2),
                stop_index: 1
            })
        );
    }

    #[test]
    fn single_marker_is_start() {
        let day = Day::default().with_stops(vec![Stop::custom("Only", ll(1.0, 1.0))]);
        let v = view(projector().project(&[day], &[], None));
        assert_eq!(v.markers.len(), 1);
        assert_eq!(v.markers[0].icon, MarkerIcon::Start);
    }

    #[test]
    fn flat_mode_tags_by_category() {
        let flat = vec![hotel(1.0, 1.0), unresolvable(), Stop::custom("X", ll(2.0, 2.0))];

        let v = view(projector().project(&[Day::default()], &flat, Some(0)));

        assert_eq!(v.mode, ProjectionMode::Flat);
        assert_eq!(
            v.markers[0].icon,
            MarkerIcon::Category {
                category: StopCategory::Hotel
            }
        );
        assert_eq!(
            v.markers[1].icon,
            MarkerIcon::Category {
                category: StopCategory::Custom
            }
        );
        assert_eq!(
            v.select(1),
            Some(MarkerRef {
                day_index: None,
                stop_index: 2
            })
        );
    }

    #[test]
    fn days_take_precedence_over_flat() {
        let days = vec![Day::default().with_stops(vec![Stop::custom("Day", ll(5.0, 5.0))])];
        let flat = vec![Stop::custom("Flat", ll(6.0, 6.0))];

        let v = view(projector().project(&days, &flat, None));
        assert_eq!(v.mode, ProjectionMode::Days);
        assert_eq!(v.markers[0].popup.title, "Day");
    }

    #[test]
    fn nothing_resolvable_is_empty() {
        let days = vec![Day::default().with_stops(vec![unresolvable()])];
        assert!(projector().project(&days, &[], None).is_empty());
        assert!(projector().project(&[], &[], None).is_empty());
    }

    #[test]
    fn fit_bounds_cover_markers_with_padding() {
        let day = Day::default().with_stops(vec![
            Stop::custom("A", ll(1.0, 5.0)),
            Stop::custom("B", ll(3.0, 2.0)),
        ]);
        let projector = MapProjector::new(MapConfig::default().with_fit_padding(20));

        let v = view(projector.project(&[day], &[], None));
        assert_eq!(v.fit.padding_px, 20);
        assert_eq!(v.fit.positions.len(), 2);
        assert_eq!(v.fit.bounds.south_west, ll(1.0, 2.0));
        assert_eq!(v.fit.bounds.north_east, ll(3.0, 5.0));
    }

    #[test]
    fn popup_carries_time_and_day() {
        let stop = Stop::custom("Breakfast", ll(1.0, 1.0))
            .with_time(NaiveTime::from_hms_opt(8, 5, 0).unwrap());
        let days = vec![Day::default(), Day::default().with_stops(vec![stop])];

        let v = view(projector().project(&days, &[], None));
        assert_eq!(v.markers[0].popup.time.as_deref(), Some("08:05"));
        assert_eq!(v.markers[0].popup.day, Some(2));
    }
}
