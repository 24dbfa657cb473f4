//! Transport matching for a day's travel segment.
//!
//! Key characteristics of the route service:
//! - Coordinate searches return `directRoutes` and `nearbyRoutes` buckets;
//!   name searches return one unclassified list
//! - Nearby matches carry walking distances to the nearest served stops
//! - Booking clicks are reported back, best effort

mod booking;
mod matcher;
mod query;
mod search;

pub use booking::{BookingRecorder, book};
pub use matcher::{RouteFinder, TransportMatcher, rank_options};
pub use query::{Endpoint, RouteQuery, SearchError, day_endpoints};
pub use search::{RouteSearch, SearchState, Ticket};
