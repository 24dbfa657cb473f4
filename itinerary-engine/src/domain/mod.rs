//! Domain types for the itinerary engine.
//!
//! This module contains the core model: itineraries, days, stops, budgets
//! and transport options. Value types enforce their invariants at
//! construction, so code that receives them can trust their validity.

mod collaborator;
mod error;
mod expense;
mod geo;
mod itinerary;
mod stop;
mod transport;

pub use collaborator::{Collaborator, Permission, UserId};
pub use error::DomainError;
pub use expense::{Budget, DEFAULT_CURRENCY, Expense, ExpenseCategory, MAX_AMOUNT};
pub(crate) use expense::saturating_sum;
pub use geo::{Bounds, LatLng};
pub use itinerary::{Day, Itinerary, ItineraryStatus, ItinerarySummary};
pub use stop::{CustomPoint, ExtraRefs, Place, PlaceRef, Stop, StopCategory, StopKind, TransportRef};
pub use transport::{BookingChannel, BookingInfo, MatchKind, NearbyMatch, Pricing, TransportOption};
