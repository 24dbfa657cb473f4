//! Transport option types.

use rust_decimal::Decimal;
use serde::Serialize;

/// Ticket price of a transport option.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pricing {
    pub amount: Decimal,
    pub currency: String,
}

/// How a traveler books a transport option.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct BookingInfo {
    pub online_url: Option<String>,
    pub phone_numbers: Vec<String>,
}

impl BookingInfo {
    /// The channel to send the traveler to. Online booking is preferred.
    pub fn channel(&self) -> BookingChannel {
        if let Some(url) = self.online_url.as_ref().filter(|u| !u.is_empty()) {
            return BookingChannel::Online(url.clone());
        }
        if !self.phone_numbers.is_empty() {
            return BookingChannel::Phone(self.phone_numbers.clone());
        }
        BookingChannel::Unavailable
    }
}

/// External booking destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "target", rename_all = "lowercase")]
pub enum BookingChannel {
    Online(String),
    Phone(Vec<String>),
    Unavailable,
}

/// Walking details for a proximity match.
///
/// Distances are in metres, from the true endpoint to the nearest stop the
/// option serves. The backend may omit any of them.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct NearbyMatch {
    pub walk_from_origin_m: Option<f64>,
    pub origin_stop: Option<String>,
    pub walk_to_destination_m: Option<f64>,
    pub destination_stop: Option<String>,
}

impl NearbyMatch {
    /// Combined walking distance, counting missing legs as zero.
    pub fn total_walk_m(&self) -> f64 {
        self.walk_from_origin_m.unwrap_or(0.0) + self.walk_to_destination_m.unwrap_or(0.0)
    }
}

/// Whether an option serves the requested corridor exactly.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "matchType", rename_all = "kebab-case")]
pub enum MatchKind {
    Direct,
    NearbyStops(NearbyMatch),
}

impl MatchKind {
    pub fn is_direct(&self) -> bool {
        matches!(self, MatchKind::Direct)
    }
}

/// A transport service that can carry the traveler between two points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransportOption {
    pub id: String,
    pub name: String,
    pub operator: Option<String>,
    /// Mode of transport as reported by the backend (bus, train, ferry...).
    pub kind: Option<String>,
    pub pricing: Option<Pricing>,
    /// Departure times in service order, as the backend formats them.
    pub departures: Vec<String>,
    pub booking: BookingInfo,
    pub match_kind: MatchKind,
}
