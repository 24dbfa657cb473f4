//! Wire DTOs for the itinerary backend.
//!
//! These types map directly to the JSON the backend sends and accepts.
//! They use `Option` liberally because the backend omits fields, and
//! references may arrive either populated or as bare ids.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Response body, optionally wrapped in `{success, data}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Wrapped {
        success: bool,
        #[serde(default = "Option::default")]
        data: Option<T>,
        #[serde(default)]
        message: Option<String>,
    },
    Bare(T),
}

/// Minimal acknowledgement body for writes.
#[derive(Debug, Deserialize)]
pub struct Ack {
    pub success: Option<bool>,
    pub message: Option<String>,
}

/// A reference that may be populated or just an id.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Ref<T> {
    Populated(T),
    Id(String),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CoordinatesDto {
    #[serde(alias = "latitude")]
    pub lat: Option<f64>,
    #[serde(alias = "longitude", alias = "lon")]
    pub lng: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserDto {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: Option<String>,
}

/// A curated location or hotel as populated on a stop.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceDto {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub coordinates: Option<CoordinatesDto>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransportRefDto {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopDto {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub location: Option<Ref<PlaceDto>>,
    pub hotel: Option<Ref<PlaceDto>>,
    pub transport: Option<Ref<TransportRefDto>>,
    pub custom_name: Option<String>,
    pub custom_description: Option<String>,
    pub custom_coordinates: Option<CoordinatesDto>,
    /// Legacy flat coordinates.
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub order: Option<u32>,
    pub time: Option<String>,
    pub notes: Option<String>,
    pub estimated_cost: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DayDto {
    pub date: Option<String>,
    #[serde(default)]
    pub stops: Vec<StopDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollaboratorDto {
    pub user: Ref<UserDto>,
    pub permission: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseDto {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: Option<String>,
    pub category: Option<String>,
    pub amount: Option<Decimal>,
    pub description: Option<String>,
    pub day_number: Option<u32>,
    #[serde(alias = "createdAt")]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BudgetDto {
    pub total: Option<Decimal>,
    pub currency: Option<String>,
    #[serde(default)]
    pub expenses: Vec<ExpenseDto>,
}

/// Full itinerary as returned by `GET /itineraries/:id`.
///
/// List endpoints return the same shape with days often omitted.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryDto {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(alias = "user")]
    pub owner: Option<Ref<UserDto>>,
    #[serde(default)]
    pub is_public: bool,
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default)]
    pub days: Vec<DayDto>,
    #[serde(default)]
    pub collaborators: Vec<CollaboratorDto>,
    pub budget: Option<BudgetDto>,
    pub completeness: Option<f64>,
}

// ============================================================================
// Transport
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NamedDto {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PricingDto {
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduleDto {
    #[serde(default)]
    pub departures: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDto {
    pub online_url: Option<String>,
    #[serde(default)]
    pub phone_numbers: Vec<String>,
}

/// A transport option from `GET /transportation/find-routes`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportOptionDto {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub operator: Option<NamedDto>,
    pub pricing: Option<PricingDto>,
    pub schedule: Option<ScheduleDto>,
    pub booking: Option<BookingDto>,
    pub match_type: Option<String>,
    pub distance_from_origin: Option<f64>,
    pub distance_from_destination: Option<f64>,
    pub nearest_origin_stop: Option<NamedDto>,
    pub nearest_destination_stop: Option<NamedDto>,
}

/// Route search payload. Coordinate queries return classified buckets;
/// name queries return a flat list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RoutesPayload {
    Flat(Vec<TransportOptionDto>),
    #[serde(rename_all = "camelCase")]
    Classified {
        #[serde(default)]
        direct_routes: Vec<TransportOptionDto>,
        #[serde(default)]
        nearby_routes: Vec<TransportOptionDto>,
    },
}

impl RoutesPayload {
    pub fn len(&self) -> usize {
        match self {
            RoutesPayload::Flat(all) => all.len(),
            RoutesPayload::Classified {
                direct_routes,
                nearby_routes,
            } => direct_routes.len() + nearby_routes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// Outgoing payloads
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopPayload {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hotel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_coordinates: Option<CoordinatesDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    pub order: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub estimated_cost: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayPayload {
    pub date: Option<String>,
    pub stops: Vec<StopPayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpensePayload {
    pub id: String,
    pub category: &'static str,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub description: String,
    pub day_number: u32,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetPayload {
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub currency: String,
    pub expenses: Vec<ExpensePayload>,
}

/// Body of `PUT /itineraries/:id`.
///
/// Collaborators are managed through their own endpoint and are not sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryPayload {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_public: bool,
    pub status: &'static str,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub days: Vec<DayPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<BudgetPayload>,
}

/// Body of `POST /itineraries`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItinerary {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_public: bool,
    pub start_date: String,
    pub end_date: String,
    pub days: Vec<DayPayload>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_wrapped_and_bare() {
        let wrapped: Envelope<Vec<u32>> =
            serde_json::from_str(r#"{"success":true,"data":[1,2]}"#).unwrap();
        assert!(matches!(wrapped, Envelope::Wrapped { success: true, data: Some(ref d), .. } if d == &vec![1, 2]));

        let bare: Envelope<Vec<u32>> = serde_json::from_str("[3]").unwrap();
        assert!(matches!(bare, Envelope::Bare(ref d) if d == &vec![3]));

        let failed: Envelope<Vec<u32>> =
            serde_json::from_str(r#"{"success":false,"message":"nope"}"#).unwrap();
        assert!(matches!(failed, Envelope::Wrapped { success: false, data: None, .. }));
    }

    #[test]
    fn routes_payload_shapes() {
        let flat: RoutesPayload = serde_json::from_str(r#"[{"_id":"a","name":"Bus 1"}]"#).unwrap();
        assert!(matches!(flat, RoutesPayload::Flat(ref v) if v.len() == 1));

        let classified: RoutesPayload = serde_json::from_str(
            r#"{"directRoutes":[{"_id":"a"}],"nearbyRoutes":[{"_id":"b"},{"_id":"c"}]}"#,
        )
        .unwrap();
        assert_eq!(classified.len(), 3);

        let empty: RoutesPayload = serde_json::from_str("{}").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn reference_populated_or_id() {
        let r: Ref<PlaceDto> = serde_json::from_str(r#""abc""#).unwrap();
        assert!(matches!(r, Ref::Id(ref id) if id == "abc"));

        let r: Ref<PlaceDto> =
            serde_json::from_str(r#"{"_id":"abc","name":"Louvre","coordinates":{"lat":1,"lng":2}}"#)
                .unwrap();
        match r {
            Ref::Populated(p) => {
                assert_eq!(p.name.as_deref(), Some("Louvre"));
                assert_eq!(p.coordinates.unwrap().lat, Some(1.0));
            }
            Ref::Id(_) => panic!("expected populated reference"),
        }
    }

    #[test]
    fn transport_option_fields() {
        let dto: TransportOptionDto = serde_json::from_str(
            r#"{
                "_id": "t1",
                "name": "Coastal Express",
                "type": "bus",
                "operator": {"name": "Blue Line"},
                "pricing": {"amount": 12.5, "currency": "EUR"},
                "schedule": {"departures": ["08:00", "12:30"]},
                "booking": {"onlineUrl": "https://example.com", "phoneNumbers": ["123"]},
                "matchType": "nearby-stops",
                "distanceFromOrigin": 320,
                "nearestOriginStop": {"name": "Main Sq"}
            }"#,
        )
        .unwrap();

        assert_eq!(dto.kind.as_deref(), Some("bus"));
        assert_eq!(dto.pricing.unwrap().amount, Some(Decimal::new(125, 1)));
        assert_eq!(dto.schedule.unwrap().departures.len(), 2);
        assert_eq!(dto.distance_from_origin, Some(320.0));
    }
}
