//! Conversion between wire DTOs and domain types.
//!
//! Incoming data is normalized here: dates are reduced to calendar days and
//! malformed expenses are skipped rather than failing the whole itinerary.
//! Stops keep every reference they arrive with.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::{
    BookingInfo, Budget, Collaborator, CustomPoint, DEFAULT_CURRENCY, Day, Expense,
    ExpenseCategory, ExtraRefs, Itinerary, ItineraryStatus, ItinerarySummary, LatLng, MatchKind, NearbyMatch,
    Permission, Place, PlaceRef, Pricing, Stop, StopKind, TransportOption, TransportRef, UserId,
};

use super::types::{
    BudgetDto, BudgetPayload, CollaboratorDto, CoordinatesDto, DayDto, DayPayload, ExpenseDto,
    ExpensePayload, ItineraryDto, ItineraryPayload, PlaceDto, Ref, RoutesPayload, StopDto,
    StopPayload, TransportOptionDto, TransportRefDto, UserDto,
};

/// Error during DTO to domain conversion.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    /// Missing required field
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// End date precedes start date
    #[error("end date {end} is before start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
}

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";
const CUSTOM_STOP_NAME: &str = "Custom stop";

// ============================================================================
// Incoming
// ============================================================================

/// Convert a full itinerary.
pub fn convert_itinerary(dto: ItineraryDto) -> Result<Itinerary, ConversionError> {
    let (owner, owner_name) = match dto.owner {
        Some(Ref::Populated(UserDto { id, name })) => (UserId::new(id), name),
        Some(Ref::Id(id)) => (UserId::new(id), None),
        None => return Err(ConversionError::MissingField("owner")),
    };

    let start_date = dto.start_date.as_deref().and_then(parse_date);
    let end_date = dto.end_date.as_deref().and_then(parse_date);
    if let (Some(start), Some(end)) = (start_date, end_date) {
        if end < start {
            return Err(ConversionError::EndBeforeStart { start, end });
        }
    }

    let status = dto
        .status
        .as_deref()
        .and_then(|s| {
            let parsed = ItineraryStatus::parse(s);
            if parsed.is_none() {
                debug!(status = s, "unknown itinerary status");
            }
            parsed
        })
        .unwrap_or_default();

    let mut itinerary = Itinerary::new(dto.id, owner, dto.title.unwrap_or_default());
    itinerary.description = dto.description;
    itinerary.owner_name = owner_name;
    itinerary.is_public = dto.is_public;
    itinerary.status = status;
    itinerary.start_date = start_date;
    itinerary.end_date = end_date;
    itinerary.days = dto.days.into_iter().map(convert_day).collect();
    itinerary.collaborators = dto
        .collaborators
        .into_iter()
        .map(convert_collaborator)
        .collect();
    itinerary.budget = dto.budget.map(convert_budget);
    itinerary.completeness = dto
        .completeness
        .filter(|c| c.is_finite())
        .map(|c| c.round().clamp(0.0, 100.0) as u8);

    Ok(itinerary)
}

/// Convert a list entry into a summary.
pub fn convert_summary(dto: ItineraryDto) -> Result<ItinerarySummary, ConversionError> {
    convert_itinerary(dto).map(|it| ItinerarySummary::from(&it))
}

fn convert_day(dto: DayDto) -> Day {
    let mut stops: Vec<Stop> = dto.stops.into_iter().map(convert_stop).collect();
    // Stable, so stops without an order keep their array position.
    stops.sort_by_key(|s| s.order);

    let day = Day {
        date: dto.date.as_deref().and_then(parse_date),
        stops: Vec::new(),
    };
    day.with_stops(stops)
}

/// Convert one stop.
///
/// The declared type picks the stop's kind when the matching reference is
/// present; otherwise the first of location, hotel, transport and custom
/// point that is present. Every other reference is kept as an extra one, so
/// nothing is lost on resubmit and resolution can fall back to it.
pub fn convert_stop(dto: StopDto) -> Stop {
    let mut location = dto.location.map(|r| place_ref(r, "Location"));
    let mut hotel = dto.hotel.map(|r| place_ref(r, "Hotel"));
    let mut transport = dto.transport.map(transport_ref);
    let has_custom = dto.custom_name.is_some()
        || dto.custom_description.is_some()
        || dto.custom_coordinates.is_some();
    let mut custom = has_custom.then(|| CustomPoint {
        name: dto
            .custom_name
            .unwrap_or_else(|| CUSTOM_STOP_NAME.to_string()),
        description: dto.custom_description,
        position: dto.custom_coordinates.as_ref().and_then(coordinates),
    });

    let declared = match dto.kind.as_deref() {
        Some("location") => location.take().map(StopKind::Location),
        Some("hotel") => hotel.take().map(StopKind::Hotel),
        Some("transport") => transport.take().map(StopKind::Transport),
        Some("custom") => Some(StopKind::Custom(custom.take().unwrap_or_else(unnamed_point))),
        _ => None,
    };
    let kind = declared
        .or_else(|| location.take().map(StopKind::Location))
        .or_else(|| hotel.take().map(StopKind::Hotel))
        .or_else(|| transport.take().map(StopKind::Transport))
        .unwrap_or_else(|| StopKind::Custom(custom.take().unwrap_or_else(unnamed_point)));

    Stop {
        kind,
        extra: ExtraRefs {
            location,
            hotel,
            transport,
            custom,
        },
        order: dto.order.unwrap_or(0),
        time: dto.time.as_deref().and_then(parse_time),
        notes: dto.notes.filter(|n| !n.is_empty()),
        estimated_cost: dto.estimated_cost.filter(|c| *c >= Decimal::ZERO),
        legacy_point: LatLng::from_parts(dto.lat, dto.lng),
    }
}

fn unnamed_point() -> CustomPoint {
    CustomPoint {
        name: CUSTOM_STOP_NAME.to_string(),
        description: None,
        position: None,
    }
}

fn place_ref(r: Ref<PlaceDto>, fallback_name: &str) -> PlaceRef {
    match r {
        Ref::Id(id) => PlaceRef::new(id, None),
        Ref::Populated(p) => {
            let place = Place {
                name: p.name.unwrap_or_else(|| fallback_name.to_string()),
                description: p.description,
                position: p.coordinates.as_ref().and_then(coordinates),
            };
            PlaceRef::new(p.id.unwrap_or_default(), Some(place))
        }
    }
}

fn transport_ref(r: Ref<TransportRefDto>) -> TransportRef {
    match r {
        Ref::Id(id) => TransportRef { id, name: None },
        Ref::Populated(t) => TransportRef {
            id: t.id.unwrap_or_default(),
            name: t.name,
        },
    }
}

fn coordinates(c: &CoordinatesDto) -> Option<LatLng> {
    LatLng::from_parts(c.lat, c.lng)
}

fn convert_collaborator(dto: CollaboratorDto) -> Collaborator {
    let (user, name) = match dto.user {
        Ref::Populated(u) => (UserId::new(u.id), u.name),
        Ref::Id(id) => (UserId::new(id), None),
    };

    // Unknown permissions get the weaker one.
    let permission = dto
        .permission
        .as_deref()
        .and_then(Permission::parse)
        .unwrap_or(Permission::View);

    Collaborator {
        user,
        name,
        permission,
    }
}

fn convert_budget(dto: BudgetDto) -> Budget {
    let mut budget = Budget::new(
        dto.total.unwrap_or_default().max(Decimal::ZERO),
        dto.currency
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
    );
    budget.expenses = dto.expenses.into_iter().filter_map(convert_expense).collect();
    budget
}

fn convert_expense(dto: ExpenseDto) -> Option<Expense> {
    let amount = dto.amount?;
    if amount < Decimal::ZERO {
        warn!(id = ?dto.id, %amount, "skipping expense with negative amount");
        return None;
    }

    let category = match dto.category.as_deref() {
        Some(raw) => ExpenseCategory::parse(raw).unwrap_or_else(|| {
            debug!(category = raw, "unknown expense category, using other");
            ExpenseCategory::Other
        }),
        None => ExpenseCategory::Other,
    };

    Some(Expense {
        id: dto.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
        category,
        amount,
        description: dto
            .description
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| category.label().to_string()),
        day_number: dto.day_number.unwrap_or(1).max(1),
        recorded_at: dto
            .date
            .as_deref()
            .and_then(parse_timestamp)
            .unwrap_or_default(),
    })
}

/// Convert a route search payload.
///
/// Classified payloads (coordinate searches) mark their buckets, direct
/// first. Flat payloads (name searches) carry no classification, so every
/// entry is direct. Entries without an id or name are skipped.
pub fn convert_routes(payload: RoutesPayload) -> Vec<TransportOption> {
    match payload {
        RoutesPayload::Flat(all) => all
            .into_iter()
            .filter_map(|dto| convert_option(dto, false))
            .collect(),
        RoutesPayload::Classified {
            direct_routes,
            nearby_routes,
        } => direct_routes
            .into_iter()
            .filter_map(|dto| convert_option(dto, false))
            .chain(
                nearby_routes
                    .into_iter()
                    .filter_map(|dto| convert_option(dto, true)),
            )
            .collect(),
    }
}

fn convert_option(dto: TransportOptionDto, nearby: bool) -> Option<TransportOption> {
    let Some(id) = dto.id.clone().or_else(|| dto.name.clone()) else {
        debug!("skipping transport option without id");
        return None;
    };

    let match_kind = if nearby {
        MatchKind::NearbyStops(NearbyMatch {
            walk_from_origin_m: dto.distance_from_origin.filter(|d| d.is_finite()),
            origin_stop: dto.nearest_origin_stop.and_then(|s| s.name),
            walk_to_destination_m: dto.distance_from_destination.filter(|d| d.is_finite()),
            destination_stop: dto.nearest_destination_stop.and_then(|s| s.name),
        })
    } else {
        MatchKind::Direct
    };

    let pricing = dto.pricing.and_then(|p| {
        Some(Pricing {
            amount: p.amount?,
            currency: p.currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        })
    });

    let booking = dto
        .booking
        .map(|b| BookingInfo {
            online_url: b.online_url.filter(|u| !u.is_empty()),
            phone_numbers: b.phone_numbers,
        })
        .unwrap_or_default();

    Some(TransportOption {
        name: dto.name.unwrap_or_else(|| id.clone()),
        id,
        operator: dto.operator.and_then(|o| o.name),
        kind: dto.kind,
        pricing,
        departures: dto.schedule.map(|s| s.departures).unwrap_or_default(),
        booking,
        match_kind,
    })
}

/// Parse `YYYY-MM-DD`, ignoring any time suffix.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.get(..10)?;
    NaiveDate::parse_from_str(day, DATE_FORMAT).ok()
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .inspect_err(|_| debug!(time = raw, "ignoring unparseable stop time"))
        .ok()
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .ok()
        .or_else(|| Some(parse_date(raw)?.and_hms_opt(0, 0, 0)?.and_utc()))
}

// ============================================================================
// Outgoing
// ============================================================================

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Build the update body for an itinerary.
pub fn itinerary_payload(itinerary: &Itinerary) -> ItineraryPayload {
    ItineraryPayload {
        title: itinerary.title.clone(),
        description: itinerary.description.clone(),
        is_public: itinerary.is_public,
        status: itinerary.status.as_str(),
        start_date: itinerary.start_date.map(format_date),
        end_date: itinerary.end_date.map(format_date),
        days: itinerary.days.iter().map(day_payload).collect(),
        budget: itinerary.budget.as_ref().map(budget_payload),
    }
}

pub fn day_payload(day: &Day) -> DayPayload {
    DayPayload {
        date: day.date.map(format_date),
        stops: day.stops.iter().map(stop_payload).collect(),
    }
}

fn stop_payload(stop: &Stop) -> StopPayload {
    let mut payload = StopPayload {
        kind: stop.category().as_str(),
        location: None,
        hotel: None,
        transport: None,
        custom_name: None,
        custom_description: None,
        custom_coordinates: None,
        lat: stop.legacy_point.map(|p| p.lat()),
        lng: stop.legacy_point.map(|p| p.lng()),
        order: stop.order,
        time: stop.time.map(|t| t.format(TIME_FORMAT).to_string()),
        notes: stop.notes.clone(),
        estimated_cost: stop.estimated_cost,
    };

    payload.location = stop.location().map(|r| r.id.clone());
    payload.hotel = stop.hotel().map(|r| r.id.clone());
    payload.transport = stop.transport().map(|t| t.id.clone());
    if let Some(c) = stop.custom_point() {
        payload.custom_name = Some(c.name.clone());
        payload.custom_description = c.description.clone();
        payload.custom_coordinates = c.position.map(|p| CoordinatesDto {
            lat: Some(p.lat()),
            lng: Some(p.lng()),
        });
    }
    payload
}

fn budget_payload(budget: &Budget) -> BudgetPayload {
    BudgetPayload {
        total: budget.total,
        currency: budget.currency.clone(),
        expenses: budget
            .expenses
            .iter()
            .map(|e| ExpensePayload {
                id: e.id.clone(),
                category: e.category.as_str(),
                amount: e.amount,
                description: e.description.clone(),
                day_number: e.day_number,
                date: e.recorded_at.to_rfc3339(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StopCategory;
    use crate::resolve::{CoordinateSource, resolve_stop};

    fn stop(json: &str) -> Stop {
        convert_stop(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn location_with_coordinates_wins() {
        let s = stop(
            r#"{
                "type": "hotel",
                "location": {"_id": "l1", "name": "Louvre", "coordinates": {"lat": 48.86, "lng": 2.34}},
                "hotel": {"_id": "h1", "name": "Ritz", "coordinates": {"lat": 48.87, "lng": 2.33}},
                "lat": 1, "lng": 1
            }"#,
        );
        assert_eq!(s.category(), StopCategory::Hotel);
        assert_eq!(s.extra.location.as_ref().map(|r| r.id.as_str()), Some("l1"));

        let r = resolve_stop(&s).unwrap();
        assert_eq!(r.source, CoordinateSource::Location);
        assert_eq!(r.name, "Louvre");
    }

    #[test]
    fn declared_kind_and_references_survive_resubmit() {
        let s = stop(
            r#"{
                "type": "hotel",
                "hotel": {"_id": "h1"},
                "customName": "x",
                "customCoordinates": {"lat": 40.0, "lng": -74.0}
            }"#,
        );
        assert_eq!(s.category(), StopCategory::Hotel);
        assert_eq!(resolve_stop(&s).unwrap().source, CoordinateSource::Custom);

        let json = serde_json::to_value(stop_payload(&s)).unwrap();
        assert_eq!(json["type"], "hotel");
        assert_eq!(json["hotel"], "h1");
        assert_eq!(json["customName"], "x");
        assert_eq!(json["customCoordinates"]["lat"], 40.0);

        // Reading the payload back keeps the declared kind and every reference
        let again = convert_stop(serde_json::from_value(json).unwrap());
        assert_eq!(again.category(), StopCategory::Hotel);
        assert_eq!(again.hotel().map(|r| r.id.as_str()), Some("h1"));
        assert_eq!(again.extra.custom, s.extra.custom);
    }

    #[test]
    fn missing_declared_reference_falls_back_to_present_one() {
        let s = stop(r#"{"type": "location", "hotel": "h1"}"#);
        assert_eq!(s.category(), StopCategory::Hotel);
        assert!(s.extra.location.is_none());
    }

    #[test]
    fn unpopulated_reference_falls_back_to_legacy() {
        let s = stop(r#"{"type": "location", "location": "l1", "lat": 40.0, "lng": -74.0}"#);
        assert_eq!(s.category(), StopCategory::Location);

        let r = resolve_stop(&s).unwrap();
        assert_eq!(r.source, CoordinateSource::Legacy);
        assert_eq!(r.name, "Location");
    }

    #[test]
    fn transport_stop_keeps_reference() {
        let s = stop(r#"{"type": "transport", "transport": {"_id": "t1", "name": "Ferry"}}"#);
        assert_eq!(s.category(), StopCategory::Transport);
        assert_eq!(s.name(), Some("Ferry"));
        assert!(resolve_stop(&s).is_none());
    }

    #[test]
    fn empty_stop_is_custom_and_unresolvable() {
        let s = stop("{}");
        assert_eq!(s.category(), StopCategory::Custom);
        assert!(resolve_stop(&s).is_none());
    }

    #[test]
    fn stop_time_and_cost() {
        let s = stop(r#"{"type": "custom", "customName": "Lunch", "time": "12:30", "estimatedCost": -3}"#);
        assert_eq!(s.time, NaiveTime::from_hms_opt(12, 30, 0));
        assert_eq!(s.estimated_cost, None);

        let s = stop(r#"{"time": "noon", "estimatedCost": 20}"#);
        assert_eq!(s.time, None);
        assert_eq!(s.estimated_cost, Some(Decimal::from(20)));
    }

    #[test]
    fn days_are_sorted_and_renumbered() {
        let day = convert_day(
            serde_json::from_str(
                r#"{"date": "2025-06-01T00:00:00.000Z", "stops": [
                    {"customName": "b", "order": 5},
                    {"customName": "a", "order": 1}
                ]}"#,
            )
            .unwrap(),
        );
        assert_eq!(day.date, NaiveDate::from_ymd_opt(2025, 6, 1));
        assert_eq!(day.stops[0].name(), Some("a"));
        assert_eq!(day.stops[0].order, 0);
        assert_eq!(day.stops[1].order, 1);
    }

    #[test]
    fn itinerary_requires_owner() {
        let dto: ItineraryDto = serde_json::from_str(r#"{"_id": "x", "title": "T"}"#).unwrap();
        assert_eq!(
            convert_itinerary(dto).unwrap_err(),
            ConversionError::MissingField("owner")
        );
    }

    #[test]
    fn itinerary_rejects_reversed_dates() {
        let dto: ItineraryDto = serde_json::from_str(
            r#"{"_id": "x", "owner": "u", "startDate": "2025-06-03", "endDate": "2025-06-01"}"#,
        )
        .unwrap();
        assert!(matches!(
            convert_itinerary(dto),
            Err(ConversionError::EndBeforeStart { .. })
        ));
    }

    #[test]
    fn itinerary_fields() {
        let dto: ItineraryDto = serde_json::from_str(
            r#"{
                "_id": "it1",
                "title": "Paris",
                "owner": {"_id": "u1", "name": "Ana"},
                "isPublic": true,
                "status": "active",
                "startDate": "2025-06-01",
                "endDate": "2025-06-02",
                "days": [{"date": "2025-06-01"}, {"date": "2025-06-02"}],
                "collaborators": [
                    {"user": {"_id": "u2", "name": "Ben"}, "permission": "edit"},
                    {"user": "u3", "permission": "admin"}
                ],
                "budget": {"total": 500, "expenses": [
                    {"_id": "e1", "category": "food", "amount": 12.5, "dayNumber": 2},
                    {"_id": "e2", "category": "spa", "amount": 30},
                    {"_id": "e3", "category": "food", "amount": -1}
                ]},
                "completeness": 66.6
            }"#,
        )
        .unwrap();

        let it = convert_itinerary(dto).unwrap();

        assert_eq!(it.owner, UserId::new("u1"));
        assert_eq!(it.owner_name.as_deref(), Some("Ana"));
        assert_eq!(it.status, ItineraryStatus::Active);
        assert_eq!(it.day_count(), 2);
        assert_eq!(it.collaborators[0].permission, Permission::Edit);
        assert_eq!(it.collaborators[1].permission, Permission::View);
        assert_eq!(it.completeness, Some(67));

        let budget = it.budget.unwrap();
        assert_eq!(budget.currency, "USD");
        assert_eq!(budget.expenses.len(), 2);
        assert_eq!(budget.expenses[0].day_number, 2);
        assert_eq!(budget.expenses[1].category, ExpenseCategory::Other);
        assert_eq!(budget.expenses[1].day_number, 1);
    }

    #[test]
    fn classified_routes_keep_buckets() {
        let payload: RoutesPayload = serde_json::from_str(
            r#"{
                "directRoutes": [{"_id": "a", "name": "Bus A"}],
                "nearbyRoutes": [{"_id": "b", "distanceFromOrigin": 200, "nearestOriginStop": {"name": "Elm St"}}]
            }"#,
        )
        .unwrap();

        let options = convert_routes(payload);

        assert_eq!(options.len(), 2);
        assert!(options[0].match_kind.is_direct());
        match &options[1].match_kind {
            MatchKind::NearbyStops(m) => {
                assert_eq!(m.walk_from_origin_m, Some(200.0));
                assert_eq!(m.origin_stop.as_deref(), Some("Elm St"));
            }
            MatchKind::Direct => panic!("expected nearby match"),
        }
        assert_eq!(options[1].name, "b");
    }

    #[test]
    fn flat_routes_are_all_direct() {
        let payload: RoutesPayload = serde_json::from_str(
            r#"[{"_id": "n", "matchType": "nearby-stops"}, {"_id": "d"}, {"type": "bus"}]"#,
        )
        .unwrap();

        let options = convert_routes(payload);

        let ids: Vec<_> = options.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["n", "d"]);
        assert!(options.iter().all(|o| o.match_kind.is_direct()));
    }

    #[test]
    fn payload_writes_references_by_id() {
        let mut it = Itinerary::new("it1", UserId::new("u1"), "Trip");
        it.start_date = NaiveDate::from_ymd_opt(2025, 6, 1);
        let stops = vec![
            Stop::new(StopKind::Hotel(PlaceRef::new("h1", None))),
            Stop::custom("Pier", LatLng::new(40.0, -74.0).unwrap())
                .with_time(NaiveTime::from_hms_opt(9, 5, 0).unwrap()),
        ];
        it.days = vec![Day::default().with_stops(stops)];

        let payload = itinerary_payload(&it);
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["startDate"], "2025-06-01");
        assert_eq!(json["status"], "planning");
        let stops = &json["days"][0]["stops"];
        assert_eq!(stops[0]["type"], "hotel");
        assert_eq!(stops[0]["hotel"], "h1");
        assert_eq!(stops[1]["customName"], "Pier");
        assert_eq!(stops[1]["customCoordinates"]["lat"], 40.0);
        assert_eq!(stops[1]["time"], "09:05");
        assert_eq!(stops[1]["order"], 1);
        assert!(json.get("collaborators").is_none());
    }

    #[test]
    fn date_parsing() {
        assert_eq!(parse_date("2025-06-01"), NaiveDate::from_ymd_opt(2025, 6, 1));
        assert_eq!(
            parse_date("2025-06-01T22:00:00.000Z"),
            NaiveDate::from_ymd_opt(2025, 6, 1)
        );
        assert_eq!(parse_date("June"), None);
        assert_eq!(parse_date(""), None);
    }
}
