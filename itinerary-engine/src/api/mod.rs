//! Itinerary backend client.
//!
//! This module provides an HTTP client for the itinerary REST API and an
//! in-memory mock with the same interface.
//!
//! Key characteristics of the backend:
//! - Responses may be wrapped in `{success, data}`; `success: false` is an
//!   error even with a 2xx status
//! - References (locations, hotels, users) arrive populated or as bare ids
//! - Updates replace the whole itinerary; collaborators have their own
//!   endpoint

mod client;
mod convert;
mod error;
mod mock;
mod service;
mod types;

pub use client::{ApiClient, ApiConfig, DEFAULT_BASE_URL};
pub use convert::{
    ConversionError, convert_itinerary, convert_routes, convert_stop, day_payload,
    itinerary_payload, parse_date,
};
pub use error::ApiError;
pub use mock::MockApi;
pub use service::ItineraryApi;
pub use types::{
    DayPayload, ItineraryDto, ItineraryPayload, NewItinerary, RoutesPayload, StopDto,
    TransportOptionDto,
};
