//! The itinerary store as seen by the editor.

use std::future::Future;

use crate::domain::{Itinerary, ItinerarySummary, UserId};

use super::error::ApiError;
use super::types::NewItinerary;

/// Itinerary persistence.
///
/// Implemented by the HTTP client and by the in-memory mock, so editor
/// logic can be tested without a backend.
pub trait ItineraryApi {
    fn get_itinerary(&self, id: &str) -> impl Future<Output = Result<Itinerary, ApiError>> + Send;

    /// Itineraries the session user owns or collaborates on.
    fn my_itineraries(&self) -> impl Future<Output = Result<Vec<ItinerarySummary>, ApiError>> + Send;

    fn public_itineraries(
        &self,
    ) -> impl Future<Output = Result<Vec<ItinerarySummary>, ApiError>> + Send;

    fn create_itinerary(
        &self,
        draft: &NewItinerary,
    ) -> impl Future<Output = Result<Itinerary, ApiError>> + Send;

    /// Replace the stored itinerary with this snapshot.
    fn update_itinerary(
        &self,
        itinerary: &Itinerary,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn delete_itinerary(&self, id: &str) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn remove_collaborator(
        &self,
        itinerary_id: &str,
        user: &UserId,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}
