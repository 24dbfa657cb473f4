//! Mock backend for testing without a server.
//!
//! Holds itineraries in memory, optionally loaded from JSON files in the
//! same shape the backend serves, and answers route searches with a fixed
//! payload.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{Itinerary, ItinerarySummary, UserId};
use crate::transport::{BookingRecorder, RouteFinder, RouteQuery};

use super::convert::{convert_itinerary, parse_date};
use super::error::ApiError;
use super::service::ItineraryApi;
use super::types::{ItineraryDto, NewItinerary, RoutesPayload};

/// Name of the route payload file in a mock data directory.
const ROUTES_FILE: &str = "routes.json";

/// In-memory backend.
#[derive(Clone, Default)]
pub struct MockApi {
    user: Option<UserId>,
    itineraries: Arc<RwLock<HashMap<String, Itinerary>>>,
    routes: Arc<RwLock<Option<RoutesPayload>>>,
    bookings: Arc<RwLock<Vec<String>>>,
    calls: Arc<AtomicUsize>,
    fail_writes: Arc<AtomicBool>,
}

impl MockApi {
    /// Create an empty mock acting for the given user.
    pub fn new(user: Option<UserId>) -> Self {
        Self {
            user,
            ..Self::default()
        }
    }

    /// Load a mock from a directory.
    ///
    /// Every `.json` file is an itinerary as served by `GET /itineraries/:id`,
    /// except `routes.json`, which is served for every route search.
    pub fn from_dir(data_dir: impl AsRef<Path>, user: Option<UserId>) -> Result<Self, ApiError> {
        let data_dir = data_dir.as_ref();
        let mut itineraries = HashMap::new();
        let mut routes = None;

        let entries = std::fs::read_dir(data_dir).map_err(|e| {
            ApiError::NotConfigured(format!("failed to read mock data directory: {e}"))
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| {
                ApiError::NotConfigured(format!("failed to read directory entry: {e}"))
            })?;

            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            let json = std::fs::read_to_string(&path).map_err(|e| {
                ApiError::NotConfigured(format!("failed to read {}: {e}", path.display()))
            })?;
            let parse_error = |e: serde_json::Error| ApiError::Json {
                message: format!("{}: {e}", path.display()),
                body: None,
            };

            if path.file_name().and_then(|s| s.to_str()) == Some(ROUTES_FILE) {
                routes = Some(serde_json::from_str(&json).map_err(parse_error)?);
                continue;
            }

            let dto: ItineraryDto = serde_json::from_str(&json).map_err(parse_error)?;
            let itinerary = convert_itinerary(dto).map_err(|e| ApiError::Json {
                message: format!("{}: {e}", path.display()),
                body: None,
            })?;
            itineraries.insert(itinerary.id.clone(), itinerary);
        }

        if itineraries.is_empty() {
            return Err(ApiError::NotConfigured(format!(
                "no itinerary files found in {}",
                data_dir.display()
            )));
        }

        Ok(Self {
            user,
            itineraries: Arc::new(RwLock::new(itineraries)),
            routes: Arc::new(RwLock::new(routes)),
            ..Self::default()
        })
    }

    /// Store an itinerary as-is.
    pub async fn insert(&self, itinerary: Itinerary) {
        self.itineraries
            .write()
            .await
            .insert(itinerary.id.clone(), itinerary);
    }

    /// The stored copy of an itinerary.
    pub async fn stored(&self, id: &str) -> Option<Itinerary> {
        self.itineraries.read().await.get(id).cloned()
    }

    pub async fn set_routes(&self, payload: RoutesPayload) {
        *self.routes.write().await = Some(payload);
    }

    /// Make every write fail with a server error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of API calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Option ids passed to `record_booking`.
    pub async fn bookings(&self) -> Vec<String> {
        self.bookings.read().await.clone()
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn check_write(&self) -> Result<(), ApiError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ApiError::Status {
                status: 500,
                message: "mock write failure".to_string(),
            });
        }
        Ok(())
    }

    fn visible_to_user(&self, itinerary: &Itinerary) -> bool {
        let Some(user) = &self.user else {
            return false;
        };
        itinerary.owner == *user || itinerary.collaborators.iter().any(|c| c.user == *user)
    }
}

impl ItineraryApi for MockApi {
    async fn get_itinerary(&self, id: &str) -> Result<Itinerary, ApiError> {
        self.record_call();
        self.stored(id)
            .await
            .ok_or_else(|| ApiError::NotFound(format!("/itineraries/{id}")))
    }

    async fn my_itineraries(&self) -> Result<Vec<ItinerarySummary>, ApiError> {
        self.record_call();
        if self.user.is_none() {
            return Err(ApiError::Unauthorized);
        }
        let itineraries = self.itineraries.read().await;
        let mut summaries: Vec<ItinerarySummary> = itineraries
            .values()
            .filter(|it| self.visible_to_user(it))
            .map(ItinerarySummary::from)
            .collect();
        summaries.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(summaries)
    }

    async fn public_itineraries(&self) -> Result<Vec<ItinerarySummary>, ApiError> {
        self.record_call();
        let itineraries = self.itineraries.read().await;
        let mut summaries: Vec<ItinerarySummary> = itineraries
            .values()
            .filter(|it| it.is_public)
            .map(ItinerarySummary::from)
            .collect();
        summaries.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(summaries)
    }

    async fn create_itinerary(&self, draft: &NewItinerary) -> Result<Itinerary, ApiError> {
        self.record_call();
        self.check_write()?;
        let owner = self.user.clone().ok_or(ApiError::Unauthorized)?;

        let mut itinerary = Itinerary::new(Uuid::new_v4().to_string(), owner, draft.title.clone());
        itinerary.description = draft.description.clone();
        itinerary.is_public = draft.is_public;
        if let (Some(start), Some(end)) = (parse_date(&draft.start_date), parse_date(&draft.end_date)) {
            itinerary
                .set_date_range(start, end)
                .map_err(|e| ApiError::Rejected(e.to_string()))?;
        }

        self.insert(itinerary.clone()).await;
        Ok(itinerary)
    }

    async fn update_itinerary(&self, itinerary: &Itinerary) -> Result<(), ApiError> {
        self.record_call();
        self.check_write()?;
        let mut itineraries = self.itineraries.write().await;
        let stored = itineraries
            .get_mut(&itinerary.id)
            .ok_or_else(|| ApiError::NotFound(format!("/itineraries/{}", itinerary.id)))?;

        // Collaborators are not part of an update.
        let collaborators = std::mem::take(&mut stored.collaborators);
        *stored = itinerary.clone();
        stored.collaborators = collaborators;
        Ok(())
    }

    async fn delete_itinerary(&self, id: &str) -> Result<(), ApiError> {
        self.record_call();
        self.check_write()?;
        self.itineraries
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| ApiError::NotFound(format!("/itineraries/{id}")))
    }

    async fn remove_collaborator(&self, itinerary_id: &str, user: &UserId) -> Result<(), ApiError> {
        self.record_call();
        self.check_write()?;
        let mut itineraries = self.itineraries.write().await;
        let stored = itineraries
            .get_mut(itinerary_id)
            .ok_or_else(|| ApiError::NotFound(format!("/itineraries/{itinerary_id}")))?;
        stored.collaborators.retain(|c| c.user != *user);
        Ok(())
    }
}

impl RouteFinder for MockApi {
    async fn find_routes(&self, _query: &RouteQuery) -> Result<RoutesPayload, ApiError> {
        self.record_call();
        Ok(self
            .routes
            .read()
            .await
            .clone()
            .unwrap_or(RoutesPayload::Flat(Vec::new())))
    }
}

impl BookingRecorder for MockApi {
    async fn record_booking(&self, option_id: &str) -> Result<(), ApiError> {
        self.record_call();
        self.check_write()?;
        self.bookings.write().await.push(option_id.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Collaborator, Permission};

    fn data_dir() -> std::path::PathBuf {
        std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("data")
    }

    #[tokio::test]
    async fn loads_fixtures() {
        let api = MockApi::from_dir(data_dir(), Some(UserId::new("u-ana"))).unwrap();

        let it = api.get_itinerary("it-lisbon").await.unwrap();
        assert_eq!(it.title, "Lisbon long weekend");
        assert_eq!(it.day_count(), 3);

        let mine = api.my_itineraries().await.unwrap();
        assert!(mine.iter().any(|s| s.id == "it-lisbon"));

        let routes = api
            .find_routes(&RouteQuery::Names {
                from: "a".into(),
                to: "b".into(),
            })
            .await
            .unwrap();
        assert!(!routes.is_empty());
    }

    #[test]
    fn empty_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            MockApi::from_dir(dir.path(), None),
            Err(ApiError::NotConfigured(_))
        ));
    }

    #[tokio::test]
    async fn update_keeps_collaborators() {
        let api = MockApi::new(Some(UserId::new("u1")));
        let mut it = Itinerary::new("x", UserId::new("u1"), "Trip");
        it.collaborators = vec![Collaborator::new(UserId::new("u2"), Permission::Edit)];
        api.insert(it.clone()).await;

        it.title = "Renamed".into();
        it.collaborators.clear();
        api.update_itinerary(&it).await.unwrap();

        let stored = api.stored("x").await.unwrap();
        assert_eq!(stored.title, "Renamed");
        assert_eq!(stored.collaborators.len(), 1);
        assert_eq!(api.call_count(), 1);
    }

    #[tokio::test]
    async fn failing_writes() {
        let api = MockApi::new(Some(UserId::new("u1")));
        api.insert(Itinerary::new("x", UserId::new("u1"), "Trip")).await;
        api.fail_writes(true);

        let it = api.stored("x").await.unwrap();
        assert!(matches!(
            api.update_itinerary(&it).await,
            Err(ApiError::Status { status: 500, .. })
        ));
        assert!(api.record_booking("t1").await.is_err());
        assert!(api.bookings().await.is_empty());
    }

    #[tokio::test]
    async fn anonymous_has_no_own_list() {
        let api = MockApi::new(None);
        assert!(matches!(
            api.my_itineraries().await,
            Err(ApiError::Unauthorized)
        ));
        assert!(api.public_itineraries().await.unwrap().is_empty());
    }
}
