//! Transport option matching.
//!
//! Turns a day's travel segment into a ranked, deduplicated list of
//! transport options from the route service.

use std::collections::HashSet;
use std::future::Future;

use tracing::debug;

use crate::api::{ApiError, RoutesPayload, convert_routes};
use crate::domain::{Day, MatchKind, TransportOption};

use super::query::{Endpoint, RouteQuery, SearchError, day_endpoints};

/// Source of raw route search results.
///
/// This abstraction allows the matcher to be tested with mock data.
pub trait RouteFinder {
    /// Run one route search against the backend.
    fn find_routes(
        &self,
        query: &RouteQuery,
    ) -> impl Future<Output = Result<RoutesPayload, ApiError>> + Send;
}

/// Matches travel segments against a route finder.
pub struct TransportMatcher<'a, F> {
    finder: &'a F,
}

impl<'a, F: RouteFinder> TransportMatcher<'a, F> {
    pub fn new(finder: &'a F) -> Self {
        Self { finder }
    }

    /// Find transport between two endpoints.
    ///
    /// An empty list is a valid outcome. Invalid endpoints are rejected
    /// before any request is made.
    pub async fn find_routes(
        &self,
        origin: &Endpoint,
        destination: &Endpoint,
    ) -> Result<Vec<TransportOption>, SearchError> {
        let query = RouteQuery::from_endpoints(origin, destination)?;
        debug!(?query, "searching routes");

        let payload = self.finder.find_routes(&query).await?;
        let options = rank_options(convert_routes(payload));

        debug!(
            count = options.len(),
            direct = options.iter().filter(|o| o.match_kind.is_direct()).count(),
            "route search complete"
        );
        Ok(options)
    }

    /// Find transport for a day's segment from its first to its last
    /// resolvable stop. Returns `None` when fewer than two stops resolve.
    pub async fn for_day(&self, day: &Day) -> Option<Result<Vec<TransportOption>, SearchError>> {
        let (origin, destination) = day_endpoints(day)?;
        Some(self.find_routes(&origin, &destination).await)
    }
}

/// Order and deduplicate options.
///
/// Direct matches come first in service order. Nearby matches follow,
/// ranked by total walking distance with ties kept in service order. Each
/// id appears once; a direct match hides nearby matches of the same option.
pub fn rank_options(options: Vec<TransportOption>) -> Vec<TransportOption> {
    let (direct, mut nearby): (Vec<_>, Vec<_>) =
        options.into_iter().partition(|o| o.match_kind.is_direct());

    nearby.sort_by(|a, b| walk_m(a).total_cmp(&walk_m(b)));

    let mut seen = HashSet::new();
    direct
        .into_iter()
        .chain(nearby)
        .filter(|o| seen.insert(o.id.clone()))
        .collect()
}

fn walk_m(option: &TransportOption) -> f64 {
    match &option.match_kind {
        MatchKind::Direct => 0.0,
        MatchKind::NearbyStops(m) => m.total_walk_m(),
    }
}
