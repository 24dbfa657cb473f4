//! Caching layer for route searches.
//!
//! Route options change rarely, and the same day segment is searched again
//! whenever the itinerary is reopened. Coordinates are bucketed so that
//! float noise from re-resolved stops still hits the same entry.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::debug;

use crate::api::{ApiError, RoutesPayload};
use crate::transport::{RouteFinder, RouteQuery};

/// Coordinate buckets per degree (1e-5 degrees, about a metre).
const BUCKETS_PER_DEGREE: f64 = 100_000.0;

/// Cache key for route searches.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum RouteKey {
    Coordinates([i64; 4]),
    Names(String, String),
}

impl RouteKey {
    fn of(query: &RouteQuery) -> Self {
        match query {
            RouteQuery::Coordinates { from, to } => RouteKey::Coordinates([
                bucket(from.lat()),
                bucket(from.lng()),
                bucket(to.lat()),
                bucket(to.lng()),
            ]),
            RouteQuery::Names { from, to } => RouteKey::Names(from.clone(), to.clone()),
        }
    }
}

fn bucket(degrees: f64) -> i64 {
    (degrees * BUCKETS_PER_DEGREE).round() as i64
}

/// Configuration for the route cache.
#[derive(Debug, Clone)]
pub struct RouteCacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for RouteCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(5 * 60),
            max_capacity: 500,
        }
    }
}

/// Route finder with caching.
///
/// Wraps any `RouteFinder`. Only successful responses are cached.
pub struct CachedRouteFinder<F> {
    inner: F,
    routes: MokaCache<RouteKey, Arc<RoutesPayload>>,
}

impl<F> CachedRouteFinder<F> {
    /// Create a new cached finder.
    pub fn new(inner: F, config: &RouteCacheConfig) -> Self {
        let routes = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { inner, routes }
    }

    /// Access the underlying finder for operations that bypass cache.
    pub fn inner(&self) -> &F {
        &self.inner
    }

    /// Get cache statistics.
    pub fn cache_entry_count(&self) -> u64 {
        self.routes.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_cache(&self) {
        self.routes.invalidate_all();
    }
}

impl<F: RouteFinder + Sync> RouteFinder for CachedRouteFinder<F> {
    async fn find_routes(&self, query: &RouteQuery) -> Result<RoutesPayload, ApiError> {
        let key = RouteKey::of(query);

        if let Some(cached) = self.routes.get(&key).await {
            debug!(?key, "route cache hit");
            return Ok(cached.as_ref().clone());
        }

        let payload = self.inner.find_routes(query).await?;
        self.routes.insert(key, Arc::new(payload.clone())).await;
        Ok(payload)
    }
}
