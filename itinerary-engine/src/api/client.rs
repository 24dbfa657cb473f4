//! Itinerary backend HTTP client.
//!
//! Provides async methods for the itinerary, route search and booking
//! endpoints. Handles bearer authentication, concurrency limiting, the
//! optional `{success, data}` envelope and conversion to domain types.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{StatusCode, Url};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::domain::{Itinerary, ItinerarySummary, UserId};
use crate::transport::{BookingRecorder, RouteFinder, RouteQuery};

use super::convert::{convert_itinerary, convert_summary, itinerary_payload};
use super::error::ApiError;
use super::service::ItineraryApi;
use super::types::{Ack, Envelope, ItineraryDto, NewItinerary, RoutesPayload};

/// Default base URL for a locally running backend.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 4;

/// Default request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Length of response body kept in errors.
const BODY_EXCERPT_CHARS: usize = 500;

/// Configuration for the backend client.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL including the `/api` prefix
    pub base_url: String,
    /// Bearer token of the session, if any
    pub token: Option<String>,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Authenticate requests with a bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Itinerary backend client.
///
/// Uses a semaphore to limit concurrent requests.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    semaphore: Arc<Semaphore>,
}

impl ApiClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();

        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| ApiError::NotConfigured("invalid token format".to_string()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ApiError::NotConfigured(format!("invalid base URL: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::NotConfigured(format!(
                "base URL cannot carry a path: {base_url}"
            )));
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
        })
    }

    /// Endpoint URL below the base. Each segment is percent-encoded, so ids
    /// containing `/`, `?` or `#` stay inside their own segment.
    fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::NotConfigured("base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send a request and return the body of a successful response.
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        segments: &[&str],
    ) -> Result<String, ApiError> {
        let path = display_path(segments);
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| ApiError::NotConfigured("request limiter closed".to_string()))?;

        debug!(%path, "sending request");
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }

        if status == StatusCode::FORBIDDEN {
            return Err(ApiError::Forbidden);
        }

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(path));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        Ok(response.text().await?)
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let body = self.send(self.http.get(self.url(segments)?), segments).await?;
        decode(&body)
    }

    async fn summaries(&self, segments: &[&str]) -> Result<Vec<ItinerarySummary>, ApiError> {
        let dtos: Vec<ItineraryDto> = self.get(segments).await?;
        Ok(dtos
            .into_iter()
            .filter_map(|dto| {
                let id = dto.id.clone();
                convert_summary(dto)
                    .inspect_err(|e| warn!(%id, error = %e, "skipping malformed itinerary"))
                    .ok()
            })
            .collect())
    }
}

/// Unescaped path of an endpoint, as reported in errors and logs.
fn display_path(segments: &[&str]) -> String {
    segments.iter().map(|s| format!("/{s}")).collect()
}

/// Unwrap an optional `{success, data}` envelope.
fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let envelope: Envelope<T> = serde_json::from_str(body).map_err(|e| ApiError::Json {
        message: e.to_string(),
        body: Some(excerpt(body)),
    })?;

    match envelope {
        Envelope::Bare(data) => Ok(data),
        Envelope::Wrapped {
            success: false,
            message,
            ..
        } => Err(ApiError::Rejected(
            message.unwrap_or_else(|| "request failed".to_string()),
        )),
        Envelope::Wrapped {
            data: Some(data), ..
        } => Ok(data),
        Envelope::Wrapped { data: None, .. } => Err(ApiError::Json {
            message: "response has no data".to_string(),
            body: Some(excerpt(body)),
        }),
    }
}

/// Check a write acknowledgement. Bodies that are not an ack are accepted.
fn check_ack(body: &str) -> Result<(), ApiError> {
    match serde_json::from_str::<Ack>(body) {
        Ok(Ack {
            success: Some(false),
            message,
        }) => Err(ApiError::Rejected(
            message.unwrap_or_else(|| "request failed".to_string()),
        )),
        _ => Ok(()),
    }
}

/// The `message` of an error body, or an excerpt of the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Ack>(body)
        .ok()
        .and_then(|ack| ack.message)
        .unwrap_or_else(|| excerpt(body))
}

fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}

fn conversion_error(e: impl std::fmt::Display) -> ApiError {
    ApiError::Json {
        message: e.to_string(),
        body: None,
    }
}

impl ItineraryApi for ApiClient {
    async fn get_itinerary(&self, id: &str) -> Result<Itinerary, ApiError> {
        let dto: ItineraryDto = self.get(&["itineraries", id]).await?;
        convert_itinerary(dto).map_err(conversion_error)
    }

    async fn my_itineraries(&self) -> Result<Vec<ItinerarySummary>, ApiError> {
        self.summaries(&["itineraries", "my"]).await
    }

    async fn public_itineraries(&self) -> Result<Vec<ItinerarySummary>, ApiError> {
        self.summaries(&["itineraries", "public"]).await
    }

    async fn create_itinerary(&self, draft: &NewItinerary) -> Result<Itinerary, ApiError> {
        let path = ["itineraries"];
        let body = self
            .send(self.http.post(self.url(&path)?).json(draft), &path)
            .await?;
        let dto: ItineraryDto = decode(&body)?;
        convert_itinerary(dto).map_err(conversion_error)
    }

    async fn update_itinerary(&self, itinerary: &Itinerary) -> Result<(), ApiError> {
        let path = ["itineraries", itinerary.id.as_str()];
        let payload = itinerary_payload(itinerary);
        let body = self
            .send(self.http.put(self.url(&path)?).json(&payload), &path)
            .await?;
        check_ack(&body)
    }

    async fn delete_itinerary(&self, id: &str) -> Result<(), ApiError> {
        let path = ["itineraries", id];
        let body = self.send(self.http.delete(self.url(&path)?), &path).await?;
        check_ack(&body)
    }

    async fn remove_collaborator(&self, itinerary_id: &str, user: &UserId) -> Result<(), ApiError> {
        let path = ["itineraries", itinerary_id, "collaborators", user.as_str()];
        let body = self.send(self.http.delete(self.url(&path)?), &path).await?;
        check_ack(&body)
    }
}

impl RouteFinder for ApiClient {
    async fn find_routes(&self, query: &RouteQuery) -> Result<RoutesPayload, ApiError> {
        let path = ["transportation", "find-routes"];
        let request = self.http.get(self.url(&path)?).query(&query.params());
        let body = self.send(request, &path).await?;
        decode(&body)
    }
}

impl BookingRecorder for ApiClient {
    async fn record_booking(&self, option_id: &str) -> Result<(), ApiError> {
        let path = ["transportation", option_id, "book"];
        let request = self
            .http
            .post(self.url(&path)?)
            .json(&serde_json::json!({}));
        let body = self.send(request, &path).await?;
        check_ack(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = ApiConfig::new("http://localhost:8080/api")
            .with_token("abc")
            .with_max_concurrent(10)
            .with_timeout(60);

        assert_eq!(config.base_url, "http://localhost:8080/api");
        assert_eq!(config.token.as_deref(), Some("abc"));
        assert_eq!(config.max_concurrent, 10);
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn config_defaults() {
        let config = ApiConfig::default();

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.token, None);
        assert_eq!(config.max_concurrent, DEFAULT_MAX_CONCURRENT);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn client_creation() {
        let client = ApiClient::new(ApiConfig::new("http://localhost/api/").with_token("t"));
        assert_eq!(client.unwrap().url(&["x"]).unwrap().as_str(), "http://localhost/api/x");

        let client = ApiClient::new(ApiConfig::new("http://localhost:5000")).unwrap();
        assert_eq!(client.url(&["x", "y"]).unwrap().as_str(), "http://localhost:5000/x/y");
    }

    #[test]
    fn base_url_must_parse() {
        let result = ApiClient::new(ApiConfig::new("localhost/api"));
        assert!(matches!(result, Err(ApiError::NotConfigured(_))));

        let result = ApiClient::new(ApiConfig::new("mailto:trips@example.com"));
        assert!(matches!(result, Err(ApiError::NotConfigured(_))));
    }

    #[test]
    fn ids_are_escaped_within_their_segment() {
        let client = ApiClient::new(ApiConfig::default()).unwrap();

        let url = client.url(&["itineraries", "a/b?c#d", "collaborators", "u 1"]).unwrap();
        assert_eq!(url.path(), "/api/itineraries/a%2Fb%3Fc%23d/collaborators/u%201");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);

        assert_eq!(
            display_path(&["itineraries", "a/b"]),
            "/itineraries/a/b"
        );
    }

    #[test]
    fn token_must_be_header_safe() {
        let result = ApiClient::new(ApiConfig::default().with_token("bad\ntoken"));
        assert!(matches!(result, Err(ApiError::NotConfigured(_))));
    }

    #[test]
    fn decode_envelopes() {
        let data: Vec<u32> = decode(r#"{"success": true, "data": [1]}"#).unwrap();
        assert_eq!(data, vec![1]);

        let data: Vec<u32> = decode("[2]").unwrap();
        assert_eq!(data, vec![2]);

        let err = decode::<Vec<u32>>(r#"{"success": false, "message": "no access"}"#).unwrap_err();
        assert!(matches!(err, ApiError::Rejected(ref m) if m == "no access"));

        let err = decode::<Vec<u32>>("not json").unwrap_err();
        assert!(matches!(err, ApiError::Json { body: Some(ref b), .. } if b == "not json"));
    }

    #[test]
    fn ack_bodies() {
        assert!(check_ack(r#"{"success": true}"#).is_ok());
        assert!(check_ack("").is_ok());
        assert!(check_ack(r#"{"_id": "x"}"#).is_ok());
        assert!(matches!(
            check_ack(r#"{"success": false}"#),
            Err(ApiError::Rejected(_))
        ));
    }

    #[test]
    fn error_message_prefers_message_field() {
        assert_eq!(error_message(r#"{"message": "Itinerary locked"}"#), "Itinerary locked");
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
        assert_eq!(error_message(&"x".repeat(900)).len(), BODY_EXCERPT_CHARS);
    }
}
