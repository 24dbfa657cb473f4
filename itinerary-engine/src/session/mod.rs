//! The signed-in user.
//!
//! A session is an explicit value passed to whatever needs the current user
//! or the bearer token. It is restored from the token file on start and
//! removed from it on logout.

mod claims;
mod error;
mod store;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::UserId;

pub use claims::{Claims, decode_claims};
pub use error::SessionError;
pub use store::{TokenStore, TokenStoreConfig};

/// An authenticated user and their bearer token.
#[derive(Clone, PartialEq)]
pub struct Session {
    token: String,
    user_id: UserId,
    expires_at: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Build a session from a token, checking its claims at `now`.
    pub fn from_token(token: impl Into<String>, now: DateTime<Utc>) -> Result<Self, SessionError> {
        let token = token.into();
        let claims = decode_claims(&token)?;

        if claims.expires_at.is_some_and(|exp| exp <= now) {
            return Err(SessionError::Expired);
        }

        Ok(Self {
            token,
            user_id: claims.user_id,
            expires_at: claims.expires_at,
        })
    }

    /// Restore the saved session, if there is a usable one.
    ///
    /// A malformed or expired token is removed from the store.
    pub fn init(store: &TokenStore) -> Option<Self> {
        Self::init_at(store, Utc::now())
    }

    fn init_at(store: &TokenStore, now: DateTime<Utc>) -> Option<Self> {
        let token = store.load()?;
        match Self::from_token(token, now) {
            Ok(session) => {
                debug!(user = %session.user_id, "restored session");
                Some(session)
            }
            Err(e) => {
                debug!(error = %e, "discarding saved token");
                if let Err(e) = store.clear() {
                    debug!(error = %e, "could not remove saved token");
                }
                None
            }
        }
    }

    /// Start a session from a freshly issued token and persist it.
    pub fn login(token: impl Into<String>, store: &TokenStore) -> Result<Self, SessionError> {
        let session = Self::from_token(token, Utc::now())?;
        store.save(&session.token)?;
        debug!(user = %session.user_id, "logged in");
        Ok(session)
    }

    /// End the session and forget the saved token.
    pub fn logout(self, store: &TokenStore) -> Result<(), SessionError> {
        debug!(user = %self.user_id, "logged out");
        store.clear()
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }
}
