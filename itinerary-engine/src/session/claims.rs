//! JWT claim decoding.
//!
//! Claims are read without verifying the signature: the backend verifies
//! every request, and the client only needs to know who it is and when the
//! token runs out.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::UserId;

use super::error::SessionError;

/// Claims the client cares about.
#[derive(Debug, Clone, PartialEq)]
pub struct Claims {
    pub user_id: UserId,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct RawClaims {
    id: Option<String>,
    #[serde(rename = "userId")]
    user_id: Option<String>,
    sub: Option<String>,
    exp: Option<i64>,
}

/// Decode the payload segment of a JWT.
///
/// The user id is taken from `id`, `userId` or `sub`, in that order.
pub fn decode_claims(token: &str) -> Result<Claims, SessionError> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(SessionError::MalformedToken("expected three segments"));
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|_| SessionError::MalformedToken("payload is not base64url"))?;
    let raw: RawClaims = serde_json::from_slice(&bytes)
        .map_err(|_| SessionError::MalformedToken("payload is not a JSON object"))?;

    let user_id = raw
        .id
        .or(raw.user_id)
        .or(raw.sub)
        .filter(|id| !id.is_empty())
        .ok_or(SessionError::MissingUser)?;

    let expires_at = match raw.exp {
        Some(exp) => Some(
            DateTime::from_timestamp(exp, 0)
                .ok_or(SessionError::MalformedToken("expiry out of range"))?,
        ),
        None => None,
    };

    Ok(Claims {
        user_id: UserId::new(user_id),
        expires_at,
    })
}

#[cfg(test)]
pub(crate) fn encode_test_token(payload: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{header}.{body}.c2lnbmF0dXJl")
}
