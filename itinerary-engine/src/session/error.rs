//! Session error types.

/// Errors that can occur when loading or creating a session.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    /// Token is not a decodable JWT
    #[error("malformed token: {0}")]
    MalformedToken(&'static str),

    /// Token has no user id claim
    #[error("token has no user id")]
    MissingUser,

    /// Token expiry is in the past
    #[error("token expired")]
    Expired,

    /// Token file could not be read or written
    #[error("token store error: {message}")]
    Store { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(SessionError::Expired.to_string(), "token expired");
        assert_eq!(
            SessionError::MalformedToken("expected three segments").to_string(),
            "malformed token: expected three segments"
        );
        assert_eq!(
            SessionError::Store {
                message: "disk full".into()
            }
            .to_string(),
            "token store error: disk full"
        );
    }
}
