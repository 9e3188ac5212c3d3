// SPDX-License-Identifier: MIT

//! API error taxonomy surfaced to callers.
//!
//! Every operation terminates in exactly one outcome: a typed payload or
//! one of these variants. No internal retries, no silent defaults.

use reqwest::StatusCode;

/// Errors produced by [`crate::services::ApiClient`] operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request could not be constructed (malformed URL or body
    /// encoding). Never worth retrying.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// An operation that requires a bearer token was invoked without one.
    /// Client-side precondition, no request was made.
    #[error("No token found")]
    MissingToken,

    /// The backend answered with a status outside 200-299. The message is
    /// endpoint-specific (e.g. 401 -> "Invalid or expired token").
    #[error("HTTP {status}: {message}")]
    Http { status: StatusCode, message: String },

    /// The underlying network call failed before a status was received.
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Success status but no body where one was required.
    #[error("No data received")]
    EmptyResponse,

    /// A body was present but did not match the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The refresh-token endpoint answered without a new token; the
    /// message is supplied by the server.
    #[error("Token refresh failed: {0}")]
    TokenRefresh(String),
}

impl ApiError {
    /// True if this is a 401 (the bearer token is invalid or expired).
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            ApiError::Http {
                status: StatusCode::UNAUTHORIZED,
                ..
            }
        )
    }
}

/// Result type alias for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;
