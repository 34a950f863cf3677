//! Remote services around the attendance report.
//!
//! - Zoom: server-to-server OAuth, daily meeting lookup and paginated
//!   participant retrieval
//! - Google: installed-app OAuth and CSV upload to a Drive folder
//!
//! Nothing here retries; every failure is returned to the caller.

use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

pub mod drive;
pub mod google;
pub mod zoom;

pub use drive::DriveClient;
pub use google::{AuthorizedUser, GoogleAuth, InstalledClientSecret, parse_authorization_code};
pub use zoom::{
    MeetingSummary, ParticipantsPage, ZoomClient, ZoomCredentials, ZoomParticipant, busiest_meeting,
};

/// Default request timeout for API calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Remote API errors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Credentials were missing or malformed.
    #[error("invalid credentials: {reason}")]
    InvalidCredentials { reason: String },
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The service answered with a non-success status.
    #[error("API error (status {status}): {message}")]
    Api { status: StatusCode, message: String },
    /// Failed to parse response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    /// Reading or writing a credential file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Builds the shared HTTP client with the default timeout.
fn http_client() -> Result<reqwest::Client, ApiError> {
    reqwest::Client::builder()
        .timeout(DEFAULT_TIMEOUT)
        .build()
        .map_err(ApiError::ClientBuild)
}

/// Reads a response body, mapping non-success statuses to [`ApiError::Api`]
/// and decoding success bodies as JSON.
async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ApiError::Api {
            status,
            message: parse_error_message(&body).unwrap_or(body),
        });
    }
    serde_json::from_str(&body).map_err(|err| ApiError::InvalidResponse(err.to_string()))
}

/// Extracts a human-readable message from the error payloads Zoom and Google
/// return.
fn parse_error_message(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ErrorPayload {
        // Google: {"error": {"message": "..."}}
        Nested { error: ErrorDetails },
        // Google OAuth: {"error": "invalid_grant", "error_description": "..."}
        OAuth {
            error: String,
            #[serde(default)]
            error_description: Option<String>,
        },
        // Zoom: {"code": 124, "message": "..."}
        Flat { message: String },
    }

    #[derive(Deserialize)]
    struct ErrorDetails {
        message: String,
    }

    match serde_json::from_str::<ErrorPayload>(body).ok()? {
        ErrorPayload::Nested { error } => Some(error.message),
        ErrorPayload::OAuth {
            error,
            error_description: Some(description),
        } => Some(format!("{error}: {description}")),
        ErrorPayload::OAuth { error, .. } => Some(error),
        ErrorPayload::Flat { message } => Some(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_google_error() {
        let body = r#"{"error":{"code":404,"message":"File not found: abc"}}"#;
        assert_eq!(parse_error_message(body).as_deref(), Some("File not found: abc"));
    }

    #[test]
    fn parses_oauth_error() {
        let body = r#"{"error":"invalid_grant","error_description":"Token has been expired"}"#;
        assert_eq!(
            parse_error_message(body).as_deref(),
            Some("invalid_grant: Token has been expired")
        );
        assert_eq!(
            parse_error_message(r#"{"error":"invalid_client"}"#).as_deref(),
            Some("invalid_client")
        );
    }

    #[test]
    fn parses_zoom_error() {
        let body = r#"{"code":3001,"message":"Meeting does not exist"}"#;
        assert_eq!(parse_error_message(body).as_deref(), Some("Meeting does not exist"));
    }

    #[test]
    fn unknown_error_body_is_none() {
        assert_eq!(parse_error_message("<html>bad gateway</html>"), None);
    }
}
