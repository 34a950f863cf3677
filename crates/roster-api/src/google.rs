//! Google installed-app OAuth for Drive uploads.
//!
//! The token file uses Google's "authorized user" JSON layout, so tokens
//! written by other Google tooling can be reused.

use std::fmt;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::{ApiError, http_client, read_json};

/// Per-file Drive access, limited to files this app creates.
pub const DRIVE_FILE_SCOPE: &str = "https://www.googleapis.com/auth/drive.file";

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Redirect target for the copy-the-code consent flow.
pub const LOOPBACK_REDIRECT_URI: &str = "http://localhost";

/// Tokens expiring within this window are refreshed ahead of use.
const EXPIRY_SKEW_SECS: i64 = 60;

/// The `installed` section of a Google OAuth client secret file.
#[derive(Clone, Deserialize)]
pub struct InstalledClientSecret {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl fmt::Debug for InstalledClientSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstalledClientSecret")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl InstalledClientSecret {
    /// Loads a client secret file as downloaded from the Google console.
    pub fn load(path: &Path) -> Result<Self, ApiError> {
        #[derive(Deserialize)]
        struct SecretFile {
            installed: InstalledClientSecret,
        }

        let contents = fs::read_to_string(path)?;
        let file: SecretFile = serde_json::from_str(&contents).map_err(|err| {
            ApiError::InvalidCredentials {
                reason: format!("{}: {err}", path.display()),
            }
        })?;
        Ok(file.installed)
    }

    /// Consent page URL requesting offline Drive file access.
    pub fn authorization_url(&self) -> Result<String, ApiError> {
        let url = Url::parse_with_params(
            &self.auth_uri,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", LOOPBACK_REDIRECT_URI),
                ("response_type", "code"),
                ("scope", DRIVE_FILE_SCOPE),
                ("access_type", "offline"),
                ("prompt", "consent"),
            ],
        )
        .map_err(|err| ApiError::InvalidCredentials {
            reason: format!("invalid auth_uri: {err}"),
        })?;
        Ok(url.into())
    }
}

/// Extracts the authorization code from either the bare code or the full
/// redirect URL the browser landed on.
pub fn parse_authorization_code(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    match Url::parse(input) {
        Ok(url) => url
            .query_pairs()
            .find(|(key, _)| key == "code")
            .map(|(_, code)| code.into_owned())
            .filter(|code| !code.is_empty()),
        Err(_) => Some(input.to_string()),
    }
}

/// Stored user credentials: refresh token plus the last access token.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthorizedUser {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl fmt::Debug for AuthorizedUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizedUser")
            .field("client_id", &self.client_id)
            .field("expiry", &self.expiry)
            .finish_non_exhaustive()
    }
}

impl AuthorizedUser {
    /// Loads a token file.
    pub fn load(path: &Path) -> Result<Self, ApiError> {
        let contents = fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(|err| ApiError::InvalidCredentials {
            reason: format!("{}: {err}", path.display()),
        })
    }

    /// Writes the token file, replacing any previous one.
    pub fn save(&self, path: &Path) -> Result<(), ApiError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|err| ApiError::InvalidResponse(err.to_string()))?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Whether the access token is missing or about to expire at `now`.
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        match (&self.token, self.expiry) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(_), Some(expiry)) => expiry <= now + Duration::seconds(EXPIRY_SKEW_SECS),
        }
    }

    /// The current access token, if one is stored.
    pub fn access_token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Talks to Google's OAuth token endpoint.
#[derive(Debug, Clone)]
pub struct GoogleAuth {
    http: reqwest::Client,
}

impl GoogleAuth {
    pub fn new() -> Result<Self, ApiError> {
        Ok(Self {
            http: http_client()?,
        })
    }

    /// Trades a consent-page authorization code for stored credentials.
    pub async fn exchange_code(
        &self,
        secret: &InstalledClientSecret,
        code: &str,
    ) -> Result<AuthorizedUser, ApiError> {
        let response = self
            .http
            .post(&secret.token_uri)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", secret.client_id.as_str()),
                ("client_secret", secret.client_secret.as_str()),
                ("redirect_uri", LOOPBACK_REDIRECT_URI),
            ])
            .send()
            .await?;
        let token: TokenResponse = read_json(response).await?;
        let refresh_token = token.refresh_token.ok_or_else(|| {
            ApiError::InvalidResponse("token response has no refresh_token".to_string())
        })?;

        Ok(AuthorizedUser {
            client_id: secret.client_id.clone(),
            client_secret: secret.client_secret.clone(),
            refresh_token,
            expiry: token.expires_in.map(|secs| Utc::now() + Duration::seconds(secs)),
            token: Some(token.access_token),
            token_uri: secret.token_uri.clone(),
        })
    }

    /// Refreshes the access token when needed.
    ///
    /// Returns whether `user` was updated and should be saved.
    pub async fn ensure_fresh(&self, user: &mut AuthorizedUser) -> Result<bool, ApiError> {
        if !user.needs_refresh(Utc::now()) {
            return Ok(false);
        }

        let response = self
            .http
            .post(&user.token_uri)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", user.refresh_token.as_str()),
                ("client_id", user.client_id.as_str()),
                ("client_secret", user.client_secret.as_str()),
            ])
            .send()
            .await?;
        let token: TokenResponse = read_json(response).await?;
        tracing::debug!(expires_in = ?token.expires_in, "refreshed Google access token");

        user.token = Some(token.access_token);
        user.expiry = token
            .expires_in
            .map(|secs| Utc::now() + Duration::seconds(secs));
        if let Some(refresh_token) = token.refresh_token {
            user.refresh_token = refresh_token;
        }
        Ok(true)
    }
}
