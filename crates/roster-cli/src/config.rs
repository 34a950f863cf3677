//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use roster_api::ZoomCredentials;
use roster_core::OrgDomain;

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Organization email domain fragment, e.g. `@example.com`.
    #[serde(default)]
    pub org_domain: Option<String>,

    /// Where reports are written when not uploaded.
    pub output_dir: PathBuf,

    #[serde(default)]
    pub zoom: ZoomConfig,

    pub google: GoogleConfig,
}

/// Zoom server-to-server app settings.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ZoomConfig {
    pub account_id: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// User whose hosted meetings are reported on.
    pub admin_email: Option<String>,
}

/// Google OAuth files and the Drive destination.
#[derive(Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    /// OAuth client secret downloaded from the Google console.
    pub client_secret_path: PathBuf,
    /// Stored user token, written by `roster authorize`.
    pub token_path: PathBuf,
    /// Drive folder receiving the reports.
    #[serde(default)]
    pub drive_folder_id: Option<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("org_domain", &self.org_domain)
            .field("output_dir", &self.output_dir)
            .field("zoom", &self.zoom)
            .field("google", &self.google)
            .finish()
    }
}

impl fmt::Debug for ZoomConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZoomConfig")
            .field("account_id", &self.account_id)
            .field("client_id", &self.client_id)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("admin_email", &self.admin_email)
            .finish()
    }
}

impl fmt::Debug for GoogleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleConfig")
            .field("client_secret_path", &self.client_secret_path)
            .field("token_path", &self.token_path)
            .field("drive_folder_id", &self.drive_folder_id)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            org_domain: None,
            output_dir: data_dir.join("reports"),
            zoom: ZoomConfig::default(),
            google: GoogleConfig::default(),
        }
    }
}

impl Default for GoogleConfig {
    fn default() -> Self {
        let config_dir = dirs_config_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            client_secret_path: config_dir.join("client_secret.json"),
            token_path: config_dir.join("token.json"),
            drive_folder_id: None,
        }
    }
}

impl Config {
    /// Loads configuration from the default location, then `config_path`, then
    /// `ROSTER_*` environment variables.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (ROSTER_*, nested keys split on `__`)
        figment = figment.merge(Env::prefixed("ROSTER_").split("__"));

        figment.extract()
    }

    /// The organization domain, with `override_domain` taking precedence.
    pub fn org_domain(&self, override_domain: Option<&str>) -> Result<OrgDomain> {
        let domain = override_domain
            .or(self.org_domain.as_deref())
            .context("organization domain is not configured (set ROSTER_ORG_DOMAIN or org_domain in config.toml)")?;
        OrgDomain::new(domain).context("invalid organization domain")
    }

    /// Zoom app credentials; every field must be set.
    pub fn zoom_credentials(&self) -> Result<ZoomCredentials> {
        Ok(ZoomCredentials {
            account_id: required(self.zoom.account_id.as_deref(), "zoom.account_id")?,
            client_id: required(self.zoom.client_id.as_deref(), "zoom.client_id")?,
            client_secret: required(self.zoom.client_secret.as_deref(), "zoom.client_secret")?,
        })
    }

    /// The Zoom user whose meetings are reported.
    pub fn zoom_admin_email(&self) -> Result<String> {
        required(self.zoom.admin_email.as_deref(), "zoom.admin_email")
    }

    /// The Drive folder receiving uploads.
    pub fn drive_folder_id(&self) -> Result<String> {
        required(self.google.drive_folder_id.as_deref(), "google.drive_folder_id")
    }
}

fn required(value: Option<&str>, key: &str) -> Result<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .with_context(|| format!("missing configuration value: {key}"))
}

/// Returns the platform-specific config directory for roster.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("roster"))
}

/// Returns the platform-specific data directory for roster.
///
/// On Linux: `~/.local/share/roster`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("roster"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirs_data_path_ends_with_roster() {
        let path = dirs_data_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "roster");
    }

    #[test]
    fn test_default_config_writes_reports_to_data_dir() {
        let config = Config::default();
        assert_eq!(config.output_dir, dirs_data_path().unwrap().join("reports"));
        assert!(config.org_domain.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("roster.toml");
        std::fs::write(
            &path,
            r#"
org_domain = "@example.com"
output_dir = "/tmp/reports"

[zoom]
account_id = "acct"
client_id = "cid"
client_secret = "secret"
admin_email = "admin@example.com"

[google]
drive_folder_id = "folder-1"
"#,
        )
        .unwrap();

        let config = Config::load_from(Some(&path)).unwrap();
        assert_eq!(config.org_domain.as_deref(), Some("@example.com"));
        assert_eq!(config.output_dir, PathBuf::from("/tmp/reports"));
        assert_eq!(config.zoom_admin_email().unwrap(), "admin@example.com");
        assert_eq!(config.zoom_credentials().unwrap().client_id, "cid");
        assert_eq!(config.drive_folder_id().unwrap(), "folder-1");
        // Untouched nested keys keep their defaults.
        assert!(config.google.token_path.ends_with("token.json"));
    }

    #[test]
    fn test_org_domain_override_wins() {
        let config = Config {
            org_domain: Some("config.com".to_string()),
            ..Config::default()
        };
        assert_eq!(config.org_domain(Some("cli.com")).unwrap().as_str(), "cli.com");
        assert_eq!(config.org_domain(None).unwrap().as_str(), "config.com");
    }

    #[test]
    fn test_missing_values_are_reported() {
        let config = Config::default();
        let err = config.org_domain(None).unwrap_err();
        assert!(err.to_string().contains("organization domain"));
        let err = config.zoom_credentials().unwrap_err();
        assert!(err.to_string().contains("zoom.account_id"));
        assert!(config.drive_folder_id().is_err());
    }

    #[test]
    fn test_debug_redacts_zoom_secret() {
        let mut config = Config::default();
        config.zoom.client_secret = Some("hunter2".to_string());
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[REDACTED]"));
    }
}
