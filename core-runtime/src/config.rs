//! # Service Configuration
//!
//! Configuration for the upload service core.
//!
//! ## Overview
//!
//! `ServiceConfig` is built through a builder that enforces fail-fast
//! validation: every credential the OAuth flow and the credential cipher
//! need must be present before the service starts. A deployment missing its
//! session encryption secret refuses to boot instead of degrading to a
//! well-known key.
//!
//! ## Usage
//!
//! ```
//! use core_runtime::config::ServiceConfig;
//!
//! let config = ServiceConfig::builder()
//!     .google_client_id("client-id.apps.googleusercontent.com")
//!     .google_client_secret("client-secret")
//!     .redirect_uri("http://localhost:3333/auth/google/callback")
//!     .session_secret("a long random string")
//!     .build()
//!     .expect("Failed to build config");
//!
//! assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
//! ```
//!
//! In deployments, `ServiceConfig::from_env()` reads the same values from
//! the environment (`GOOGLE_CLIENT_ID`, `GOOGLE_CLIENT_SECRET`,
//! `GOOGLE_REDIRECT_URI`, `GOOGLE_DRIVE_FOLDER_ID`, `SESSION_SECRET`).

use crate::error::{Error, Result};

/// Default maximum upload size: 10 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Default absolute session lifetime in hours
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

/// Service configuration.
///
/// Use [`ServiceConfig::builder`] to construct instances.
#[derive(Clone)]
pub struct ServiceConfig {
    /// Google OAuth client ID
    pub google_client_id: String,

    /// Google OAuth client secret
    pub google_client_secret: String,

    /// OAuth callback URI registered with Google
    pub redirect_uri: String,

    /// Drive folder uploads land under; `None` uploads to the Drive root
    pub drive_folder_id: Option<String>,

    /// Secret the credential cipher derives its key from
    pub session_secret: String,

    /// Absolute session lifetime in hours
    pub session_ttl_hours: i64,

    /// Maximum accepted upload payload size in bytes
    pub max_upload_bytes: usize,
}

impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("google_client_id", &self.google_client_id)
            .field("google_client_secret", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .field("drive_folder_id", &self.drive_folder_id)
            .field("session_secret", &"[REDACTED]")
            .field("session_ttl_hours", &self.session_ttl_hours)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

impl ServiceConfig {
    /// Creates a new builder for constructing a `ServiceConfig`.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::default()
    }

    /// Load configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error naming the first missing or invalid
    /// variable.
    pub fn from_env() -> Result<Self> {
        let mut builder = Self::builder()
            .google_client_id(env_var("GOOGLE_CLIENT_ID")?)
            .google_client_secret(env_var("GOOGLE_CLIENT_SECRET")?)
            .redirect_uri(env_var("GOOGLE_REDIRECT_URI")?)
            .session_secret(env_var("SESSION_SECRET")?);

        if let Ok(folder_id) = std::env::var("GOOGLE_DRIVE_FOLDER_ID") {
            if !folder_id.is_empty() {
                builder = builder.drive_folder_id(folder_id);
            }
        }

        builder.build()
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.google_client_id.is_empty() {
            return Err(Error::Config(
                "Google client ID cannot be empty".to_string(),
            ));
        }

        if self.google_client_secret.is_empty() {
            return Err(Error::Config(
                "Google client secret cannot be empty".to_string(),
            ));
        }

        if self.redirect_uri.is_empty() {
            return Err(Error::Config("Redirect URI cannot be empty".to_string()));
        }

        if self.session_secret.is_empty() {
            return Err(Error::Config(
                "Session secret is required. Set SESSION_SECRET or use \
                 .session_secret(); the service refuses to fall back to a \
                 well-known encryption key."
                    .to_string(),
            ));
        }

        if self.session_ttl_hours <= 0 {
            return Err(Error::Config(
                "Session lifetime must be greater than 0 hours".to_string(),
            ));
        }

        if self.max_upload_bytes == 0 {
            return Err(Error::Config(
                "Maximum upload size must be greater than 0 bytes".to_string(),
            ));
        }

        Ok(())
    }
}

fn env_var(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| Error::Config(format!("Environment variable {} is not set", name)))
}

/// Builder for constructing [`ServiceConfig`] instances.
#[derive(Default)]
pub struct ServiceConfigBuilder {
    google_client_id: Option<String>,
    google_client_secret: Option<String>,
    redirect_uri: Option<String>,
    drive_folder_id: Option<String>,
    session_secret: Option<String>,
    session_ttl_hours: Option<i64>,
    max_upload_bytes: Option<usize>,
}

impl ServiceConfigBuilder {
    pub fn google_client_id(mut self, id: impl Into<String>) -> Self {
        self.google_client_id = Some(id.into());
        self
    }

    pub fn google_client_secret(mut self, secret: impl Into<String>) -> Self {
        self.google_client_secret = Some(secret.into());
        self
    }

    pub fn redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(uri.into());
        self
    }

    /// Parent folder uploads land under. Optional; defaults to the Drive
    /// root.
    pub fn drive_folder_id(mut self, id: impl Into<String>) -> Self {
        self.drive_folder_id = Some(id.into());
        self
    }

    pub fn session_secret(mut self, secret: impl Into<String>) -> Self {
        self.session_secret = Some(secret.into());
        self
    }

    /// Absolute session lifetime. Default: 24 hours.
    pub fn session_ttl_hours(mut self, hours: i64) -> Self {
        self.session_ttl_hours = Some(hours);
        self
    }

    /// Maximum accepted payload size. Default: 10 MiB.
    pub fn max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = Some(bytes);
        self
    }

    /// Builds the final `ServiceConfig` instance.
    ///
    /// Validates required values and returns an actionable error when
    /// anything is missing.
    pub fn build(self) -> Result<ServiceConfig> {
        let config = ServiceConfig {
            google_client_id: self.google_client_id.ok_or_else(|| {
                Error::Config(
                    "Google client ID is required. Use .google_client_id() to set it.".to_string(),
                )
            })?,
            google_client_secret: self.google_client_secret.ok_or_else(|| {
                Error::Config(
                    "Google client secret is required. Use .google_client_secret() to set it."
                        .to_string(),
                )
            })?,
            redirect_uri: self.redirect_uri.ok_or_else(|| {
                Error::Config("Redirect URI is required. Use .redirect_uri() to set it.".to_string())
            })?,
            drive_folder_id: self.drive_folder_id,
            session_secret: self.session_secret.ok_or_else(|| {
                Error::Config(
                    "Session secret is required. Use .session_secret() to set it; the service \
                     refuses to fall back to a well-known encryption key."
                        .to_string(),
                )
            })?,
            session_ttl_hours: self.session_ttl_hours.unwrap_or(DEFAULT_SESSION_TTL_HOURS),
            max_upload_bytes: self.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
        };

        config.validate()?;

        Ok(config)
    }
}
