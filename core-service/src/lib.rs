//! # Service façade
//!
//! Wires the OAuth adapter, the credential cipher, the session store, and
//! the Drive provider into the entry points a transport layer calls:
//! authentication callback, session status, logout, upload, and the file
//! pass-throughs. The transport owns routing, cookies, and response
//! serialization; everything behind that line lives here.

pub mod error;
pub mod gate;
pub mod upload;

pub use error::{Result, ServiceError};
pub use gate::AuthGate;

use bridge_traits::http::HttpClient;
use bridge_traits::storage::{FileInfo, StorageFactory, UploadResult};
use chrono::{DateTime, Duration, Utc};
use core_auth::{GoogleOAuthClient, OAuthConfig, UserProfile};
use core_crypto::CredentialCipher;
use core_runtime::ServiceConfig;
use core_session::{CookieSettings, SessionBinding, SessionId, SessionStore};
use provider_google_drive::DriveStorageFactory;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

/// Default page size for file listings.
const DEFAULT_LIST_PAGE_SIZE: u32 = 10;

/// An incoming upload as the transport hands it over: a declared name, an
/// optional declared MIME type, and the base64 (or data-URL) payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadRequest {
    pub filename: String,
    pub mime_type: Option<String>,
    pub data: String,
}

/// Snapshot of an authenticated session for the status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub user: UserProfile,
    pub login_time: DateTime<Utc>,
    /// Time since login, formatted for display
    pub duration: String,
}

/// Primary façade exposed to transport layers.
#[derive(Clone)]
pub struct GalleryService {
    config: ServiceConfig,
    oauth: Arc<GoogleOAuthClient>,
    binding: SessionBinding,
    gate: AuthGate,
    storage: Arc<dyn StorageFactory>,
}

impl GalleryService {
    /// Construct the service with production wiring: Google endpoints and
    /// the Drive storage factory over the given HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Init`] when the credential cipher cannot be
    /// constructed from the configured session secret. Key derivation
    /// happens here, once, never per request.
    pub fn new(config: ServiceConfig, http_client: Arc<dyn HttpClient>) -> Result<Self> {
        let oauth_config = OAuthConfig::google(
            config.google_client_id.clone(),
            config.google_client_secret.clone(),
            config.redirect_uri.clone(),
        );
        let storage = Arc::new(DriveStorageFactory::new(http_client.clone()));
        Self::with_collaborators(config, oauth_config, http_client, storage)
    }

    /// Construct the service with explicit collaborators. Tests use this to
    /// point the OAuth adapter at stub endpoints or substitute a fake
    /// storage factory.
    pub fn with_collaborators(
        config: ServiceConfig,
        oauth_config: OAuthConfig,
        http_client: Arc<dyn HttpClient>,
        storage: Arc<dyn StorageFactory>,
    ) -> Result<Self> {
        let cipher = CredentialCipher::new(&config.session_secret)
            .map_err(|e| ServiceError::Init(e.to_string()))?;

        let store = Arc::new(SessionStore::with_ttl(Duration::hours(
            config.session_ttl_hours,
        )));
        let binding = SessionBinding::new(store, Arc::new(cipher));

        let oauth = Arc::new(GoogleOAuthClient::new(oauth_config, http_client));
        let gate = AuthGate::new(binding.clone(), oauth.clone());

        Ok(Self {
            config,
            oauth,
            binding,
            gate,
            storage,
        })
    }

    /// The consent URL unauthenticated users are sent to.
    pub fn authorization_url(&self) -> Result<String> {
        Ok(self.oauth.authorization_url()?)
    }

    /// Create an empty session for a first-contact request. The transport
    /// delivers the returned id in the session cookie.
    pub async fn begin_session(&self) -> SessionId {
        self.binding.store().create().await
    }

    /// Cookie parameters matching the configured session lifetime.
    pub fn cookie_settings(&self) -> CookieSettings {
        CookieSettings {
            max_age: Duration::hours(self.config.session_ttl_hours),
            ..CookieSettings::default()
        }
    }

    /// The per-request guard, usable by any protected route.
    pub fn gate(&self) -> &AuthGate {
        &self.gate
    }

    /// Complete the OAuth flow for a session.
    ///
    /// Exchanges the authorization code, fetches the user's profile with the
    /// fresh access token, and initializes the session, in that order, each
    /// step feeding the next. Mutates only session state; failures surface
    /// as the corresponding lifecycle stage and leave the session
    /// unauthenticated.
    #[instrument(skip(self, code))]
    pub async fn handle_callback(&self, session_id: SessionId, code: &str) -> Result<()> {
        let tokens = self.oauth.exchange_code(code).await?;
        let user = self.oauth.fetch_user_profile(&tokens).await?;

        info!(session_id = %session_id, user_id = %user.id, "User authenticated");
        self.binding.initialize(session_id, &tokens, user).await?;

        Ok(())
    }

    /// Report an authenticated session's identity and age.
    ///
    /// Runs the gate first, so a session the provider no longer vouches for
    /// is destroyed and reported expired here just like on any other
    /// protected route.
    pub async fn session_status(&self, session_id: SessionId) -> Result<SessionStatus> {
        self.gate.check(session_id).await?;

        let session = self
            .binding
            .store()
            .get(session_id)
            .await
            .ok_or(ServiceError::Unauthenticated)?;

        // The gate passed, so the invariant holds; re-check rather than trust
        let (user, login_time) = match (session.user, session.login_time) {
            (Some(user), Some(login_time)) => (user, login_time),
            _ => return Err(ServiceError::Unauthenticated),
        };

        Ok(SessionStatus {
            user,
            login_time,
            duration: upload::format_duration(Utc::now() - login_time),
        })
    }

    /// Destroy a session. Idempotent; an unknown session is a no-op.
    pub async fn logout(&self, session_id: SessionId) {
        self.binding.destroy(session_id).await;
    }

    /// Validate, name, and persist an image, returning its public links.
    ///
    /// Preconditions are enforced before any storage call: the declared (or
    /// data-URL-embedded) MIME type must be on the image allow-list and the
    /// decoded payload must fit the configured cap. The storage side is two
    /// calls treated as one logical operation: create, then grant public
    /// read. When the grant fails after creation the error propagates; the
    /// object may exist without being public, and no compensating delete is
    /// attempted.
    #[instrument(skip(self, request), fields(filename = %request.filename))]
    pub async fn upload(
        &self,
        session_id: SessionId,
        request: UploadRequest,
    ) -> Result<UploadResult> {
        let tokens = self.gate.check(session_id).await?;

        let payload = upload::decode_base64_payload(&request.data)?;
        let mime_type = request
            .mime_type
            .or(payload.mime_type)
            .filter(|m| upload::is_valid_image(m))
            .ok_or_else(|| {
                ServiceError::Validation(
                    "file type not allowed; accepted types are JPEG, PNG, GIF, WebP, and SVG"
                        .to_string(),
                )
            })?;

        upload::check_size(payload.bytes.len(), self.config.max_upload_bytes)?;

        let file_name = upload::generate_file_name(&request.filename);

        let storage = self.storage.for_token(&tokens.access_token);
        let result = storage
            .create(
                payload.bytes.into(),
                &file_name,
                &mime_type,
                self.config.drive_folder_id.as_deref(),
            )
            .await?;
        storage.set_public_read_permission(&result.file_id).await?;

        info!(file_id = %result.file_id, "Upload complete");
        Ok(result)
    }

    /// Fetch metadata for one stored file.
    pub async fn get_file(&self, session_id: SessionId, file_id: &str) -> Result<FileInfo> {
        let tokens = self.gate.check(session_id).await?;
        let storage = self.storage.for_token(&tokens.access_token);
        Ok(storage.get(file_id).await?)
    }

    /// List stored files, newest first.
    pub async fn list_files(
        &self,
        session_id: SessionId,
        limit: Option<u32>,
    ) -> Result<Vec<FileInfo>> {
        let tokens = self.gate.check(session_id).await?;
        let storage = self.storage.for_token(&tokens.access_token);
        Ok(storage
            .list(limit.unwrap_or(DEFAULT_LIST_PAGE_SIZE))
            .await?)
    }

    /// Delete a stored file.
    pub async fn delete_file(&self, session_id: SessionId, file_id: &str) -> Result<bool> {
        let tokens = self.gate.check(session_id).await?;
        let storage = self.storage.for_token(&tokens.access_token);
        Ok(storage.delete(file_id).await?)
    }
}
