use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// OAuth 2.0 credential set for one authenticated user.
///
/// Created by [`GoogleOAuthClient::exchange_code`](crate::oauth::GoogleOAuthClient::exchange_code)
/// and replaced wholesale by a refresh; the bundle is what gets sealed into
/// the session's encrypted envelope.
///
/// The `expiry` field is recorded for operators but is never consulted by
/// the authentication gate: the provider's introspection endpoint is the
/// sole source of truth for validity, since only it knows about revocation.
///
/// # Security
///
/// Token values are never logged; the `Debug` implementation redacts them.
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenBundle {
    /// The access token used for API requests
    pub access_token: String,
    /// Refresh token; absent when the provider withheld one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// When the access token expires (UTC), if the provider said
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
    /// Token type, `Bearer` in practice
    pub token_type: String,
    /// Space-separated granted scopes
    pub scope: String,
    /// OpenID Connect ID token, when the scopes requested one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
}

// Custom Debug implementation to avoid logging tokens
impl fmt::Debug for TokenBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenBundle")
            .field("access_token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("expiry", &self.expiry)
            .field("token_type", &self.token_type)
            .field("scope", &self.scope)
            .field("id_token", &self.id_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Minimal identity record fetched from the provider's userinfo endpoint.
///
/// Sourced once at authentication time and treated as immutable for the
/// session's lifetime; it is never refreshed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
}
