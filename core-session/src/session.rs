use chrono::{DateTime, Duration, Utc};
use core_auth::UserProfile;
use core_crypto::EncryptedEnvelope;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque identifier carried by the session cookie.
///
/// # Examples
///
/// ```
/// use core_session::SessionId;
///
/// let id = SessionId::new();
/// let parsed = SessionId::from_string(&id.to_string()).unwrap();
/// assert_eq!(id, parsed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Mint a new random session ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a session ID from its cookie-value representation
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Server-side session state.
///
/// Token material only ever appears here in its encrypted-envelope form;
/// the raw bundle never crosses into the store.
///
/// Invariant: `authenticated = true` implies `tokens` and `user` are both
/// present. [`Session::is_well_formed`] checks it at the point of use
/// instead of trusting the record implicitly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    /// Whether the callback handler completed a code exchange for this session
    pub authenticated: bool,
    /// Encrypted token bundle
    pub tokens: Option<EncryptedEnvelope>,
    /// Identity fetched at authentication time; immutable for the session
    pub user: Option<UserProfile>,
    /// When the user authenticated
    pub login_time: Option<DateTime<Utc>>,
}

impl Session {
    pub fn is_well_formed(&self) -> bool {
        !self.authenticated || (self.tokens.is_some() && self.user.is_some())
    }
}

/// Cookie delivery parameters the transport layer applies when setting the
/// session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieSettings {
    /// Cookie name
    pub name: String,
    /// Not readable from client-side scripts
    pub http_only: bool,
    /// Cookie path scope
    pub path: String,
    /// Absolute lifetime; matches the server-side session expiry
    pub max_age: Duration,
    /// Only sent over HTTPS
    pub secure: bool,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            name: "sessionId".to_string(),
            http_only: true,
            path: "/".to_string(),
            max_age: Duration::hours(24),
            secure: true,
        }
    }
}
