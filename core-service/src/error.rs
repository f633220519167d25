use thiserror::Error;

/// Failure taxonomy surfaced at the service boundary.
///
/// Every variant maps to a stable discriminator via [`ServiceError::code`]
/// so transports can branch without matching on message text, and to an
/// HTTP-equivalent status via [`ServiceError::status_code`].
#[derive(Error, Debug)]
pub enum ServiceError {
    /// No session, no credentials, or credentials that failed decryption
    #[error("Authentication required")]
    Unauthenticated,

    /// Credentials present but rejected by the provider; the session has
    /// been destroyed as a side effect
    #[error("Session expired; authenticate again")]
    SessionExpired,

    /// Disallowed MIME type, oversize payload, or undecodable payload
    #[error("Invalid upload payload: {0}")]
    Validation(String),

    /// The storage collaborator rejected create/permission/get/list/delete
    #[error("Storage operation failed: {0}")]
    Storage(#[from] bridge_traits::BridgeError),

    /// Provider-side OAuth failure (code exchange, profile fetch, refresh)
    #[error(transparent)]
    Auth(#[from] core_auth::AuthError),

    /// Service wiring failed at construction
    #[error("Service initialization failed: {0}")]
    Init(String),

    /// Session persistence failed outside the authentication path
    #[error(transparent)]
    Session(#[from] core_session::SessionError),
}

impl ServiceError {
    /// Stable machine-readable discriminator.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Unauthenticated => "unauthenticated",
            ServiceError::SessionExpired => "session_expired",
            ServiceError::Validation(_) => "validation",
            ServiceError::Storage(_) => "storage",
            ServiceError::Auth(_) => "auth",
            ServiceError::Init(_) => "init",
            ServiceError::Session(_) => "session",
        }
    }

    /// HTTP-equivalent status for transports that speak it.
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::Unauthenticated | ServiceError::SessionExpired => 401,
            ServiceError::Validation(_) => 400,
            ServiceError::Storage(_)
            | ServiceError::Auth(_)
            | ServiceError::Init(_)
            | ServiceError::Session(_) => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
