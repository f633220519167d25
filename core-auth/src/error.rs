use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Authorization code exchange failed: {0}")]
    TokenExchangeFailed(String),

    #[error("User profile fetch failed: {0}")]
    ProfileFetchFailed(String),

    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    #[error("Invalid OAuth endpoint URL: {0}")]
    InvalidEndpoint(String),

    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(String),
}

pub type Result<T> = std::result::Result<T, AuthError>;
