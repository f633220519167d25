use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Crypto(#[from] core_crypto::CryptoError),

    #[error("Failed to serialize session credentials: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, SessionError>;
