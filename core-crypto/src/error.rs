use thiserror::Error;

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("No encryption secret configured; refusing to derive a key")]
    MissingSecret,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Invalid payload for decryption: {0}")]
    InvalidPayload(String),

    #[error("Ciphertext authentication failed")]
    AuthenticationFailure,
}

pub type Result<T> = std::result::Result<T, CryptoError>;
