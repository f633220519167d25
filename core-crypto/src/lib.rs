//! # Credential Cipher
//!
//! Authenticated encryption for OAuth token material at rest.
//!
//! ## Overview
//!
//! Token bundles are serialized to JSON and sealed with AES-256-GCM before
//! they enter session storage; only the resulting [`EncryptedEnvelope`]
//! (nonce, ciphertext, and tag as hex) ever crosses that boundary. The
//! 256-bit key is derived once at startup from the configured secret with
//! scrypt and a fixed application salt.
//!
//! ## Failure behavior
//!
//! Decryption fails closed. A structurally broken envelope is rejected as
//! [`CryptoError::InvalidPayload`]; an envelope whose tag does not verify
//! (tampering, or a key rotated out from under it) is rejected as
//! [`CryptoError::AuthenticationFailure`]. Partial plaintext is never
//! returned.

pub mod cipher;
pub mod envelope;
pub mod error;

pub use cipher::CredentialCipher;
pub use envelope::EncryptedEnvelope;
pub use error::{CryptoError, Result};
