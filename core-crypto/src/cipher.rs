//! Credential cipher: scrypt key derivation + AES-256-GCM envelopes

use crate::envelope::EncryptedEnvelope;
use crate::error::{CryptoError, Result};
use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use scrypt::Params;
use std::fmt;

/// Nonce length for GCM (96 bits)
const IV_LENGTH: usize = 12;

/// GCM authentication tag length (128 bits)
const TAG_LENGTH: usize = 16;

/// Application salt for key derivation. Fixed so the same secret always
/// yields the same key across process restarts.
const KEY_SALT: &[u8] = b"salt";

/// Authenticated cipher for token material headed into session storage.
///
/// The key is derived once at construction with scrypt (N=2^14, r=8, p=1,
/// 32-byte output) from the configured secret. Construction is the only
/// CPU-heavy step; per-call encrypt/decrypt is cheap.
///
/// # Security
///
/// - A fresh random 96-bit nonce is generated per `encrypt` call and never
///   reused with the same key.
/// - `decrypt` fails closed: a malformed envelope or an unverifiable tag
///   yields an error, never partial plaintext.
/// - A missing secret refuses construction instead of degrading to a
///   well-known key.
pub struct CredentialCipher {
    cipher: Aes256Gcm,
}

impl CredentialCipher {
    /// Derive a key from `secret` and build the cipher.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::MissingSecret`] when `secret` is empty and
    /// [`CryptoError::KeyDerivationFailed`] when scrypt rejects its
    /// parameters or output length.
    pub fn new(secret: &str) -> Result<Self> {
        if secret.is_empty() {
            return Err(CryptoError::MissingSecret);
        }

        let params = Params::new(14, 8, 1, 32)
            .map_err(|e| CryptoError::KeyDerivationFailed(e.to_string()))?;

        let mut key_bytes = [0u8; 32];
        scrypt::scrypt(secret.as_bytes(), KEY_SALT, &params, &mut key_bytes)
            .map_err(|e| CryptoError::KeyDerivationFailed(e.to_string()))?;

        Ok(Self::from_key_bytes(key_bytes))
    }

    /// Build a cipher over the all-zero key.
    ///
    /// Exists only for test and development parity with deployments that
    /// predate mandatory secrets. Nothing selects this implicitly; callers
    /// reaching for it in production code should configure a secret instead.
    pub fn insecure_zero_key() -> Self {
        tracing::warn!("CredentialCipher constructed with the insecure all-zero key");
        Self::from_key_bytes([0u8; 32])
    }

    fn from_key_bytes(key_bytes: [u8; 32]) -> Self {
        let key = Key::<Aes256Gcm>::from_slice(&key_bytes);
        Self {
            cipher: Aes256Gcm::new(key),
        }
    }

    /// Encrypt `plaintext` into a self-contained envelope.
    pub fn encrypt(&self, plaintext: &str) -> Result<EncryptedEnvelope> {
        let mut nonce_bytes = [0u8; IV_LENGTH];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        // aes-gcm appends the tag to the ciphertext; the envelope keeps them
        // as separate fields.
        let sealed = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

        let split_at = sealed.len() - TAG_LENGTH;
        let (ciphertext, tag) = sealed.split_at(split_at);

        Ok(EncryptedEnvelope {
            iv: hex::encode(nonce_bytes),
            data: hex::encode(ciphertext),
            tag: hex::encode(tag),
        })
    }

    /// Decrypt an envelope back into plaintext.
    ///
    /// # Errors
    ///
    /// - [`CryptoError::InvalidPayload`] when any field is missing, not
    ///   valid hex, or the nonce/tag has the wrong length
    /// - [`CryptoError::AuthenticationFailure`] when the tag does not verify
    ///   (tampered envelope or wrong key)
    pub fn decrypt(&self, envelope: &EncryptedEnvelope) -> Result<String> {
        if !envelope.is_complete() {
            return Err(CryptoError::InvalidPayload(
                "envelope is missing iv, data, or tag".to_string(),
            ));
        }

        let iv = hex::decode(&envelope.iv)
            .map_err(|e| CryptoError::InvalidPayload(format!("iv is not valid hex: {}", e)))?;
        let data = hex::decode(&envelope.data)
            .map_err(|e| CryptoError::InvalidPayload(format!("data is not valid hex: {}", e)))?;
        let tag = hex::decode(&envelope.tag)
            .map_err(|e| CryptoError::InvalidPayload(format!("tag is not valid hex: {}", e)))?;

        if iv.len() != IV_LENGTH {
            return Err(CryptoError::InvalidPayload(format!(
                "iv must be {} bytes, got {}",
                IV_LENGTH,
                iv.len()
            )));
        }
        if tag.len() != TAG_LENGTH {
            return Err(CryptoError::InvalidPayload(format!(
                "tag must be {} bytes, got {}",
                TAG_LENGTH,
                tag.len()
            )));
        }

        let nonce = Nonce::from_slice(&iv);
        let mut sealed = data;
        sealed.extend_from_slice(&tag);

        let plaintext = self
            .cipher
            .decrypt(nonce, sealed.as_ref())
            .map_err(|_| CryptoError::AuthenticationFailure)?;

        String::from_utf8(plaintext)
            .map_err(|e| CryptoError::InvalidPayload(format!("plaintext is not UTF-8: {}", e)))
    }
}

// Never expose key material through Debug
impl fmt::Debug for CredentialCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialCipher")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher() -> CredentialCipher {
        CredentialCipher::new("test-secret").unwrap()
    }

    /// Flip one bit inside a hex field, keeping it valid hex.
    fn flip_bit(hex_field: &mut String) {
        let mut bytes = hex::decode(hex_field.as_str()).unwrap();
        bytes[0] ^= 0x01;
        *hex_field = hex::encode(bytes);
    }

    #[test]
    fn test_missing_secret_refused() {
        let result = CredentialCipher::new("");
        assert!(matches!(result, Err(CryptoError::MissingSecret)));
    }

    #[test]
    fn test_round_trip() {
        let cipher = cipher();
        let plaintext = r#"{"access_token":"ya29.a0...","token_type":"Bearer"}"#;

        let envelope = cipher.encrypt(plaintext).unwrap();
        let decrypted = cipher.decrypt(&envelope).unwrap();

        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_same_secret_same_key() {
        let a = CredentialCipher::new("shared").unwrap();
        let b = CredentialCipher::new("shared").unwrap();

        let envelope = a.encrypt("payload").unwrap();
        assert_eq!(b.decrypt(&envelope).unwrap(), "payload");
    }

    #[test]
    fn test_nonce_uniqueness() {
        let cipher = cipher();

        let first = cipher.encrypt("same message").unwrap();
        let second = cipher.encrypt("same message").unwrap();

        assert_ne!(first.iv, second.iv);
        assert_ne!(first.data, second.data);
    }

    #[test]
    fn test_tampered_ciphertext_rejected() {
        let cipher = cipher();
        let mut envelope = cipher.encrypt("secret payload").unwrap();
        flip_bit(&mut envelope.data);

        let result = cipher.decrypt(&envelope);
        assert!(matches!(result, Err(CryptoError::AuthenticationFailure)));
    }

    #[test]
    fn test_tampered_tag_rejected() {
        let cipher = cipher();
        let mut envelope = cipher.encrypt("secret payload").unwrap();
        flip_bit(&mut envelope.tag);

        let result = cipher.decrypt(&envelope);
        assert!(matches!(result, Err(CryptoError::AuthenticationFailure)));
    }

    #[test]
    fn test_tampered_iv_rejected() {
        let cipher = cipher();
        let mut envelope = cipher.encrypt("secret payload").unwrap();
        flip_bit(&mut envelope.iv);

        let result = cipher.decrypt(&envelope);
        assert!(matches!(result, Err(CryptoError::AuthenticationFailure)));
    }

    #[test]
    fn test_missing_fields_rejected() {
        let cipher = cipher();
        let envelope = cipher.encrypt("payload").unwrap();

        for strip in 0..3 {
            let mut incomplete = envelope.clone();
            match strip {
                0 => incomplete.iv.clear(),
                1 => incomplete.data.clear(),
                _ => incomplete.tag.clear(),
            }
            let result = cipher.decrypt(&incomplete);
            assert!(matches!(result, Err(CryptoError::InvalidPayload(_))));
        }
    }

    #[test]
    fn test_non_hex_field_rejected() {
        let cipher = cipher();
        let mut envelope = cipher.encrypt("payload").unwrap();
        envelope.iv = "not hex at all".to_string();

        let result = cipher.decrypt(&envelope);
        assert!(matches!(result, Err(CryptoError::InvalidPayload(_))));
    }

    #[test]
    fn test_wrong_length_iv_rejected() {
        let cipher = cipher();
        let mut envelope = cipher.encrypt("payload").unwrap();
        envelope.iv = "0a0b".to_string();

        let result = cipher.decrypt(&envelope);
        assert!(matches!(result, Err(CryptoError::InvalidPayload(_))));
    }

    #[test]
    fn test_wrong_key_rejected() {
        let envelope = CredentialCipher::new("key-one").unwrap().encrypt("payload").unwrap();

        let result = CredentialCipher::new("key-two").unwrap().decrypt(&envelope);
        assert!(matches!(result, Err(CryptoError::AuthenticationFailure)));
    }

    #[test]
    fn test_zero_key_cipher_round_trips() {
        let cipher = CredentialCipher::insecure_zero_key();
        let envelope = cipher.encrypt("dev payload").unwrap();
        assert_eq!(cipher.decrypt(&envelope).unwrap(), "dev payload");
    }

    #[test]
    fn test_debug_redacts_key() {
        let debug_str = format!("{:?}", cipher());
        assert!(debug_str.contains("REDACTED"));
    }
}
