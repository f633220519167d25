//! At-rest envelope for encrypted secrets

use serde::{Deserialize, Serialize};

/// Opaque-at-rest form of an encrypted secret.
///
/// All three fields are lowercase hex strings. A field that deserialized as
/// empty (absent in the source document) is treated as missing and rejected
/// at decryption time, never silently tolerated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedEnvelope {
    /// 96-bit nonce, unique per encryption
    #[serde(default)]
    pub iv: String,
    /// Ciphertext
    #[serde(default)]
    pub data: String,
    /// 128-bit GCM authentication tag
    #[serde(default)]
    pub tag: String,
}

impl EncryptedEnvelope {
    /// True when every field carries a value. Decryption rejects envelopes
    /// failing this check with `InvalidPayload` before touching the cipher.
    pub fn is_complete(&self) -> bool {
        !self.iv.is_empty() && !self.data.is_empty() && !self.tag.is_empty()
    }
}
