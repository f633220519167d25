//! Couples the session store to the credential cipher
//!
//! The binding enforces the at-rest invariant: token bundles are serialized
//! and sealed before they are written, and only decrypted on demand for a
//! protected request. The store itself never sees plaintext credentials.

use crate::error::{Result, SessionError};
use crate::session::{Session, SessionId};
use crate::store::SessionStore;
use chrono::Utc;
use core_auth::{TokenBundle, UserProfile};
use core_crypto::CredentialCipher;
use std::sync::Arc;
use tracing::{info, instrument};

/// Session-credential binding.
#[derive(Clone)]
pub struct SessionBinding {
    store: Arc<SessionStore>,
    cipher: Arc<CredentialCipher>,
}

impl SessionBinding {
    pub fn new(store: Arc<SessionStore>, cipher: Arc<CredentialCipher>) -> Self {
        Self { store, cipher }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Mark a session authenticated after a successful code exchange.
    ///
    /// Seals the bundle into an encrypted envelope, records the user profile
    /// and sets `login_time = now`.
    #[instrument(skip(self, tokens, user))]
    pub async fn initialize(
        &self,
        id: SessionId,
        tokens: &TokenBundle,
        user: UserProfile,
    ) -> Result<()> {
        let plaintext = serde_json::to_string(tokens)
            .map_err(|e| SessionError::Serialization(e.to_string()))?;
        let envelope = self.cipher.encrypt(&plaintext)?;

        let session = Session {
            authenticated: true,
            tokens: Some(envelope),
            user: Some(user),
            login_time: Some(Utc::now()),
        };
        self.store.put(id, session).await;

        info!(session_id = %id, "Session authenticated");
        Ok(())
    }

    /// Decrypt the stored credentials for a session.
    ///
    /// Returns `Ok(None)` for an absent or unauthenticated session. A
    /// decryption failure (tampered envelope, rotated key) propagates so the
    /// caller can treat the session as foreign.
    pub async fn current_credentials(&self, id: SessionId) -> Result<Option<TokenBundle>> {
        let Some(session) = self.store.get(id).await else {
            return Ok(None);
        };
        if !session.authenticated {
            return Ok(None);
        }
        let Some(envelope) = session.tokens else {
            return Ok(None);
        };

        let plaintext = self.cipher.decrypt(&envelope)?;
        let bundle: TokenBundle = serde_json::from_str(&plaintext)
            .map_err(|e| SessionError::Serialization(e.to_string()))?;

        Ok(Some(bundle))
    }

    /// Invalidate a session immediately; subsequent requests with the same
    /// cookie read as unauthenticated.
    pub async fn destroy(&self, id: SessionId) {
        self.store.destroy(id).await;
    }
}
