//! Authentication gate
//!
//! The per-request guard run before every protected operation. The gate
//! fails toward re-authentication: any doubt about the session's
//! credentials ends the request with a 401-equivalent, and a provider
//! rejection destroys the session so stale credentials are never carried
//! forward.

use crate::error::ServiceError;
use core_auth::{GoogleOAuthClient, TokenBundle};
use core_session::{SessionBinding, SessionId};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Request-time authentication guard.
///
/// # Algorithm
///
/// 1. No session, `authenticated = false`, or no token envelope →
///    [`ServiceError::Unauthenticated`].
/// 2. Envelope fails decryption (tampered, foreign key, corrupt) →
///    [`ServiceError::Unauthenticated`]. The caller cannot distinguish
///    tamper from bug; neither detail crosses the boundary.
/// 3. The provider reports the token invalid → destroy the session, then
///    [`ServiceError::SessionExpired`].
/// 4. Otherwise the decrypted bundle is released to the protected
///    operation.
///
/// The check is synchronous per request; there is no background refresh. A
/// token the provider currently reports valid passes even if it expires
/// moments later; expiry prediction is not performed locally.
#[derive(Clone)]
pub struct AuthGate {
    binding: SessionBinding,
    oauth: Arc<GoogleOAuthClient>,
}

impl AuthGate {
    pub fn new(binding: SessionBinding, oauth: Arc<GoogleOAuthClient>) -> Self {
        Self { binding, oauth }
    }

    /// Run the gate for a session, yielding the caller's credentials when
    /// the operation may proceed.
    #[instrument(skip(self))]
    pub async fn check(&self, session_id: SessionId) -> Result<TokenBundle, ServiceError> {
        let tokens = match self.binding.current_credentials(session_id).await {
            Ok(Some(tokens)) => tokens,
            Ok(None) => {
                debug!(session_id = %session_id, "No authenticated session");
                return Err(ServiceError::Unauthenticated);
            }
            Err(e) => {
                // Corrupted or foreign session; reject without detail
                warn!(session_id = %session_id, error = %e, "Session credentials failed decryption");
                return Err(ServiceError::Unauthenticated);
            }
        };

        if !self.oauth.validate(&tokens).await {
            warn!(session_id = %session_id, "Provider rejected session credentials; destroying session");
            self.binding.destroy(session_id).await;
            return Err(ServiceError::SessionExpired);
        }

        Ok(tokens)
    }
}
