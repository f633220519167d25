//! OAuth 2.0 client adapter for Google
//!
//! Mediates the token lifecycle the rest of the service depends on:
//! building the consent URL, exchanging authorization codes for tokens,
//! fetching the user profile, introspecting access tokens, and refreshing
//! them.
//!
//! # Lifecycle
//!
//! Callers should treat token material as cycling through:
//!
//! ```text
//! Unauthenticated -> AuthorizationRequested -> CodeReceived -> TokensIssued
//!     -> {Valid, Expired/Invalid} -> (Refreshed back to TokensIssued | Terminated)
//! ```
//!
//! Validation is explicit and provider-backed: [`GoogleOAuthClient::validate`]
//! asks the tokeninfo endpoint before every protected operation rather than
//! trusting local expiry bookkeeping, because only the provider knows about
//! revocation.
//!
//! # Security
//!
//! - Authorization codes are single-use; `exchange_code` is never retried.
//! - Token values, codes, and provider error bodies are kept out of logs.

use crate::error::{AuthError, Result};
use crate::types::{TokenBundle, UserProfile};
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, RetryPolicy};
use chrono::{Duration, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Google OAuth 2.0 endpoints and client credentials.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    /// OAuth client ID
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// Redirect URI for the OAuth callback
    pub redirect_uri: String,
    /// List of OAuth scopes to request
    pub scopes: Vec<String>,
    /// Authorization endpoint URL
    pub auth_url: String,
    /// Token endpoint URL
    pub token_url: String,
    /// Token introspection endpoint URL
    pub tokeninfo_url: String,
    /// Userinfo endpoint URL
    pub userinfo_url: String,
}

impl OAuthConfig {
    /// Production Google endpoints with the scope set this service needs:
    /// per-file Drive access plus the identity scopes backing the user
    /// profile.
    pub fn google(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            scopes: vec![
                "https://www.googleapis.com/auth/drive.file".to_string(),
                "https://www.googleapis.com/auth/userinfo.profile".to_string(),
                "https://www.googleapis.com/auth/userinfo.email".to_string(),
            ],
            auth_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            tokeninfo_url: "https://oauth2.googleapis.com/tokeninfo".to_string(),
            userinfo_url: "https://www.googleapis.com/oauth2/v2/userinfo".to_string(),
        }
    }
}

/// OAuth 2.0 client adapter.
///
/// All provider traffic goes through the [`HttpClient`] seam so tests can
/// substitute a mock transport.
pub struct GoogleOAuthClient {
    config: OAuthConfig,
    http_client: Arc<dyn HttpClient>,
}

impl GoogleOAuthClient {
    pub fn new(config: OAuthConfig, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            config,
            http_client,
        }
    }

    /// Build the authorization URL the user is sent to for consent.
    ///
    /// Construction is deterministic for a given configuration. The query
    /// requests offline access (so a refresh token is issued) and forces the
    /// consent screen so a refresh token is reliably returned even on repeat
    /// logins.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidEndpoint`] when the configured
    /// authorization URL cannot be parsed.
    #[instrument(skip(self))]
    pub fn authorization_url(&self) -> Result<String> {
        let mut url = Url::parse(&self.config.auth_url)
            .map_err(|e| AuthError::InvalidEndpoint(format!("{}: {}", self.config.auth_url, e)))?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("client_id", &self.config.client_id);
            query.append_pair("redirect_uri", &self.config.redirect_uri);
            query.append_pair("response_type", "code");
            query.append_pair("scope", &self.config.scopes.join(" "));
            query.append_pair("access_type", "offline"); // Request refresh token
            query.append_pair("prompt", "consent"); // Refresh token on repeat logins too
        }

        debug!("Built authorization URL");

        Ok(url.to_string())
    }

    /// Exchange an authorization code for a token bundle.
    ///
    /// One-shot: authorization codes are single-use, so a provider rejection
    /// (expired, already used, mismatched redirect URI) is surfaced as
    /// [`AuthError::TokenExchangeFailed`] and never retried.
    #[instrument(skip(self, code))]
    pub async fn exchange_code(&self, code: &str) -> Result<TokenBundle> {
        let mut params = HashMap::new();
        params.insert("grant_type", "authorization_code");
        params.insert("code", code);
        params.insert("redirect_uri", &self.config.redirect_uri);
        params.insert("client_id", &self.config.client_id);
        params.insert("client_secret", &self.config.client_secret);

        debug!("Exchanging authorization code for tokens");

        let body = serde_urlencoded::to_string(&params)
            .map_err(|e| AuthError::InvalidResponse(format!("Failed to encode token request: {}", e)))?;

        let request = HttpRequest::new(HttpMethod::Post, self.config.token_url.clone()).form(body);

        let response = self
            .http_client
            .execute_with_retry(request, RetryPolicy::none())
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        if !response.is_success() {
            warn!(
                status = response.status,
                "Token endpoint rejected the authorization code"
            );
            return Err(AuthError::TokenExchangeFailed(format!(
                "token endpoint returned {}",
                response.status
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .map_err(|e| AuthError::InvalidResponse(format!("Failed to parse token response: {}", e)))?;

        if token_response.access_token.is_empty() {
            return Err(AuthError::InvalidResponse(
                "token response carried an empty access token".to_string(),
            ));
        }

        info!(
            expires_in = token_response.expires_in,
            has_refresh_token = token_response.refresh_token.is_some(),
            "Exchanged authorization code for tokens"
        );

        Ok(token_response.into_bundle(None))
    }

    /// Fetch the authenticated user's profile with the access token.
    #[instrument(skip(self, tokens))]
    pub async fn fetch_user_profile(&self, tokens: &TokenBundle) -> Result<UserProfile> {
        let request = HttpRequest::new(HttpMethod::Get, self.config.userinfo_url.clone())
            .bearer_token(&tokens.access_token);

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        if !response.is_success() {
            warn!(status = response.status, "Userinfo endpoint rejected the request");
            return Err(AuthError::ProfileFetchFailed(format!(
                "userinfo endpoint returned {}",
                response.status
            )));
        }

        let profile: UserProfile = response.json().map_err(|e| {
            AuthError::InvalidResponse(format!("Failed to parse userinfo response: {}", e))
        })?;

        info!(user_id = %profile.id, "Fetched user profile");

        Ok(profile)
    }

    /// Introspect the access token against the provider.
    ///
    /// Returns `false` on any provider-side rejection and on transport
    /// failure alike: the gate must fail closed, and an unreachable
    /// provider cannot vouch for a token. This method never errors.
    #[instrument(skip(self, tokens))]
    pub async fn validate(&self, tokens: &TokenBundle) -> bool {
        let mut url = match Url::parse(&self.config.tokeninfo_url) {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "Invalid tokeninfo URL; treating token as invalid");
                return false;
            }
        };
        url.query_pairs_mut()
            .append_pair("access_token", &tokens.access_token);

        let request = HttpRequest::new(HttpMethod::Get, url.to_string());

        match self.http_client.execute(request).await {
            Ok(response) => {
                let valid = response.is_success();
                debug!(status = response.status, valid, "Token introspection result");
                valid
            }
            Err(e) => {
                warn!(error = %e, "Token introspection transport failure; treating token as invalid");
                false
            }
        }
    }

    /// Exchange the refresh token for a fresh access token.
    ///
    /// Fails with [`AuthError::RefreshFailed`] when the bundle carries no
    /// refresh token or the provider rejects it; the caller must then force
    /// re-authentication rather than retry. A refresh response that omits
    /// `refresh_token` carries the previous one forward, as Google does.
    #[instrument(skip(self, tokens))]
    pub async fn refresh(&self, tokens: &TokenBundle) -> Result<TokenBundle> {
        let refresh_token = tokens
            .refresh_token
            .as_deref()
            .ok_or_else(|| AuthError::RefreshFailed("no refresh token present".to_string()))?;

        let mut params = HashMap::new();
        params.insert("grant_type", "refresh_token");
        params.insert("refresh_token", refresh_token);
        params.insert("client_id", &self.config.client_id);
        params.insert("client_secret", &self.config.client_secret);

        debug!("Refreshing access token");

        let body = serde_urlencoded::to_string(&params)
            .map_err(|e| AuthError::InvalidResponse(format!("Failed to encode token request: {}", e)))?;

        let request = HttpRequest::new(HttpMethod::Post, self.config.token_url.clone()).form(body);

        let response = self
            .http_client
            .execute_with_retry(request, RetryPolicy::none())
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        if !response.is_success() {
            warn!(status = response.status, "Token endpoint rejected the refresh token");
            return Err(AuthError::RefreshFailed(format!(
                "token endpoint returned {}",
                response.status
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .map_err(|e| AuthError::InvalidResponse(format!("Failed to parse token response: {}", e)))?;

        if token_response.access_token.is_empty() {
            return Err(AuthError::InvalidResponse(
                "token response carried an empty access token".to_string(),
            ));
        }

        info!(
            expires_in = token_response.expires_in,
            "Refreshed access token"
        );

        Ok(token_response.into_bundle(Some(tokens)))
    }
}

/// Token response from the OAuth provider's token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
    token_type: Option<String>,
    scope: Option<String>,
    id_token: Option<String>,
}

fn default_expires_in() -> i64 {
    3600 // Default to 1 hour if not specified
}

impl TokenResponse {
    /// Convert into a [`TokenBundle`], filling fields the provider omitted
    /// from `previous` when this response came from a refresh.
    fn into_bundle(self, previous: Option<&TokenBundle>) -> TokenBundle {
        TokenBundle {
            access_token: self.access_token,
            refresh_token: self
                .refresh_token
                .or_else(|| previous.and_then(|p| p.refresh_token.clone())),
            expiry: Some(Utc::now() + Duration::seconds(self.expires_in)),
            token_type: self.token_type.unwrap_or_else(|| "Bearer".to_string()),
            scope: self
                .scope
                .or_else(|| previous.map(|p| p.scope.clone()))
                .unwrap_or_default(),
            id_token: self
                .id_token
                .or_else(|| previous.and_then(|p| p.id_token.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use bridge_traits::http::HttpResponse;
    use bytes::Bytes;
    use mockall::mock;

    mock! {
        Http {}

        #[async_trait]
        impl HttpClient for Http {
            async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
            async fn execute_with_retry(
                &self,
                request: HttpRequest,
                policy: RetryPolicy,
            ) -> BridgeResult<HttpResponse>;
        }
    }

    fn test_config() -> OAuthConfig {
        OAuthConfig {
            client_id: "test-client".to_string(),
            client_secret: "test-secret".to_string(),
            redirect_uri: "http://localhost:3333/auth/google/callback".to_string(),
            scopes: vec!["scope1".to_string(), "scope2".to_string()],
            auth_url: "https://provider.test/auth".to_string(),
            token_url: "https://provider.test/token".to_string(),
            tokeninfo_url: "https://provider.test/tokeninfo".to_string(),
            userinfo_url: "https://provider.test/userinfo".to_string(),
        }
    }

    fn bundle_with(access: &str, refresh: Option<&str>) -> TokenBundle {
        TokenBundle {
            access_token: access.to_string(),
            refresh_token: refresh.map(|s| s.to_string()),
            expiry: None,
            token_type: "Bearer".to_string(),
            scope: "scope1".to_string(),
            id_token: None,
        }
    }

    fn json_response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::from(body.to_string()),
        }
    }

    #[test]
    fn test_authorization_url_is_deterministic() {
        let client = GoogleOAuthClient::new(test_config(), Arc::new(MockHttp::new()));

        let first = client.authorization_url().unwrap();
        let second = client.authorization_url().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_authorization_url_contents() {
        let client = GoogleOAuthClient::new(test_config(), Arc::new(MockHttp::new()));
        let url = client.authorization_url().unwrap();

        assert!(url.contains("client_id=test-client"));
        assert!(url.contains("redirect_uri=http"));
        assert!(url.contains("response_type=code"));
        // URL encoding can use either + or %20 for spaces - both are valid
        assert!(url.contains("scope=scope1+scope2") || url.contains("scope=scope1%20scope2"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("prompt=consent"));
    }

    #[test]
    fn test_authorization_url_invalid_endpoint() {
        let mut config = test_config();
        config.auth_url = "not a valid url".to_string();
        let client = GoogleOAuthClient::new(config, Arc::new(MockHttp::new()));

        assert!(matches!(
            client.authorization_url(),
            Err(AuthError::InvalidEndpoint(_))
        ));
    }

    #[tokio::test]
    async fn test_exchange_code_success() {
        let mut http = MockHttp::new();
        http.expect_execute_with_retry()
            .times(1)
            .returning(|request, policy| {
                // Single-shot by contract
                assert_eq!(policy.max_attempts, 1);
                assert_eq!(request.method, HttpMethod::Post);
                let body = String::from_utf8(request.body.unwrap().to_vec()).unwrap();
                assert!(body.contains("grant_type=authorization_code"));
                assert!(body.contains("code=abc123"));

                Ok(json_response(
                    200,
                    r#"{
                        "access_token": "ya29.a0...",
                        "refresh_token": "1//0g...",
                        "expires_in": 3599,
                        "token_type": "Bearer",
                        "scope": "scope1 scope2",
                        "id_token": "eyJ..."
                    }"#,
                ))
            });

        let client = GoogleOAuthClient::new(test_config(), Arc::new(http));
        let bundle = client.exchange_code("abc123").await.unwrap();

        assert_eq!(bundle.access_token, "ya29.a0...");
        assert_eq!(bundle.refresh_token.as_deref(), Some("1//0g..."));
        assert_eq!(bundle.token_type, "Bearer");
        assert!(bundle.expiry.is_some());
    }

    #[tokio::test]
    async fn test_exchange_code_provider_rejection() {
        let mut http = MockHttp::new();
        http.expect_execute_with_retry()
            .times(1)
            .returning(|_, _| Ok(json_response(400, r#"{"error": "invalid_grant"}"#)));

        let client = GoogleOAuthClient::new(test_config(), Arc::new(http));
        let result = client.exchange_code("used-code").await;

        assert!(matches!(result, Err(AuthError::TokenExchangeFailed(_))));
    }

    #[tokio::test]
    async fn test_fetch_user_profile_success() {
        let mut http = MockHttp::new();
        http.expect_execute().times(1).returning(|request| {
            assert_eq!(
                request.headers.get("Authorization"),
                Some(&"Bearer token-123".to_string())
            );
            Ok(json_response(
                200,
                r#"{"id": "108", "name": "Test User", "email": "user@example.com"}"#,
            ))
        });

        let client = GoogleOAuthClient::new(test_config(), Arc::new(http));
        let profile = client
            .fetch_user_profile(&bundle_with("token-123", None))
            .await
            .unwrap();

        assert_eq!(profile.id, "108");
        assert_eq!(profile.email, "user@example.com");
    }

    #[tokio::test]
    async fn test_fetch_user_profile_failure() {
        let mut http = MockHttp::new();
        http.expect_execute()
            .times(1)
            .returning(|_| Ok(json_response(401, "unauthorized")));

        let client = GoogleOAuthClient::new(test_config(), Arc::new(http));
        let result = client
            .fetch_user_profile(&bundle_with("expired", None))
            .await;

        assert!(matches!(result, Err(AuthError::ProfileFetchFailed(_))));
    }

    #[tokio::test]
    async fn test_validate_accepts_live_token() {
        let mut http = MockHttp::new();
        http.expect_execute().times(1).returning(|request| {
            assert!(request.url.contains("access_token=live-token"));
            Ok(json_response(200, r#"{"expires_in": "3000"}"#))
        });

        let client = GoogleOAuthClient::new(test_config(), Arc::new(http));
        assert!(client.validate(&bundle_with("live-token", None)).await);
    }

    #[tokio::test]
    async fn test_validate_rejects_revoked_token() {
        let mut http = MockHttp::new();
        http.expect_execute()
            .times(1)
            .returning(|_| Ok(json_response(400, r#"{"error": "invalid_token"}"#)));

        let client = GoogleOAuthClient::new(test_config(), Arc::new(http));
        assert!(!client.validate(&bundle_with("revoked", None)).await);
    }

    #[tokio::test]
    async fn test_validate_fails_closed_on_transport_error() {
        let mut http = MockHttp::new();
        http.expect_execute()
            .times(1)
            .returning(|_| Err(BridgeError::OperationFailed("connection refused".to_string())));

        let client = GoogleOAuthClient::new(test_config(), Arc::new(http));
        assert!(!client.validate(&bundle_with("unknown", None)).await);
    }

    #[tokio::test]
    async fn test_refresh_without_refresh_token() {
        let client = GoogleOAuthClient::new(test_config(), Arc::new(MockHttp::new()));
        let result = client.refresh(&bundle_with("access", None)).await;

        assert!(matches!(result, Err(AuthError::RefreshFailed(_))));
    }

    #[tokio::test]
    async fn test_refresh_carries_old_refresh_token_forward() {
        let mut http = MockHttp::new();
        http.expect_execute_with_retry().times(1).returning(|request, _| {
            let body = String::from_utf8(request.body.unwrap().to_vec()).unwrap();
            assert!(body.contains("grant_type=refresh_token"));
            // Google omits refresh_token on refresh responses
            Ok(json_response(
                200,
                r#"{"access_token": "fresh", "expires_in": 3600, "token_type": "Bearer"}"#,
            ))
        });

        let client = GoogleOAuthClient::new(test_config(), Arc::new(http));
        let bundle = client
            .refresh(&bundle_with("stale", Some("long-lived")))
            .await
            .unwrap();

        assert_eq!(bundle.access_token, "fresh");
        assert_eq!(bundle.refresh_token.as_deref(), Some("long-lived"));
        assert_eq!(bundle.scope, "scope1");
    }

    #[tokio::test]
    async fn test_refresh_provider_rejection() {
        let mut http = MockHttp::new();
        http.expect_execute_with_retry()
            .times(1)
            .returning(|_, _| Ok(json_response(400, r#"{"error": "invalid_grant"}"#)));

        let client = GoogleOAuthClient::new(test_config(), Arc::new(http));
        let result = client.refresh(&bundle_with("stale", Some("revoked"))).await;

        assert!(matches!(result, Err(AuthError::RefreshFailed(_))));
    }

    #[test]
    fn test_token_response_deserialization_minimal() {
        let json = r#"{"access_token": "token"}"#;

        let response: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.access_token, "token");
        assert_eq!(response.refresh_token, None);
        assert_eq!(response.expires_in, 3600); // Default value
    }
}
