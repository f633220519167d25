//! # Authentication Module
//!
//! OAuth 2.0 client adapter for Google.
//!
//! ## Overview
//!
//! This crate owns the provider side of the token lifecycle: consent URL
//! construction, authorization-code exchange, user profile fetch, token
//! introspection, and refresh. Session storage and the request-time gate
//! live in `core-session` and `core-service`; this crate only talks to the
//! provider, through the `HttpClient` seam.
//!
//! ## Features
//!
//! - Deterministic consent URLs with offline access and forced consent
//! - Single-shot code exchange (authorization codes are never replayed)
//! - Provider-backed validation instead of local expiry guessing
//! - Refresh that carries the previous refresh token forward when the
//!   provider omits one

pub mod error;
pub mod oauth;
pub mod types;

pub use error::{AuthError, Result};
pub use oauth::{GoogleOAuthClient, OAuthConfig};
pub use types::{TokenBundle, UserProfile};
