//! # Google Drive Provider
//!
//! Implements the `FileStorage` trait for Google Drive API v3.
//!
//! ## Overview
//!
//! This crate provides:
//! - Multipart file upload under an optional parent folder
//! - Public-read permission grants ("anyone with the link, reader")
//! - Metadata fetch, newest-first listing, and deletion
//!
//! Every call is authorized with the calling user's OAuth 2.0 access token;
//! the connector holds no credentials of its own.

pub mod connector;
pub mod error;
pub mod types;

pub use connector::{DriveConnector, DriveStorageFactory};
pub use error::{GoogleDriveError, Result};
