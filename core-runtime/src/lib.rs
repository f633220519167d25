//! # Core Runtime Module
//!
//! Foundational runtime infrastructure for the upload service:
//! - Configuration management with fail-fast validation
//! - Logging and tracing infrastructure
//!
//! ## Overview
//!
//! This crate contains the runtime utilities the other crates depend on.
//! It establishes the configuration conventions (builder + actionable
//! errors) and logging conventions used throughout the workspace.

pub mod config;
pub mod error;
pub mod logging;

pub use config::ServiceConfig;
pub use error::{Error, Result};
