//! Workspace facade crate.
//!
//! Host applications can depend on `galeria` and reach the service facade
//! without wiring each workspace crate individually. The individual crates
//! (`core-auth`, `core-session`, `core-crypto`, `provider-google-drive`)
//! remain available for hosts that want finer-grained control.

pub use core_service::{
    GalleryService, ServiceError, SessionStatus, UploadRequest,
};
