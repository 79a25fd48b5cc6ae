//! # backend
//!
//! Remote-access façade for the hosted backend-as-a-service platform.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every screen and wizard reaches auth, row storage, file storage, and the
//! realtime feed through this crate. The [`Backend`] trait is the seam;
//! [`SupabaseClient`] is the HTTP implementation and `MemoryBackend`
//! (feature `memory`) the in-process one used by tests and offline runs.
//!
//! ERROR HANDLING
//! ==============
//! All failures surface as [`AppError`], normalized from structured backend
//! codes. Nothing here retries; callers decide how to present a failure.

pub mod config;
pub mod error;
pub mod facade;
#[cfg(any(test, feature = "memory"))]
pub mod memory;
pub mod realtime;
pub mod repo;
pub mod rest;
pub mod rows;
pub mod types;

pub use config::BackendConfig;
pub use error::{AppError, ErrorKind};
pub use facade::Backend;
#[cfg(any(test, feature = "memory"))]
pub use memory::MemoryBackend;
pub use rest::SupabaseClient;
pub use types::{
    Attachment, AuthUser, Bucket, Filter, FilterOp, OtpPurpose, Query, Role, Session, SignUpOutcome, Table, UnknownRole,
};
