//! The `Backend` trait: the single boundary through which the application
//! reaches the hosted platform.
//!
//! Every method resolves with a typed payload or rejects with [`AppError`].
//! Implementations never retry; a failure is surfaced immediately so the
//! caller can decide between a toast, an inline message, or blocking a step.
//!
//! Futures are `Send` on native targets and `?Send` in the browser, where the
//! HTTP stack is single-threaded.

use serde_json::Value;

use crate::error::AppError;
use crate::types::{Attachment, Bucket, OtpPurpose, Query, Role, Session, SignUpOutcome, Table};

#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
pub trait Backend {
    // -------------------------------------------------------------------------
    // auth
    // -------------------------------------------------------------------------

    /// Create a credential identity. The role is stored in user metadata.
    async fn sign_up(&self, email: &str, password: &str, role: Role) -> Result<SignUpOutcome, AppError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AppError>;

    async fn sign_out(&self, session: &Session) -> Result<(), AppError>;

    /// Send (or re-send) a one-time code to `email`.
    async fn send_otp(&self, email: &str, purpose: OtpPurpose) -> Result<(), AppError>;

    /// Exchange a one-time code for a session.
    async fn verify_otp(&self, email: &str, code: &str, purpose: OtpPurpose) -> Result<Session, AppError>;

    async fn update_password(&self, session: &Session, password: &str) -> Result<(), AppError>;

    /// Remove an auth identity. Requires the service key.
    async fn delete_user(&self, user_id: &str) -> Result<(), AppError>;

    // -------------------------------------------------------------------------
    // rows
    // -------------------------------------------------------------------------

    async fn select(&self, session: Option<&Session>, table: Table, query: &Query) -> Result<Vec<Value>, AppError>;

    /// Insert one row and return it as stored.
    async fn insert(&self, session: Option<&Session>, table: Table, row: Value) -> Result<Value, AppError>;

    /// Patch every row matching `query`; returns the updated rows.
    async fn update(
        &self,
        session: Option<&Session>,
        table: Table,
        query: &Query,
        patch: Value,
    ) -> Result<Vec<Value>, AppError>;

    /// Insert or merge on the `on_conflict` column and return the stored row.
    async fn upsert(
        &self,
        session: Option<&Session>,
        table: Table,
        row: Value,
        on_conflict: &str,
    ) -> Result<Value, AppError>;

    async fn delete(&self, session: Option<&Session>, table: Table, query: &Query) -> Result<(), AppError>;

    // -------------------------------------------------------------------------
    // files
    // -------------------------------------------------------------------------

    /// Store `file` at `path` inside `bucket`, replacing any existing object.
    /// Returns the object path.
    async fn upload(
        &self,
        session: Option<&Session>,
        bucket: Bucket,
        path: &str,
        file: &Attachment,
    ) -> Result<String, AppError>;
}
