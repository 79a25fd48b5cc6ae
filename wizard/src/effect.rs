//! Remote effects a step commits, and their execution.
//!
//! Flows describe each step's remote work as plain [`Effect`] values. The
//! wizard hands them to [`run_effects`] in order; the first failure stops the
//! run. The session produced by a verification effect is threaded into every
//! later effect of the same run.
//!
//! A failed run still reports what the effects before the failure produced.
//! Verification codes are single-use and uploads are slow, so the wizard
//! keeps those results for the retry.

use std::fmt;

use backend::{AppError, Attachment, AuthUser, Backend, Bucket, ErrorKind, OtpPurpose, Query, Role, Session, Table};
use serde_json::Value;

#[derive(Clone, PartialEq)]
pub enum Effect {
    SignUp { email: String, password: String, role: Role },
    SendCode { email: String, purpose: OtpPurpose },
    VerifyCode { email: String, code: String, purpose: OtpPurpose },
    UpdatePassword { password: String },
    SignOut,
    Upsert { table: Table, row: Value, on_conflict: &'static str },
    /// Patch rows matching `query`; matching nothing is an error.
    Update { table: Table, query: Query, patch: Value },
    Upload { key: String, bucket: Bucket, path: String, file: Attachment },
}

impl Effect {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::SignUp { .. } => "sign_up",
            Self::SendCode { .. } => "send_code",
            Self::VerifyCode { .. } => "verify_code",
            Self::UpdatePassword { .. } => "update_password",
            Self::SignOut => "sign_out",
            Self::Upsert { .. } => "upsert",
            Self::Update { .. } => "update",
            Self::Upload { .. } => "upload",
        }
    }
}

// Passwords and codes stay out of logs.
impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upsert { table, .. } | Self::Update { table, .. } => {
                write!(f, "{}({})", self.name(), table.as_str())
            }
            Self::Upload { bucket, path, .. } => write!(f, "upload({}/{path})", bucket.as_str()),
            other => f.write_str(other.name()),
        }
    }
}

/// What a successful run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectOutput {
    pub account: Option<AuthUser>,
    pub session: Option<Session>,
    /// `(attachment key, storage path)` for each upload.
    pub uploads: Vec<(String, String)>,
}

/// A run that stopped part-way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectFailure {
    /// Results of the effects that succeeded before `error`.
    pub output: EffectOutput,
    pub error: AppError,
}

fn session_required(effect: &Effect) -> AppError {
    AppError::new(ErrorKind::Unauthorized, 0, format!("{} requires a signed-in session", effect.name()))
}

/// Execute `effects` in order, starting from `session`.
///
/// # Errors
///
/// Returns the first backend failure along with the output gathered so far.
/// Effects before it have already been applied remotely; nothing is rolled
/// back.
pub async fn run_effects<B: Backend + ?Sized>(
    backend: &B,
    session: Option<Session>,
    effects: &[Effect],
) -> Result<EffectOutput, EffectFailure> {
    let mut output = EffectOutput { session, ..EffectOutput::default() };
    for effect in effects {
        tracing::debug!(effect = ?effect, "running effect");
        if let Err(error) = run_one(backend, effect, &mut output).await {
            return Err(EffectFailure { output, error });
        }
    }
    Ok(output)
}

async fn run_one<B: Backend + ?Sized>(backend: &B, effect: &Effect, output: &mut EffectOutput) -> Result<(), AppError> {
    match effect {
        Effect::SignUp { email, password, role } => {
            let outcome = backend.sign_up(email, password, *role).await?;
            output.account = Some(outcome.user);
            if outcome.session.is_some() {
                output.session = outcome.session;
            }
        }
        Effect::SendCode { email, purpose } => backend.send_otp(email, *purpose).await?,
        Effect::VerifyCode { email, code, purpose } => {
            output.session = Some(backend.verify_otp(email, code, *purpose).await?);
        }
        Effect::UpdatePassword { password } => {
            let session = output.session.as_ref().ok_or_else(|| session_required(effect))?;
            backend.update_password(session, password).await?;
        }
        Effect::SignOut => {
            if let Some(session) = &output.session {
                backend.sign_out(session).await?;
                output.session = None;
            }
        }
        Effect::Upsert { table, row, on_conflict } => {
            backend
                .upsert(output.session.as_ref(), *table, row.clone(), on_conflict)
                .await?;
        }
        Effect::Update { table, query, patch } => {
            let rows = backend
                .update(output.session.as_ref(), *table, query, patch.clone())
                .await?;
            if rows.is_empty() {
                return Err(AppError::new(
                    ErrorKind::NotFound,
                    0,
                    format!("no {} row to update", table.as_str()),
                ));
            }
        }
        Effect::Upload { key, bucket, path, file } => {
            let stored = backend.upload(output.session.as_ref(), *bucket, path, file).await?;
            output.uploads.push((key.clone(), stored));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "effect_test.rs"]
mod tests;
