//! Generic step-wizard state machine.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every registration screen (customer signup, vendor onboarding, rider
//! registration, password reset) is a [`Wizard`] over a [`Flow`]. The flow
//! fixes the step order and says, per step, what to validate and which
//! remote [`Effect`]s commit it. The wizard owns the cursor, the draft, and
//! the in-flight flag.
//!
//! DESIGN
//! ======
//! - Advancing validates first; nothing remote happens on invalid input.
//! - A committed step leaves a checkpoint keyed by a fingerprint of its
//!   input. Advancing again with the same input moves forward without a
//!   remote call, so back-then-next never repeats a sign-up or an upload.
//! - Advancing is split in three (`begin_advance`, `PendingCommit::execute`,
//!   `complete`) so UI code can hold the wizard in a signal and release it
//!   while the request is in flight. [`Wizard::advance`] chains them for
//!   callers that can hold `&mut` across the await.
//! - `Done` is absorbing: neither advance nor retreat leave it.
//!
//! TRADE-OFFS
//! ==========
//! Steps persist their slice as they go. An abandoned wizard leaves partial
//! remote rows; `reconcile` finds and clears them.

use backend::{AppError, Backend, OtpPurpose, Role, Session};
use serde::{Deserialize, Serialize};

use crate::draft::{Draft, DraftSnapshot};
use crate::effect::{Effect, EffectFailure, EffectOutput, run_effects};
use crate::validate::{ValidationError, normalize_email};

// =============================================================================
// STEPS & FLOWS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    Credentials,
    Verify,
    Profile,
    Personal,
    Business,
    Vehicle,
    Documents,
    Banking,
    Payout,
    Terms,
    Email,
    Code,
    NewPassword,
    Done,
}

impl StepId {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Credentials => "credentials",
            Self::Verify => "verify",
            Self::Profile => "profile",
            Self::Personal => "personal",
            Self::Business => "business",
            Self::Vehicle => "vehicle",
            Self::Documents => "documents",
            Self::Banking => "banking",
            Self::Payout => "payout",
            Self::Terms => "terms",
            Self::Email => "email",
            Self::Code => "code",
            Self::NewPassword => "new_password",
            Self::Done => "done",
        }
    }

    /// Short label for the step indicator.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Credentials => "Account",
            Self::Verify | Self::Code => "Verify",
            Self::Profile => "Profile",
            Self::Personal => "Personal",
            Self::Business => "Business",
            Self::Vehicle => "Vehicle",
            Self::Documents => "Documents",
            Self::Banking => "Banking",
            Self::Payout => "Payout",
            Self::Terms => "Terms",
            Self::Email => "Email",
            Self::NewPassword => "New password",
            Self::Done => "Done",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowKind {
    Customer,
    Vendor,
    Rider,
    PasswordReset,
}

impl FlowKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Vendor => "vendor",
            Self::Rider => "rider",
            Self::PasswordReset => "password_reset",
        }
    }
}

/// A fixed sequence of steps with per-step validation and remote effects.
pub trait Flow {
    const KIND: FlowKind;
    /// Step order. The last entry is always [`StepId::Done`].
    const STEPS: &'static [StepId];

    fn role(&self) -> Role;

    /// Field keys that make up the step's input.
    fn fields(&self, step: StepId) -> &'static [&'static str];

    /// Attachment keys that make up the step's input.
    fn attachments(&self, _step: StepId) -> &'static [&'static str] {
        &[]
    }

    /// # Errors
    ///
    /// The first invalid or missing field.
    fn validate(&self, step: StepId, draft: &Draft) -> Result<(), ValidationError>;

    /// Remote work that commits `step`. Called only after validation passed.
    ///
    /// # Errors
    ///
    /// `SessionRequired` when the step needs an account the draft lacks.
    fn effects(&self, step: StepId, draft: &Draft) -> Result<Vec<Effect>, StepError>;

    /// Purpose of the one-time code entered on `step`, if any.
    fn code_purpose(&self, _step: StepId) -> Option<OtpPurpose> {
        None
    }
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StepError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{}", .0.humanize())]
    Remote(AppError),
    #[error("Please wait for the current request to finish")]
    Busy,
    #[error("This registration is already complete")]
    Finished,
    #[error("Only the last step can be submitted")]
    NotFinalStep,
    #[error("You are already on the first step")]
    AtFirstStep,
    #[error("There is no code to resend on this step")]
    NothingToResend,
    #[error("Your session has expired. Please start again.")]
    SessionRequired,
    #[error("The form changed while the request was in flight")]
    Stale,
}

// =============================================================================
// COMMITS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitKind {
    /// Commit the current step and move to the next.
    Advance,
    /// Commit the last input step and enter `Done`.
    Finalize,
    /// Re-send the current step's code without moving.
    Resend,
}

/// Remote work planned by the wizard, detached from it while in flight.
#[derive(Debug)]
pub struct PendingCommit {
    step: StepId,
    index: usize,
    fingerprint: String,
    kind: CommitKind,
    session: Option<Session>,
    effects: Vec<Effect>,
}

impl PendingCommit {
    #[must_use]
    pub fn step(&self) -> StepId {
        self.step
    }

    #[must_use]
    pub fn kind(&self) -> CommitKind {
        self.kind
    }

    #[must_use]
    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    pub async fn execute<B: Backend + ?Sized>(self, backend: &B) -> CommitOutcome {
        let result = run_effects(backend, self.session, &self.effects).await;
        CommitOutcome { step: self.step, index: self.index, fingerprint: self.fingerprint, kind: self.kind, result }
    }
}

/// Result of a [`PendingCommit`], applied with [`Wizard::complete`].
#[derive(Debug)]
pub struct CommitOutcome {
    step: StepId,
    index: usize,
    fingerprint: String,
    kind: CommitKind,
    result: Result<EffectOutput, EffectFailure>,
}

#[derive(Debug)]
pub enum Plan {
    /// The step was already committed with this input; the cursor moved.
    Moved(StepId),
    Commit(PendingCommit),
}

// =============================================================================
// WIZARD
// =============================================================================

/// Storage-safe wizard state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardSnapshot {
    pub kind: FlowKind,
    pub cursor: usize,
    pub draft: DraftSnapshot,
}

#[derive(Debug, Clone)]
pub struct Wizard<F: Flow> {
    flow: F,
    cursor: usize,
    draft: Draft,
    submitting: bool,
    last_error: Option<StepError>,
}

impl<F: Flow> Wizard<F> {
    pub fn new(flow: F) -> Self {
        Self { flow, cursor: 0, draft: Draft::new(), submitting: false, last_error: None }
    }

    /// Resume from a snapshot. A snapshot of another flow starts fresh.
    pub fn restore(flow: F, snapshot: WizardSnapshot) -> Self {
        if snapshot.kind != F::KIND {
            return Self::new(flow);
        }
        let cursor = snapshot.cursor.min(F::STEPS.len().saturating_sub(1));
        Self { flow, cursor, draft: Draft::restore(snapshot.draft), submitting: false, last_error: None }
    }

    #[must_use]
    pub fn snapshot(&self) -> WizardSnapshot {
        WizardSnapshot { kind: F::KIND, cursor: self.cursor, draft: self.draft.snapshot() }
    }

    // -------------------------------------------------------------------------
    // queries
    // -------------------------------------------------------------------------

    pub fn flow(&self) -> &F {
        &self.flow
    }

    #[must_use]
    pub fn steps(&self) -> &'static [StepId] {
        F::STEPS
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn step(&self) -> StepId {
        F::STEPS.get(self.cursor).copied().unwrap_or(StepId::Done)
    }

    fn last_input_index() -> usize {
        F::STEPS.len().saturating_sub(2)
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.step() == StepId::Done
    }

    #[must_use]
    pub fn is_final_input_step(&self) -> bool {
        !self.is_done() && self.cursor == Self::last_input_index()
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&StepError> {
        self.last_error.as_ref()
    }

    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.last_error.as_ref().map(ToString::to_string)
    }

    #[must_use]
    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    // -------------------------------------------------------------------------
    // edits
    // -------------------------------------------------------------------------

    pub fn update_field(&mut self, key: &str, value: impl Into<String>) {
        self.draft.set(key, value);
    }

    pub fn attach(&mut self, key: &str, file: backend::Attachment) {
        self.draft.attach(key, file);
    }

    pub fn detach(&mut self, key: &str) {
        self.draft.detach(key);
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Forget that `step` was committed so the next advance re-runs it.
    pub fn invalidate(&mut self, step: StepId) -> bool {
        self.draft.drop_checkpoint(step.as_str())
    }

    // -------------------------------------------------------------------------
    // navigation
    // -------------------------------------------------------------------------

    fn fail(&mut self, err: StepError) -> StepError {
        self.last_error = Some(err.clone());
        err
    }

    fn ensure_idle(&self) -> Result<(), StepError> {
        if self.submitting {
            return Err(StepError::Busy);
        }
        if self.is_done() {
            return Err(StepError::Finished);
        }
        Ok(())
    }

    /// Validate the current step and plan its commit.
    ///
    /// # Errors
    ///
    /// `Busy`, `Finished`, a validation failure, or a planning failure. The
    /// latter two are also stored as the last error.
    pub fn begin_advance(&mut self) -> Result<Plan, StepError> {
        self.ensure_idle()?;
        let step = self.step();
        if let Err(err) = self.flow.validate(step, &self.draft) {
            return Err(self.fail(err.into()));
        }

        let fingerprint = self
            .draft
            .fingerprint(step.as_str(), self.flow.fields(step), self.flow.attachments(step));
        if self.draft.is_committed(step.as_str(), &fingerprint) {
            self.cursor += 1;
            self.last_error = None;
            tracing::debug!(flow = F::KIND.as_str(), step = step.as_str(), "step already committed");
            return Ok(Plan::Moved(self.step()));
        }

        let effects = match self.flow.effects(step, &self.draft) {
            Ok(effects) => effects,
            Err(err) => return Err(self.fail(err)),
        };
        let kind = if self.cursor == Self::last_input_index() { CommitKind::Finalize } else { CommitKind::Advance };
        self.submitting = true;
        Ok(Plan::Commit(PendingCommit {
            step,
            index: self.cursor,
            fingerprint,
            kind,
            session: self.draft.session().cloned(),
            effects,
        }))
    }

    /// Like [`Self::begin_advance`], but only on the last input step.
    ///
    /// # Errors
    ///
    /// `NotFinalStep` anywhere else.
    pub fn begin_finalize(&mut self) -> Result<Plan, StepError> {
        if !self.is_final_input_step() {
            self.ensure_idle()?;
            return Err(StepError::NotFinalStep);
        }
        self.begin_advance()
    }

    /// Plan a fresh one-time code for the current step.
    ///
    /// # Errors
    ///
    /// `Busy`, `Finished`, or `NothingToResend` when the step takes no code.
    pub fn begin_resend(&mut self) -> Result<PendingCommit, StepError> {
        self.ensure_idle()?;
        let step = self.step();
        let Some(purpose) = self.flow.code_purpose(step) else {
            return Err(StepError::NothingToResend);
        };
        self.invalidate(step);
        self.draft.set("code", "");
        self.submitting = true;
        Ok(PendingCommit {
            step,
            index: self.cursor,
            fingerprint: String::new(),
            kind: CommitKind::Resend,
            session: self.draft.session().cloned(),
            effects: vec![Effect::SendCode { email: normalize_email(self.draft.get("email")), purpose }],
        })
    }

    /// Apply a finished commit.
    ///
    /// # Errors
    ///
    /// `Remote` when the commit failed (the cursor stays), `Stale` when the
    /// wizard moved since the commit was planned.
    pub fn complete(&mut self, outcome: CommitOutcome) -> Result<StepId, StepError> {
        self.submitting = false;
        if outcome.index != self.cursor || outcome.step != self.step() {
            return Err(StepError::Stale);
        }
        let output = match outcome.result {
            Ok(output) => output,
            Err(EffectFailure { output, error }) => {
                tracing::warn!(
                    flow = F::KIND.as_str(),
                    step = outcome.step.as_str(),
                    kind = error.kind.as_str(),
                    "step commit failed"
                );
                self.keep(output);
                return Err(self.fail(StepError::Remote(error)));
            }
        };

        self.keep(output);
        self.last_error = None;

        if outcome.kind != CommitKind::Resend {
            self.draft.record_checkpoint(outcome.step.as_str(), outcome.fingerprint);
            self.cursor += 1;
            tracing::info!(flow = F::KIND.as_str(), step = outcome.step.as_str(), "step committed");
        }
        Ok(self.step())
    }

    /// Record what a commit produced, whether or not it finished.
    fn keep(&mut self, output: EffectOutput) {
        if let Some(account) = output.account {
            self.draft.set_account(account);
        }
        if let Some(session) = output.session {
            self.draft.set_session(session);
        }
        for (key, path) in output.uploads {
            self.draft.record_upload(key, path);
        }
    }

    /// Validate, commit, and move forward.
    ///
    /// # Errors
    ///
    /// See [`Self::begin_advance`] and [`Self::complete`].
    pub async fn advance<B: Backend + ?Sized>(&mut self, backend: &B) -> Result<StepId, StepError> {
        match self.begin_advance()? {
            Plan::Moved(step) => Ok(step),
            Plan::Commit(commit) => {
                let outcome = commit.execute(backend).await;
                self.complete(outcome)
            }
        }
    }

    /// Commit the last input step and enter `Done`.
    ///
    /// # Errors
    ///
    /// `NotFinalStep` before the last input step, otherwise as [`Self::advance`].
    pub async fn finalize<B: Backend + ?Sized>(&mut self, backend: &B) -> Result<StepId, StepError> {
        match self.begin_finalize()? {
            Plan::Moved(step) => Ok(step),
            Plan::Commit(commit) => {
                let outcome = commit.execute(backend).await;
                self.complete(outcome)
            }
        }
    }

    /// Send a new one-time code for the current step.
    ///
    /// # Errors
    ///
    /// See [`Self::begin_resend`] and [`Self::complete`].
    pub async fn resend_code<B: Backend + ?Sized>(&mut self, backend: &B) -> Result<(), StepError> {
        let commit = self.begin_resend()?;
        let outcome = commit.execute(backend).await;
        self.complete(outcome).map(|_| ())
    }

    /// Move back one step. Nothing remote is undone.
    ///
    /// # Errors
    ///
    /// `Busy`, `Finished`, or `AtFirstStep`.
    pub fn retreat(&mut self) -> Result<StepId, StepError> {
        self.ensure_idle()?;
        if self.cursor == 0 {
            return Err(StepError::AtFirstStep);
        }
        self.cursor -= 1;
        self.last_error = None;
        Ok(self.step())
    }
}

#[cfg(test)]
#[path = "machine_test.rs"]
mod tests;
