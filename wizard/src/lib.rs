//! # wizard
//!
//! Multi-step registration engine shared by the web client and `foodctl`.
//!
//! SYSTEM CONTEXT
//! ==============
//! The client drives one [`Wizard`] per registration screen and persists its
//! [`WizardSnapshot`] between page loads. Each [`Flow`] describes a role's
//! steps; the wizard validates input, commits steps through the
//! [`backend::Backend`] façade, and keeps checkpoints so a committed step is
//! never re-run for unchanged input.
//!
//! `reconcile` is the server-side counterpart: it finds registrations
//! abandoned between steps.
//!
//! ERROR HANDLING
//! ==============
//! Input problems are [`ValidationError`]s with a user-facing message and the
//! offending field. Everything the wizard refuses or the backend rejects is a
//! [`StepError`]. Nothing here panics on user input.

pub mod draft;
pub mod effect;
pub mod flows;
pub mod machine;
pub mod reconcile;
pub mod validate;

pub use draft::{Draft, DraftSnapshot};
pub use effect::{Effect, EffectFailure, EffectOutput};
pub use flows::{CustomerSignup, PasswordReset, RiderRegistration, VendorOnboarding};
pub use machine::{CommitKind, CommitOutcome, Flow, FlowKind, PendingCommit, Plan, StepError, StepId, Wizard, WizardSnapshot};
pub use reconcile::{ReconcileError, ReconcilePolicy, ReconcileReport};
pub use validate::ValidationError;
