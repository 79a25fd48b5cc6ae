//! Cleanup for registrations abandoned part-way.
//!
//! SYSTEM CONTEXT
//! ==============
//! Wizard steps persist as they go, so a user who quits after verifying
//! their email leaves a profile with no vendor or rider row, or a role row
//! stuck in `draft`. `foodctl reconcile` runs this module with the service
//! key to list such accounts and, when asked, delete the old ones.
//!
//! DESIGN
//! ======
//! - `find_orphans` only reads. `plan` is pure. `apply` is the only writer.
//! - Accounts younger than `discard_after` are reported as resumable and
//!   left alone; the user can still sign in and finish.
//! - Discarding deletes the role row, then the profile, then the auth user.
//!   A failure on one account is recorded and the run moves on.

use backend::repo::Repo;
use backend::rows::{Profile, ReviewStatus};
use backend::{AppError, Backend, Query, Role, Table};
use time::{Duration, OffsetDateTime};

#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("backend: {0}")]
    Backend(#[from] AppError),
    #[error("invalid policy: {0}")]
    Policy(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrphanReason {
    /// Vendor or rider account that never reached the business/vehicle step.
    NoRoleRow,
    /// Role row created but never submitted for review.
    StuckDraft,
    /// Customer that verified but never filled in their profile.
    IncompleteProfile,
}

impl OrphanReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoRoleRow => "no_role_row",
            Self::StuckDraft => "stuck_draft",
            Self::IncompleteProfile => "incomplete_profile",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Orphan {
    pub user_id: String,
    pub email: Option<String>,
    pub role: Role,
    pub reason: OrphanReason,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcilePolicy {
    /// Accounts newer than this are still in progress and never reported.
    pub stale_after: Duration,
    /// Reported accounts older than this are deleted on apply.
    pub discard_after: Duration,
}

impl ReconcilePolicy {
    /// # Errors
    ///
    /// `Policy` when either age is negative or `discard_after` is shorter
    /// than `stale_after`.
    pub fn from_hours(stale_hours: i64, discard_hours: i64) -> Result<Self, ReconcileError> {
        if stale_hours < 0 || discard_hours < 0 {
            return Err(ReconcileError::Policy("ages must not be negative".into()));
        }
        if discard_hours < stale_hours {
            return Err(ReconcileError::Policy(format!(
                "discard age ({discard_hours}h) is shorter than stale age ({stale_hours}h)"
            )));
        }
        Ok(Self { stale_after: Duration::hours(stale_hours), discard_after: Duration::hours(discard_hours) })
    }
}

impl Default for ReconcilePolicy {
    fn default() -> Self {
        Self { stale_after: Duration::hours(24), discard_after: Duration::hours(24 * 7) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Leave in place; the user can sign in and continue.
    Resume,
    Discard,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedAction {
    pub orphan: Orphan,
    pub action: Action,
}

#[derive(Debug, Default)]
pub struct ReconcileReport {
    pub resumable: usize,
    pub discarded: Vec<String>,
    pub failed: Vec<(String, AppError)>,
}

// =============================================================================
// DISCOVERY
// =============================================================================

/// Accounts created before `now - stale_after` whose registration never
/// finished.
///
/// # Errors
///
/// Any backend read failure aborts the scan.
pub async fn find_orphans<B: Backend + ?Sized>(
    backend: &B,
    now: OffsetDateTime,
    policy: &ReconcilePolicy,
) -> Result<Vec<Orphan>, ReconcileError> {
    let repo = Repo::new(backend, None);
    let cutoff = now - policy.stale_after;
    let mut orphans = Vec::new();
    for profile in repo.profiles_created_before(cutoff).await? {
        let Some(created_at) = profile.created_at else { continue };
        if let Some(reason) = classify(&repo, &profile).await? {
            orphans.push(Orphan { user_id: profile.id, email: profile.email, role: profile.role, reason, created_at });
        }
    }
    tracing::info!(count = orphans.len(), cutoff = %cutoff, "orphan scan finished");
    Ok(orphans)
}

async fn classify<B: Backend + ?Sized>(repo: &Repo<'_, B>, profile: &Profile) -> Result<Option<OrphanReason>, AppError> {
    let status = match profile.role {
        Role::Vendor => repo.vendor(&profile.id).await?.map(|v| v.status),
        Role::Rider => repo.rider(&profile.id).await?.map(|r| r.status),
        Role::Customer => {
            let missing = profile.full_name.as_deref().is_none_or(|n| n.trim().is_empty());
            return Ok(missing.then_some(OrphanReason::IncompleteProfile));
        }
        Role::Admin => return Ok(None),
    };
    Ok(match status {
        None => Some(OrphanReason::NoRoleRow),
        Some(ReviewStatus::Draft) => Some(OrphanReason::StuckDraft),
        Some(_) => None,
    })
}

// =============================================================================
// PLAN & APPLY
// =============================================================================

#[must_use]
pub fn plan(orphans: Vec<Orphan>, now: OffsetDateTime, policy: &ReconcilePolicy) -> Vec<PlannedAction> {
    orphans
        .into_iter()
        .map(|orphan| {
            let action = if now - orphan.created_at >= policy.discard_after { Action::Discard } else { Action::Resume };
            PlannedAction { orphan, action }
        })
        .collect()
}

/// Carry out `planned`. Per-account failures land in the report.
pub async fn apply<B: Backend + ?Sized>(backend: &B, planned: &[PlannedAction]) -> ReconcileReport {
    let mut report = ReconcileReport::default();
    for item in planned {
        match item.action {
            Action::Resume => report.resumable += 1,
            Action::Discard => match discard(backend, &item.orphan).await {
                Ok(()) => {
                    tracing::info!(user_id = %item.orphan.user_id, reason = item.orphan.reason.as_str(), "discarded");
                    report.discarded.push(item.orphan.user_id.clone());
                }
                Err(err) => {
                    tracing::warn!(user_id = %item.orphan.user_id, error = %err, "discard failed");
                    report.failed.push((item.orphan.user_id.clone(), err));
                }
            },
        }
    }
    report
}

async fn discard<B: Backend + ?Sized>(backend: &B, orphan: &Orphan) -> Result<(), AppError> {
    let by_id = Query::new().eq("id", &orphan.user_id);
    let role_table = match orphan.role {
        Role::Vendor => Some(Table::Vendors),
        Role::Rider => Some(Table::Riders),
        Role::Customer | Role::Admin => None,
    };
    if let Some(table) = role_table {
        backend.delete(None, table, &by_id).await?;
    }
    backend.delete(None, Table::Profiles, &by_id).await?;
    backend.delete_user(&orphan.user_id).await
}

#[cfg(test)]
#[path = "reconcile_test.rs"]
mod tests;
