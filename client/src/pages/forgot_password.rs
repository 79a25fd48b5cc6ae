//! Password reset (`/forgot-password?type=…`).
//!
//! The reset flow is shared by every role; the `type` parameter picks the
//! portal the user returns to. Passing the code step sets the verification
//! flag in storage. A stored draft that lands on the new-password step is
//! trusted only with that flag and a recovery session; otherwise the flow
//! starts over rather than showing a form that cannot submit.

#[cfg(test)]
#[path = "forgot_password_test.rs"]
mod forgot_password_test;

use backend::Role;
use leptos::prelude::*;
use leptos_router::components::A;
use leptos_router::hooks::use_query_map;
use wizard::{PasswordReset, StepId, Wizard};

use crate::components::wizard_view::WizardScreen;
use crate::state::app::AppContext;
use crate::util::route;
use crate::util::storage::{self, StorageKey};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResetGate {
    /// Nothing to record.
    Idle,
    /// The code was just verified here.
    Verified,
    /// Restored onto the new-password step with a verified flag.
    Resumed,
    /// Cannot finish from here; start again.
    Restart,
}

/// Decide what reaching `step` from `prev` means for the reset flow.
pub fn reset_gate(prev: Option<StepId>, step: StepId, has_session: bool, flagged: bool) -> ResetGate {
    match (step, prev) {
        (StepId::NewPassword, _) if !has_session => ResetGate::Restart,
        (StepId::NewPassword, Some(StepId::Code)) => ResetGate::Verified,
        (StepId::NewPassword, Some(StepId::NewPassword)) => ResetGate::Idle,
        (StepId::NewPassword, _) if flagged => ResetGate::Resumed,
        (StepId::NewPassword, _) => ResetGate::Restart,
        _ => ResetGate::Idle,
    }
}

#[component]
pub fn ForgotPasswordPage(ctx: AppContext) -> impl IntoView {
    let query = use_query_map();
    let requested = Memo::new(move |_| {
        let raw = query.read().get("type");
        route::role_from_query(raw.as_deref()).map_err(|e| e.to_string())
    });

    view! {
        <main class="auth-page">
            {move || match requested.get() {
                Ok(role) => view! { <ResetFlow ctx=ctx role=role/> }.into_any(),
                Err(message) => {
                    view! {
                        <div class="auth-card">
                            <p class="auth-card__error" role="alert">{message}</p>
                            <A href="/" attr:class="btn btn--ghost">"Back to home"</A>
                        </div>
                    }
                        .into_any()
                }
            }}
        </main>
    }
}

#[component]
fn ResetFlow(ctx: AppContext, role: Role) -> impl IntoView {
    let flow = PasswordReset::new(role);
    let wizard = RwSignal::new(Wizard::new(flow));
    let redirect = route::redirect_signal();

    // Runs again after the screen restores a stored draft.
    Effect::new(move |prev: Option<StepId>| {
        let (step, has_session) = wizard.with(|w| (w.step(), w.draft().session().is_some()));
        let flagged = step == StepId::NewPassword
            && storage::load_json::<bool>(StorageKey::PasswordResetVerified).unwrap_or(false);
        match reset_gate(prev, step, has_session, flagged) {
            ResetGate::Verified => storage::save_json(StorageKey::PasswordResetVerified, &true),
            ResetGate::Restart => {
                storage::remove(StorageKey::PasswordResetVerified);
                wizard.set(Wizard::new(flow));
            }
            ResetGate::Resumed | ResetGate::Idle => {}
        }
        step
    });

    let on_done = Callback::new(move |()| {
        storage::remove(StorageKey::PasswordResetVerified);
        ctx.success("Password updated. Sign in with your new password.");
        redirect.set(Some(flow.redirect_path()));
    });

    view! {
        <div class="auth-card auth-card--wide">
            <WizardScreen ctx=ctx wizard=wizard title="Reset your password" on_done=on_done/>
            <A href=route::login_path(role)>"Back to sign in"</A>
        </div>
    }
}
