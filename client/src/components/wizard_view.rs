//! Generic screen for any registration [`Flow`].
//!
//! SYSTEM CONTEXT
//! ==============
//! Signup, vendor onboarding, rider registration, and password reset all
//! render through [`WizardScreen`]. The page owns the `Wizard` signal and
//! decides what happens on `Done`; this component draws the current step's
//! fields and drives advance, retreat, and resend.
//!
//! DESIGN
//! ======
//! Remote work runs without holding the signal: `begin_advance` plans the
//! commit inside an update, the commit executes in a local task, and
//! `complete` applies the outcome. The wizard's own in-flight flag disables
//! the buttons meanwhile. The storage-safe snapshot is restored after
//! hydration and saved after every change, so a reload resumes on the same
//! step.

#[cfg(test)]
#[path = "wizard_view_test.rs"]
mod wizard_view_test;

use leptos::prelude::*;
use wizard::validate::normalize_code_input;
use wizard::{Flow, Plan, StepError, StepId, Wizard};

use super::field_input::FieldInput;
use super::step_indicator::StepIndicator;
use crate::state::app::AppContext;
use crate::util::forms::{self, InputKind};
use crate::util::storage::{self, StorageKey};

/// Field the last error belongs to, if it came from validation.
pub fn error_field(err: Option<&StepError>) -> Option<&'static str> {
    match err {
        Some(StepError::Validation(v)) => v.field(),
        _ => None,
    }
}

pub fn primary_label(is_final: bool, submitting: bool) -> &'static str {
    match (is_final, submitting) {
        (_, true) => "Please wait…",
        (true, false) => "Submit",
        (false, false) => "Continue",
    }
}

/// Normalize raw input for `key` before it reaches the draft.
pub fn clean_input(kind: InputKind, raw: String) -> String {
    if kind == InputKind::Code { normalize_code_input(&raw) } else { raw }
}

#[component]
pub fn WizardScreen<F>(
    ctx: AppContext,
    wizard: RwSignal<Wizard<F>>,
    title: &'static str,
    /// Called once when the flow reaches `Done`.
    on_done: Callback<()>,
) -> impl IntoView
where
    F: Flow + Clone + Send + Sync + 'static,
{
    let draft_key = StorageKey::SignupDraft(F::KIND);

    // First run resumes a stored draft; every run saves the current one.
    Effect::new(move |prev: Option<()>| {
        if prev.is_none() {
            if let Some(snapshot) = storage::load_json(draft_key) {
                let flow = wizard.with_untracked(|w| w.flow().clone());
                wizard.set(Wizard::restore(flow, snapshot));
            }
        }
        wizard.with(|w| {
            if w.is_done() {
                storage::remove(draft_key);
            } else {
                storage::save_json(draft_key, &w.snapshot());
            }
        });
    });

    let step = Memo::new(move |_| wizard.with(Wizard::step));
    let cursor = Signal::derive(move || wizard.with(Wizard::cursor));
    let submitting = Signal::derive(move || wizard.with(Wizard::is_submitting));
    let banner = move || {
        wizard.with(|w| {
            let err = w.last_error()?;
            error_field(Some(err)).is_none().then(|| err.to_string())
        })
    };

    let finish = move |result: Result<StepId, StepError>| match result {
        Ok(StepId::Done) => on_done.run(()),
        Ok(_) | Err(StepError::Stale) => {}
        Err(e) => leptos::logging::warn!("step failed: {e}"),
    };

    let advance = move || {
        let client = match crate::net::api::client() {
            Ok(client) => client,
            Err(e) => {
                ctx.error(e.humanize());
                return;
            }
        };
        let Some(plan) = wizard.try_update(Wizard::begin_advance) else { return };
        match plan {
            Ok(Plan::Moved(next)) => finish(Ok(next)),
            Ok(Plan::Commit(commit)) => {
                #[cfg(feature = "hydrate")]
                leptos::task::spawn_local(async move {
                    let outcome = commit.execute(&client).await;
                    let result = wizard.try_update(|w| w.complete(outcome)).unwrap_or(Err(StepError::Stale));
                    finish(result);
                });
                #[cfg(not(feature = "hydrate"))]
                {
                    let _ = (commit, client);
                }
            }
            Err(_) => {}
        }
    };

    let resend = move |_| {
        let client = match crate::net::api::client() {
            Ok(client) => client,
            Err(e) => {
                ctx.error(e.humanize());
                return;
            }
        };
        let Some(Ok(commit)) = wizard.try_update(Wizard::begin_resend) else { return };
        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            let outcome = commit.execute(&client).await;
            if let Some(Ok(_)) = wizard.try_update(|w| w.complete(outcome)) {
                ctx.success("A new code is on its way");
            }
        });
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (commit, client);
        }
    };

    let retreat = move |_| {
        wizard.update(|w| {
            let _ = w.retreat();
        });
    };

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        advance();
    };

    let fields = move || {
        let current = step.get();
        let (keys, attachments) = wizard.with_untracked(|w| (w.flow().fields(current), w.flow().attachments(current)));
        keys.iter()
            .chain(attachments)
            .map(|&key| {
                let field = forms::field_spec(key);
                let is_file = matches!(field.kind, InputKind::File { .. });
                let value = Signal::derive(move || {
                    wizard.with(|w| {
                        if is_file {
                            w.draft()
                                .attachment(key)
                                .map(|a| a.file_name.clone())
                                .or_else(|| w.draft().upload_path(key).map(|_| "Uploaded".to_owned()))
                                .unwrap_or_default()
                        } else {
                            w.draft().get(key).to_owned()
                        }
                    })
                });
                let error = Signal::derive(move || {
                    wizard.with(|w| {
                        let err = w.last_error()?;
                        (error_field(Some(err)) == Some(key)).then(|| err.to_string())
                    })
                });
                let on_input = Callback::new(move |raw: String| {
                    wizard.update(|w| w.update_field(key, clean_input(field.kind, raw)));
                });
                let on_attach = Callback::new(move |file: backend::Attachment| wizard.update(|w| w.attach(key, file)));
                view! {
                    <FieldInput
                        field=field
                        value=value
                        error=error
                        disabled=submitting
                        on_input=on_input
                        on_attach=on_attach
                    />
                }
            })
            .collect_view()
    };

    let has_code = move || wizard.with(|w| w.flow().code_purpose(step.get()).is_some());
    let can_retreat = move || cursor.get() > 0 && step.get() != StepId::Done;

    view! {
        <section class="wizard">
            <h1 class="wizard__title">{title}</h1>
            <StepIndicator steps=F::STEPS cursor=cursor/>
            <form class="wizard__form" on:submit=on_submit>
                <h2 class="wizard__step-title">{move || step.get().title()}</h2>
                {fields}
                <Show when=move || banner().is_some()>
                    <p class="wizard__error" role="alert">{move || banner().unwrap_or_default()}</p>
                </Show>
                <div class="wizard__actions">
                    <Show when=can_retreat>
                        <button
                            type="button"
                            class="btn btn--ghost"
                            disabled=move || submitting.get()
                            on:click=retreat
                        >
                            "Back"
                        </button>
                    </Show>
                    <Show when=has_code>
                        <button
                            type="button"
                            class="btn btn--link"
                            disabled=move || submitting.get()
                            on:click=resend
                        >
                            "Resend code"
                        </button>
                    </Show>
                    <button type="submit" class="btn btn--primary" disabled=move || submitting.get()>
                        {move || primary_label(wizard.with(Wizard::is_final_input_step), submitting.get())}
                    </button>
                </div>
            </form>
        </section>
    }
}
