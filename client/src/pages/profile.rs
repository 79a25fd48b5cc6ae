//! Contact details editor.

#[cfg(test)]
#[path = "profile_test.rs"]
mod profile_test;

use backend::Role;
use backend::rows::Profile;
use leptos::prelude::*;
use leptos_router::hooks::use_navigate;
use wizard::ValidationError;
use wizard::validate::{check_phone, require};

use crate::components::field_input::FieldInput;
use crate::state::app::AppContext;
use crate::util::auth::{allowed_signal, install_guard};
use crate::util::forms;

const PROFILE_ROLES: &[Role] = &[Role::Customer, Role::Vendor, Role::Rider];
const FIELDS: [&str; 3] = ["full_name", "phone", "address"];

/// Apply form values to `base`. Blank phone and address clear the column.
///
/// # Errors
///
/// `Required` for a blank name, `InvalidPhone` for a malformed number.
pub fn edited_profile(base: &Profile, full_name: &str, phone: &str, address: &str) -> Result<Profile, ValidationError> {
    require(full_name, "full_name", "Full name")?;
    let phone = phone.trim();
    if !phone.is_empty() {
        check_phone(phone)?;
    }
    let optional = |s: &str| Some(s.trim().to_owned()).filter(|s| !s.is_empty());
    Ok(Profile {
        full_name: Some(full_name.trim().to_owned()),
        phone: optional(phone),
        address: optional(address),
        ..base.clone()
    })
}

#[component]
pub fn ProfilePage(ctx: AppContext) -> impl IntoView {
    install_guard(ctx, PROFILE_ROLES, use_navigate());
    let allowed = allowed_signal(ctx, PROFILE_ROLES);

    let profile = RwSignal::new(None::<Profile>);
    let values = FIELDS.map(|_| RwSignal::new(String::new()));
    let error = RwSignal::new(None::<ValidationError>);
    let saving = RwSignal::new(false);

    let fill = move |p: &Profile| {
        let [name, phone, address] = values;
        name.set(p.full_name.clone().unwrap_or_default());
        phone.set(p.phone.clone().unwrap_or_default());
        address.set(p.address.clone().unwrap_or_default());
    };

    Effect::new(move |done: Option<bool>| {
        if done == Some(true) || !allowed.get() {
            return done.unwrap_or(false);
        }
        let Some(user_id) = ctx.user_id() else { return false };
        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            let session = ctx.session.get_untracked();
            let result = async {
                let client = crate::net::api::client()?;
                backend::repo::Repo::new(&client, session.as_ref()).profile(&user_id).await
            }
            .await;
            match result {
                Ok(Some(row)) => {
                    fill(&row);
                    profile.set(Some(row));
                }
                Ok(None) => ctx.error("Profile not found"),
                Err(e) => ctx.error(e.humanize()),
            }
        });
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (user_id, fill);
        }
        true
    });

    let on_save = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if saving.get_untracked() {
            return;
        }
        let Some(base) = profile.get_untracked() else { return };
        let [name, phone, address] = values.map(|v| v.get_untracked());
        let updated = match edited_profile(&base, &name, &phone, &address) {
            Ok(updated) => updated,
            Err(e) => {
                error.set(Some(e));
                return;
            }
        };
        error.set(None);
        saving.set(true);
        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            let session = ctx.session.get_untracked();
            let result = async {
                let client = crate::net::api::client()?;
                backend::repo::Repo::new(&client, session.as_ref()).save_profile(&updated).await
            }
            .await;
            match result {
                Ok(row) => {
                    fill(&row);
                    profile.set(Some(row));
                    ctx.success("Profile saved");
                }
                Err(e) => ctx.error(e.humanize()),
            }
            saving.set(false);
        });
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = updated;
        }
    };

    view! {
        <main class="profile">
            <Show when=move || allowed.get() fallback=|| view! { <p class="loading">"Loading…"</p> }>
                <h1>"Your details"</h1>
                <p class="muted">{move || profile.with(|p| p.as_ref().and_then(|p| p.email.clone()).unwrap_or_default())}</p>
                <form class="form" on:submit=on_save>
                    {FIELDS
                        .into_iter()
                        .zip(values)
                        .map(|(key, value)| {
                            let field_error = Signal::derive(move || {
                                error.with(|e| e.as_ref().filter(|e| e.field() == Some(key)).map(ToString::to_string))
                            });
                            view! {
                                <FieldInput
                                    field=forms::field_spec(key)
                                    value=value
                                    error=field_error
                                    disabled=Signal::derive(move || saving.get() || profile.with(Option::is_none))
                                    on_input=Callback::new(move |v| value.set(v))
                                />
                            }
                        })
                        .collect_view()}
                    <button class="btn btn--primary" type="submit" disabled=move || saving.get()>
                        {move || if saving.get() { "Saving…" } else { "Save" }}
                    </button>
                </form>
            </Show>
        </main>
    }
}
