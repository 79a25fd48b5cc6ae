//! Role-specific sign-in page (`/login?type=user|vendor|rider|admin`).

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use backend::{AppError, AuthUser, Role};
use backend::rows::ReviewStatus;
use leptos::prelude::*;
use leptos_router::components::A;
use leptos_router::hooks::use_query_map;
use wizard::validate::{is_valid_email, normalize_email};

use crate::state::app::AppContext;
use crate::util::route;
use crate::util::storage::{self, StorageKey};

/// Error copy when the account belongs to another portal.
pub fn role_mismatch(requested: Role, actual: Option<Role>) -> Option<String> {
    match actual {
        Some(actual) if actual != requested => Some(format!(
            "This is a {} account. Use the {} sign-in instead.",
            actual.display_name().to_lowercase(),
            actual.display_name().to_lowercase()
        )),
        None if requested != Role::Customer => {
            Some(format!("This account is not registered as a {}.", requested.display_name().to_lowercase()))
        }
        _ => None,
    }
}

/// Email to prefill from the user cached by an earlier sign-in, when that
/// account belongs to this portal.
pub fn remembered_email(cached: Option<&AuthUser>, role: Role) -> Option<String> {
    cached.filter(|u| role_mismatch(role, u.role).is_none()).map(|u| u.email.clone())
}

/// Where to land after signing in. Unfinished applications resume their
/// wizard when this browser still holds its draft.
pub fn post_login_path(role: Role, status: Option<ReviewStatus>, has_draft: bool) -> String {
    let unfinished = matches!(status, None | Some(ReviewStatus::Draft));
    match (role, route::signup_path(role)) {
        (Role::Vendor | Role::Rider, Some(signup)) if unfinished && has_draft => signup.to_owned(),
        _ => role.home_path().to_owned(),
    }
}

/// Landing path given the role-row lookup. A failed lookup is reported, not
/// read as a missing row.
pub fn landing(role: Role, lookup: Result<Option<ReviewStatus>, AppError>, has_draft: bool) -> Result<String, String> {
    let status = lookup.map_err(|e| e.humanize())?;
    Ok(post_login_path(role, status, has_draft))
}

#[cfg(feature = "hydrate")]
async fn sign_in(email: &str, password: &str, role: Role) -> Result<(backend::Session, String), String> {
    use backend::Backend;
    use backend::repo::Repo;
    use wizard::FlowKind;

    let client = crate::net::api::client().map_err(|e| e.humanize())?;
    let session = client.sign_in(email, password).await.map_err(|e| e.humanize())?;
    if let Some(message) = role_mismatch(role, session.user.role) {
        if let Err(err) = client.sign_out(&session).await {
            leptos::logging::warn!("sign-out after portal mismatch failed: {err}");
        }
        return Err(message);
    }
    let repo = Repo::new(&client, Some(&session));
    let user_id = session.user.id.clone();
    let (lookup, kind) = match role {
        Role::Vendor => (repo.vendor(&user_id).await.map(|v| v.map(|v| v.status)), Some(FlowKind::Vendor)),
        Role::Rider => (repo.rider(&user_id).await.map(|r| r.map(|r| r.status)), Some(FlowKind::Rider)),
        Role::Customer | Role::Admin => (Ok(None), None),
    };
    let has_draft = kind.is_some_and(|k| storage::load_raw(StorageKey::SignupDraft(k)).is_some())
        && (role != Role::Vendor
            || storage::load_json::<String>(StorageKey::TemporaryVendorId).as_deref() == Some(user_id.as_str()));
    let path = landing(role, lookup, has_draft)?;
    Ok((session, path))
}

#[component]
pub fn LoginPage(ctx: AppContext) -> impl IntoView {
    let query = use_query_map();
    let requested = Memo::new(move |_| {
        let raw = query.read().get("type");
        route::role_from_query(raw.as_deref()).map_err(|e| e.to_string())
    });

    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let info = RwSignal::new(String::new());
    let busy = RwSignal::new(false);
    let redirect = route::redirect_signal();

    // Offer the last account once stored state is loaded.
    Effect::new(move |done: Option<bool>| {
        if done == Some(true) || !ctx.ready.get() {
            return done.unwrap_or(false);
        }
        let Ok(role) = requested.get_untracked() else { return true };
        let cached = storage::load_json::<AuthUser>(StorageKey::CachedUser);
        if let Some(remembered) = remembered_email(cached.as_ref(), role) {
            email.update(|e| {
                if e.is_empty() {
                    *e = remembered;
                }
            });
        }
        true
    });

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let Ok(role) = requested.get() else { return };
        let email_value = normalize_email(&email.get());
        let password_value = password.get();
        if !is_valid_email(&email_value) {
            info.set("Enter a valid email address".to_owned());
            return;
        }
        if password_value.is_empty() {
            info.set("Enter your password".to_owned());
            return;
        }
        busy.set(true);
        info.set(String::new());

        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            match sign_in(&email_value, &password_value, role).await {
                Ok((session, path)) => {
                    ctx.sign_in(session);
                    password.set(String::new());
                    redirect.set(Some(path));
                }
                Err(message) => info.set(message),
            }
            busy.set(false);
        });
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (ctx, role, redirect);
        }
    };

    let heading = move || match requested.get() {
        Ok(role) => format!("{} sign in", role.display_name()),
        Err(_) => "Sign in".to_owned(),
    };
    let role = move || requested.get().unwrap_or(Role::Customer);

    view! {
        <main class="auth-page">
            <div class="auth-card">
                <h1>{heading}</h1>
                <Show
                    when=move || requested.with(Result::is_ok)
                    fallback=move || {
                        view! {
                            <p class="auth-card__error" role="alert">
                                {move || requested.get().err().unwrap_or_default()}
                            </p>
                            <A href="/" attr:class="btn btn--ghost">"Back to home"</A>
                        }
                    }
                >
                    <form class="auth-form" on:submit=on_submit>
                        <label class="field__label" for="login-email">"Email"</label>
                        <input
                            id="login-email"
                            class="field__input"
                            type="email"
                            autocomplete="email"
                            placeholder="you@example.com"
                            prop:value=move || email.get()
                            on:input=move |ev| email.set(event_target_value(&ev))
                        />
                        <label class="field__label" for="login-password">"Password"</label>
                        <input
                            id="login-password"
                            class="field__input"
                            type="password"
                            autocomplete="current-password"
                            prop:value=move || password.get()
                            on:input=move |ev| password.set(event_target_value(&ev))
                        />
                        <button class="btn btn--primary" type="submit" disabled=move || busy.get()>
                            {move || if busy.get() { "Signing in…" } else { "Sign in" }}
                        </button>
                    </form>
                    <Show when=move || !info.get().is_empty()>
                        <p class="auth-card__error" role="alert">{move || info.get()}</p>
                    </Show>
                    <div class="auth-card__links">
                        <A href=move || route::forgot_password_path(role())>"Forgot password?"</A>
                        {move || {
                            route::signup_path(role())
                                .map(|href| view! { <A href=href>"Create an account"</A> })
                        }}
                    </div>
                </Show>
            </div>
        </main>
    }
}
