//! Route paths and the `?type=` role parameter.

#[cfg(test)]
#[path = "route_test.rs"]
mod route_test;

use backend::{Role, UnknownRole};
use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

/// Parse the `type` query value. A missing value means a customer; anything
/// unrecognised is an error shown to the user.
///
/// # Errors
///
/// `UnknownRole` for values outside the closed role set.
pub fn role_from_query(value: Option<&str>) -> Result<Role, UnknownRole> {
    match value.map(str::trim) {
        None | Some("") => Ok(Role::Customer),
        Some(raw) => raw.parse(),
    }
}

pub fn login_path(role: Role) -> String {
    format!("/login?type={}", role.query_value())
}

pub fn forgot_password_path(role: Role) -> String {
    format!("/forgot-password?type={}", role.query_value())
}

/// Self-service registration page; admins are provisioned out of band.
pub fn signup_path(role: Role) -> Option<&'static str> {
    match role {
        Role::Customer => Some("/signup"),
        Role::Vendor => Some("/vendor/signup"),
        Role::Rider => Some("/rider/signup"),
        Role::Admin => None,
    }
}

pub fn vendor_path(vendor_id: &str) -> String {
    format!("/market/{vendor_id}")
}

pub fn chat_path(conversation_id: &str) -> String {
    format!("/chat/{conversation_id}")
}

/// Signal that navigates (replacing history) whenever it is set.
///
/// Async handlers set the path instead of holding a navigate closure.
pub fn redirect_signal() -> RwSignal<Option<String>> {
    let redirect = RwSignal::new(None::<String>);
    let navigate = use_navigate();
    Effect::new(move || {
        if let Some(path) = redirect.get() {
            navigate(&path, NavigateOptions { replace: true, ..NavigateOptions::default() });
        }
    });
    redirect
}
