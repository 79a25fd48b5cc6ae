//! Route guards shared by signed-in pages.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every protected page applies the same rule: wait for storage to load,
//! send guests to the sign-in page, and send users of the wrong role to
//! their own home.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use backend::{Role, Session};
use leptos::prelude::*;
use leptos_router::NavigateOptions;

use super::route;
use crate::state::app::AppContext;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Access {
    /// Storage not read yet; render nothing and wait.
    Pending,
    Allowed,
    Redirect(String),
}

/// Decide whether a page open to `allowed` roles may render.
pub fn check_access(ready: bool, session: Option<&Session>, allowed: &[Role]) -> Access {
    if !ready {
        return Access::Pending;
    }
    let Some(session) = session else {
        let wanted = allowed.first().copied().unwrap_or(Role::Customer);
        return Access::Redirect(route::login_path(wanted));
    };
    match session.user.role {
        Some(role) if allowed.contains(&role) => Access::Allowed,
        Some(role) => Access::Redirect(role.home_path().to_owned()),
        None => Access::Redirect(route::login_path(Role::Customer)),
    }
}

/// Navigate away whenever [`check_access`] says so.
pub fn install_guard<F>(ctx: AppContext, allowed: &'static [Role], navigate: F)
where
    F: Fn(&str, NavigateOptions) + Clone + 'static,
{
    Effect::new(move || {
        let ready = ctx.ready.get();
        let access = ctx.session.with(|s| check_access(ready, s.as_ref(), allowed));
        if let Access::Redirect(path) = access {
            navigate(&path, NavigateOptions { replace: true, ..NavigateOptions::default() });
        }
    });
}

/// Reactive "may this page render" flag for `<Show>`.
pub fn allowed_signal(ctx: AppContext, allowed: &'static [Role]) -> Signal<bool> {
    Signal::derive(move || {
        let ready = ctx.ready.get();
        ctx.session.with(|s| check_access(ready, s.as_ref(), allowed)) == Access::Allowed
    })
}
