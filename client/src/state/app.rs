//! Application-wide state handed to every page.
//!
//! SYSTEM CONTEXT
//! ==============
//! `App` builds one [`AppContext`] with [`AppContext::init`] and passes it as
//! a prop. It holds the signed-in session, theme, toast queue, and cart. The
//! session and cart are mirrored to browser storage on every change so a
//! reload picks them up again.
//!
//! TRADE-OFFS
//! ==========
//! Storage is last-writer-wins across tabs. A stored session past its expiry
//! is dropped on load rather than refreshed; the user signs in again.

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use backend::{Role, Session};
use leptos::prelude::*;

use super::cart::Cart;
use super::toast::{ToastKind, ToastQueue};
use crate::util::storage::{self, StorageKey};
use crate::util::theme::{self, Theme};

#[derive(Clone, Copy)]
pub struct AppContext {
    pub session: RwSignal<Option<Session>>,
    pub theme: RwSignal<Theme>,
    pub toasts: RwSignal<ToastQueue>,
    pub cart: RwSignal<Cart>,
    /// Set once browser storage has been read; guards wait for it.
    pub ready: RwSignal<bool>,
}

impl AppContext {
    /// Create the signals. Stored state is loaded after hydration by
    /// [`Self::load`] so server and client render the same first frame.
    pub fn init() -> Self {
        Self {
            session: RwSignal::new(None),
            theme: RwSignal::new(Theme::default()),
            toasts: RwSignal::new(ToastQueue::default()),
            cart: RwSignal::new(Cart::default()),
            ready: RwSignal::new(false),
        }
    }

    /// Read session, cart, and theme from browser storage.
    pub fn load(self) {
        let session = restore_session(storage::load_json(StorageKey::AuthSession), now_unix());
        // An expired session keeps the cached user for the login form.
        if session.is_none() {
            storage::remove(StorageKey::AuthSession);
        }
        let role = session.as_ref().and_then(|s| s.user.role);
        self.session.set(session);
        self.cart.set(storage::load_json(StorageKey::Cart).unwrap_or_default());

        let preferred = theme::read_preference();
        theme::apply(preferred, role);
        self.theme.set(preferred);
        self.ready.set(true);
    }

    /// Clear transient UI and flush what should survive.
    pub fn teardown(self) {
        self.toasts.update(ToastQueue::clear);
        theme::persist(self.theme.get_untracked());
        self.persist_cart();
    }

    pub fn role(self) -> Option<Role> {
        self.session.with(|s| s.as_ref().and_then(|s| s.user.role))
    }

    pub fn user_id(self) -> Option<String> {
        self.session.with(|s| s.as_ref().map(|s| s.user.id.clone()))
    }

    pub fn sign_in(self, session: Session) {
        storage::save_json(StorageKey::AuthSession, &session);
        storage::save_json(StorageKey::CachedUser, &session.user);
        theme::apply(self.theme.get_untracked(), session.user.role);
        self.session.set(Some(session));
    }

    /// Forget the session locally. The remote sign-out is the caller's.
    pub fn sign_out(self) {
        storage::remove(StorageKey::AuthSession);
        storage::remove(StorageKey::CachedUser);
        storage::remove(StorageKey::PendingOrder);
        theme::apply(self.theme.get_untracked(), None);
        self.session.set(None);
    }

    pub fn toggle_theme(self) {
        let next = theme::toggle(self.theme.get_untracked(), self.role());
        self.theme.set(next);
    }

    pub fn update_cart(self, f: impl FnOnce(&mut Cart)) {
        self.cart.update(f);
        self.persist_cart();
    }

    fn persist_cart(self) {
        self.cart.with_untracked(|cart| {
            if cart.is_empty() {
                storage::remove(StorageKey::Cart);
            } else {
                storage::save_json(StorageKey::Cart, cart);
            }
        });
    }

    /// Show a toast and schedule its dismissal.
    pub fn notify(self, kind: ToastKind, message: impl Into<String>) {
        let mut id = 0;
        self.toasts.update(|q| id = q.push(kind, message, now_ms()));
        #[cfg(feature = "hydrate")]
        {
            let toasts = self.toasts;
            leptos::task::spawn_local(async move {
                gloo_timers::future::sleep(std::time::Duration::from_millis(kind.duration_ms())).await;
                toasts.update(|q| {
                    q.dismiss(id);
                    q.expire(now_ms());
                });
            });
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = id;
        }
    }

    pub fn success(self, message: impl Into<String>) {
        self.notify(ToastKind::Success, message);
    }

    pub fn error(self, message: impl Into<String>) {
        self.notify(ToastKind::Error, message);
    }
}

/// Keep a stored session only while its token is unexpired.
pub fn restore_session(stored: Option<Session>, now_unix: i64) -> Option<Session> {
    stored.filter(|s| !s.is_expired(now_unix))
}

pub fn now_ms() -> u64 {
    #[cfg(feature = "hydrate")]
    {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let ms = js_sys::Date::now() as u64;
        ms
    }
    #[cfg(not(feature = "hydrate"))]
    {
        0
    }
}

fn now_unix() -> i64 {
    i64::try_from(now_ms() / 1000).unwrap_or(i64::MAX)
}
