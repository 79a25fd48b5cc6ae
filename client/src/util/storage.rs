//! Browser `localStorage` access behind a closed set of keys.
//!
//! SYSTEM CONTEXT
//! ==============
//! Session, cart, wizard drafts, and small flags survive reloads here. Every
//! key the app writes is a [`StorageKey`], so nothing else in the crate
//! spells a raw key string.
//!
//! TRADE-OFFS
//! ==========
//! Last writer wins and there is no versioning. Unreadable JSON reads as
//! absent. On the server every read is `None` and every write a no-op.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use serde::Serialize;
use serde::de::DeserializeOwned;
use wizard::FlowKind;

const PREFIX: &str = "foodhub";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StorageKey {
    AuthSession,
    CachedUser,
    SignupDraft(FlowKind),
    /// Vendor account id while onboarding is still in progress.
    TemporaryVendorId,
    Cart,
    PendingOrder,
    PasswordResetVerified,
    Theme,
}

impl StorageKey {
    pub fn key(self) -> String {
        match self {
            Self::AuthSession => format!("{PREFIX}.session"),
            Self::CachedUser => format!("{PREFIX}.user"),
            Self::SignupDraft(kind) => format!("{PREFIX}.draft.{}", kind.as_str()),
            Self::TemporaryVendorId => format!("{PREFIX}.vendor_id"),
            Self::Cart => format!("{PREFIX}.cart"),
            Self::PendingOrder => format!("{PREFIX}.pending_order"),
            Self::PasswordResetVerified => format!("{PREFIX}.reset_verified"),
            Self::Theme => format!("{PREFIX}.theme"),
        }
    }
}

#[cfg(feature = "hydrate")]
fn storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

pub fn load_raw(key: StorageKey) -> Option<String> {
    #[cfg(feature = "hydrate")]
    {
        storage()?.get_item(&key.key()).ok().flatten()
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = key;
        None
    }
}

pub fn save_raw(key: StorageKey, value: &str) {
    #[cfg(feature = "hydrate")]
    {
        if let Some(storage) = storage() {
            let _ = storage.set_item(&key.key(), value);
        }
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = (key, value);
    }
}

/// Load a JSON value for `key`.
pub fn load_json<T: DeserializeOwned>(key: StorageKey) -> Option<T> {
    let raw = load_raw(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            log_unreadable(key, &e);
            None
        }
    }
}

/// Save a JSON value for `key`.
pub fn save_json<T: Serialize>(key: StorageKey, value: &T) {
    if let Ok(raw) = serde_json::to_string(value) {
        save_raw(key, &raw);
    }
}

pub fn remove(key: StorageKey) {
    #[cfg(feature = "hydrate")]
    {
        if let Some(storage) = storage() {
            let _ = storage.remove_item(&key.key());
        }
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = key;
    }
}

fn log_unreadable(key: StorageKey, err: &serde_json::Error) {
    leptos::logging::warn!("ignoring unreadable storage entry {}: {err}", key.key());
}
