//! Light/dark theme preference.
//!
//! Reads the stored preference, falling back to the system colour scheme,
//! and applies it as a `data-theme` attribute on `<html>`. Role accents are
//! a second attribute, `data-role`, so each portal keeps its colours in
//! either theme.
//!
//! TRADE-OFFS
//! ==========
//! Persistence is best-effort and browser-only; SSR renders the light theme.

#[cfg(test)]
#[path = "theme_test.rs"]
mod theme_test;

use backend::Role;
use serde::{Deserialize, Serialize};

use super::storage::{self, StorageKey};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

/// Stored preference, else the system preference, else light.
pub fn read_preference() -> Theme {
    if let Some(theme) = storage::load_json::<Theme>(StorageKey::Theme) {
        return theme;
    }
    #[cfg(feature = "hydrate")]
    {
        let prefers_dark = web_sys::window()
            .and_then(|w| w.match_media("(prefers-color-scheme: dark)").ok().flatten())
            .is_some_and(|mq| mq.matches());
        if prefers_dark {
            return Theme::Dark;
        }
    }
    Theme::Light
}

pub fn persist(theme: Theme) {
    storage::save_json(StorageKey::Theme, &theme);
}

/// Set `data-theme` and `data-role` on the `<html>` element.
pub fn apply(theme: Theme, role: Option<Role>) {
    #[cfg(feature = "hydrate")]
    {
        if let Some(el) = web_sys::window().and_then(|w| w.document()).and_then(|d| d.document_element()) {
            let _ = el.set_attribute("data-theme", theme.as_str());
            let _ = el.set_attribute("data-role", role.map_or("guest", Role::as_str));
        }
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = (theme, role);
    }
}

/// Flip, apply, and persist. Returns the new theme.
pub fn toggle(current: Theme, role: Option<Role>) -> Theme {
    let next = current.toggled();
    apply(next, role);
    persist(next);
    next
}
