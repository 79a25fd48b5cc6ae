//! # client
//!
//! Leptos + WASM frontend for the FoodHub marketplace.
//!
//! This crate contains pages, components, application state, and the
//! backend/realtime bridges. Registration screens are thin views over the
//! `wizard` crate; every remote call goes through `backend::repo::Repo` on
//! the reqwest-backed `SupabaseClient`.
//!
//! Rendering happens twice: the server crate renders `app::shell` for the
//! first paint, and [`hydrate`] attaches the same tree in the browser.
//! Storage, timers, and network calls only run under the `hydrate` feature.

pub mod app;
pub mod components;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Debug).is_err() {
        leptos::logging::warn!("console logger already installed");
    }
    leptos::mount::hydrate_body(app::App);
}
