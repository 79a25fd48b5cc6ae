//! Client-side state.
//!
//! SYSTEM CONTEXT
//! ==============
//! `app` holds the signals every page shares. The other modules are plain
//! data types kept in those signals or in page-local ones, so their rules
//! are testable without a browser.

pub mod app;
pub mod cart;
pub mod chat;
pub mod optimistic;
pub mod orders;
pub mod toast;
