//! Utility helpers shared across client UI modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Browser storage, route paths, access guards, form metadata, and display
//! formatting. Pages and components call these instead of touching
//! `web_sys` or hard-coding paths.

pub mod auth;
pub mod format;
pub mod forms;
pub mod route;
pub mod storage;
pub mod theme;
