//! Networking modules for the hosted backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` builds the HTTP backend client and bridges browser files into
//! attachments; `realtime` runs the websocket channel for chat.

pub mod api;
pub mod realtime;
