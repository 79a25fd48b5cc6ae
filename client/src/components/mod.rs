//! Reusable UI component modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components render shared chrome (navigation, toasts) and the building
//! blocks of the registration wizards and order screens. They take the
//! `AppContext` or plain signals as props.

pub mod field_input;
pub mod nav_bar;
pub mod order_card;
pub mod step_indicator;
pub mod toast_host;
pub mod wizard_view;
