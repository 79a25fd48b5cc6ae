//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Each page owns route-scoped orchestration (guards, loading, remote
//! calls) and delegates rendering details to `components`. Every page takes
//! the shared `AppContext` as a prop.

pub mod chat;
pub mod checkout;
pub mod dashboard;
pub mod forgot_password;
pub mod landing;
pub mod login;
pub mod market;
pub mod orders;
pub mod profile;
pub mod signup;
