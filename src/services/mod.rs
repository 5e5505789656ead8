//! Client services

pub mod admin_service;
pub mod session_service;

pub use admin_service::{AdminService, ManagedUser};
pub use session_service::{CurrentUser, SessionManager, SessionState};
