//! Campaign client - session and participation layer for volunteer campaigns
//!
//! This library sits between a user interface and the remote campaign API. It
//! owns the signed-in session, normalizes the loosely shaped server payloads,
//! and reconciles server truth with the state kept on the device.
//!
//! # Features
//!
//! - Session restore, login, registration and logout with a cached token
//! - Campaign listing, creation, updates, joining and leaving
//! - Local organizer overrides layered over the server-assigned role
//! - Joined-campaign markers that survive a server that forgets membership
//! - User administration for admins
//!
//! # Architecture
//!
//! The client follows a layered architecture:
//! - **Services**: Session lifecycle and admin workflows
//! - **Repositories**: Remote API access, one per resource
//! - **Participation**: Pure membership and permission rules
//! - **Storage**: Device-local key-value persistence
//! - **Models**: Normalized domain types and their wire forms

pub mod api;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod participation;
pub mod repositories;
pub mod services;
pub mod state;
pub mod storage;
pub mod telemetry;
pub mod utils;

// Re-export commonly used types
pub use config::{CONFIG, ClientConfig};
pub use error::{ClientError, ClientResult};
pub use state::ClientState;
