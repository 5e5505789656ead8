//! Domain models
//!
//! Canonical shapes of users and campaigns plus the wire types they are
//! normalized from.

pub mod campaign;
pub mod envelope;
pub mod reference;
pub mod request;
pub mod user;

pub use campaign::*;
pub use envelope::*;
pub use reference::*;
pub use request::*;
pub use user::*;
