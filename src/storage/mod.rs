//! Device-local key-value persistence
//!
//! The store itself is an opaque string map. [`LocalState`] layers the
//! client's typed keys (session token, cached user, joined markers, organizer
//! overrides) on top of it.

pub mod file;
pub mod local_state;
pub mod memory;

use async_trait::async_trait;

use crate::error::ClientResult;

pub use file::FileStore;
pub use local_state::LocalState;
pub use memory::MemoryStore;

/// String-keyed, string-valued persistent store
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` when the key was never written or was removed
    async fn get(&self, key: &str) -> ClientResult<Option<String>>;

    /// Write a value, replacing any previous one
    async fn set(&self, key: &str, value: &str) -> ClientResult<()>;

    /// Remove a key. Removing a missing key succeeds.
    async fn remove(&self, key: &str) -> ClientResult<()>;
}
