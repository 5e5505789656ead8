//! Typed view over the device-local store

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::warn;

use crate::constants::storage_keys;
use crate::error::ClientResult;
use crate::models::User;
use crate::storage::KeyValueStore;

/// A set of identifiers persisted as a JSON array
pub type IdSet = BTreeSet<String>;

/// Session cache and device-scoped markers.
///
/// Session keys (token, cached user) are cleared on logout; joined markers and
/// organizer overrides are device state and survive it.
///
/// Clones share a rejection counter: every time the server rejects the
/// session token it is bumped, and subscribers see the change.
#[derive(Clone)]
pub struct LocalState {
    store: Arc<dyn KeyValueStore>,
    rejections: Arc<watch::Sender<u64>>,
}

impl LocalState {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let (rejections, _) = watch::channel(0);
        Self {
            store,
            rejections: Arc::new(rejections),
        }
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    // =========================================================================
    // Session
    // =========================================================================

    pub async fn token(&self) -> ClientResult<Option<String>> {
        Ok(self
            .store
            .get(storage_keys::TOKEN)
            .await?
            .filter(|token| !token.is_empty()))
    }

    pub async fn set_token(&self, token: &str) -> ClientResult<()> {
        self.store.set(storage_keys::TOKEN, token).await
    }

    /// Cached profile. A value that no longer parses is reported as an error
    /// rather than silently treated as "logged out".
    pub async fn cached_user(&self) -> ClientResult<Option<User>> {
        match self.store.get(storage_keys::USER).await? {
            Some(raw) if !raw.is_empty() => Ok(Some(serde_json::from_str(&raw)?)),
            _ => Ok(None),
        }
    }

    pub async fn set_cached_user(&self, user: &User) -> ClientResult<()> {
        let raw = serde_json::to_string(user)?;
        self.store.set(storage_keys::USER, &raw).await
    }

    /// Remove token and cached user. Both removals are attempted even when the
    /// first fails; the first error is returned.
    pub async fn clear_session(&self) -> ClientResult<()> {
        let token = self.store.remove(storage_keys::TOKEN).await;
        let user = self.store.remove(storage_keys::USER).await;
        token.and(user)
    }

    /// Record that the server rejected the session token
    pub fn signal_session_rejected(&self) {
        self.rejections.send_modify(|count| *count += 1);
    }

    /// Watch for session rejections. Rejections signalled before the call are
    /// already marked as seen.
    pub fn session_rejections(&self) -> watch::Receiver<u64> {
        self.rejections.subscribe()
    }

    // =========================================================================
    // Organizer overrides
    // =========================================================================

    pub async fn organizer_overrides(&self) -> ClientResult<IdSet> {
        self.read_set(storage_keys::ORGANIZERS).await
    }

    /// Add or remove one user from the override set. Setting the current
    /// value again is a no-op write.
    pub async fn set_organizer_override(&self, user_id: &str, is_organizer: bool) -> ClientResult<IdSet> {
        let mut overrides = self.organizer_overrides().await?;
        if is_organizer {
            overrides.insert(user_id.to_string());
        } else {
            overrides.remove(user_id);
        }
        self.write_set(storage_keys::ORGANIZERS, &overrides).await?;
        Ok(overrides)
    }

    // =========================================================================
    // Joined markers
    // =========================================================================

    pub async fn joined_markers(&self, user_id: &str) -> ClientResult<IdSet> {
        if user_id.is_empty() {
            return Ok(IdSet::new());
        }
        self.read_set(&storage_keys::joined_events(user_id)).await
    }

    pub async fn add_joined_marker(&self, user_id: &str, campaign_id: &str) -> ClientResult<()> {
        let key = storage_keys::joined_events(user_id);
        let mut markers = self.read_set(&key).await?;
        if markers.insert(campaign_id.to_string()) {
            self.write_set(&key, &markers).await?;
        }
        Ok(())
    }

    pub async fn remove_joined_marker(&self, user_id: &str, campaign_id: &str) -> ClientResult<()> {
        let key = storage_keys::joined_events(user_id);
        let mut markers = self.read_set(&key).await?;
        if markers.remove(campaign_id) {
            self.write_set(&key, &markers).await?;
        }
        Ok(())
    }

    async fn read_set(&self, key: &str) -> ClientResult<IdSet> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(IdSet::new());
        };

        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(ids) => Ok(ids.into_iter().filter(|id| !id.is_empty()).collect()),
            Err(e) => {
                warn!(key, error = %e, "Discarding unreadable id list");
                Ok(IdSet::new())
            }
        }
    }

    async fn write_set(&self, key: &str, ids: &IdSet) -> ClientResult<()> {
        let raw = serde_json::to_string(ids)?;
        self.store.set(key, &raw).await
    }
}
