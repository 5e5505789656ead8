//! Client state management
//!
//! This module contains the shared client state: one session manager and the
//! repositories, all talking through the same transport and device store.

use std::sync::Arc;

use crate::{
    api::{ApiTransport, HttpApiClient},
    config::ClientConfig,
    error::ClientResult,
    repositories::{CampaignRepository, UserRepository},
    services::{AdminService, SessionManager},
    storage::{FileStore, KeyValueStore, LocalState},
};

/// Shared client state
#[derive(Clone)]
pub struct ClientState {
    inner: Arc<ClientStateInner>,
}

/// Inner state (wrapped in Arc for cheap cloning)
struct ClientStateInner {
    /// Client configuration
    config: ClientConfig,

    /// Typed view of the device store
    local: LocalState,

    /// Transport shared by every component
    api: Arc<dyn ApiTransport>,

    session: SessionManager,
    campaigns: CampaignRepository,
    users: UserRepository,
}

impl ClientState {
    /// Create a client talking HTTP to `config.api` and persisting in `store`
    pub fn new(config: ClientConfig, store: Arc<dyn KeyValueStore>) -> ClientResult<Self> {
        let local = LocalState::new(store);
        let api = Arc::new(HttpApiClient::new(&config.api, local.clone())?);
        Ok(Self::with_transport(config, local, api))
    }

    /// Create a client persisting in the file named by `config.storage`
    pub fn from_config(config: ClientConfig) -> ClientResult<Self> {
        let store = Arc::new(FileStore::new(config.storage.path.clone()));
        Self::new(config, store)
    }

    /// Create a client over an arbitrary transport
    pub fn with_transport(config: ClientConfig, local: LocalState, api: Arc<dyn ApiTransport>) -> Self {
        Self {
            inner: Arc::new(ClientStateInner {
                session: SessionManager::new(api.clone(), local.clone()),
                campaigns: CampaignRepository::new(api.clone(), local.clone()),
                users: UserRepository::new(api.clone()),
                config,
                local,
                api,
            }),
        }
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn local(&self) -> &LocalState {
        &self.inner.local
    }

    pub fn api(&self) -> &Arc<dyn ApiTransport> {
        &self.inner.api
    }

    pub fn session(&self) -> &SessionManager {
        &self.inner.session
    }

    pub fn campaigns(&self) -> &CampaignRepository {
        &self.inner.campaigns
    }

    pub fn users(&self) -> &UserRepository {
        &self.inner.users
    }

    /// Admin operations bound to this client's session
    pub fn admin(&self) -> AdminService<'_> {
        AdminService::new(&self.inner.users, &self.inner.session)
    }
}
