//! User repository (admin endpoints)

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::{
    api::{self, ApiTransport, Method},
    constants::{endpoints, messages},
    error::ClientResult,
    models::{ActiveUpdate, Role, RoleUpdate, User},
};

/// Repository for user administration API operations
#[derive(Clone)]
pub struct UserRepository {
    api: Arc<dyn ApiTransport>,
}

impl UserRepository {
    pub fn new(api: Arc<dyn ApiTransport>) -> Self {
        Self { api }
    }

    /// All accounts. Any failure yields an empty list; entries that cannot be
    /// normalized are skipped.
    pub async fn list_users(&self) -> Vec<User> {
        let data = match self.api.send(Method::Get, endpoints::USERS, None).await {
            Ok(response) => response.into_data(messages::CONNECTION),
            Err(e) => Err(e),
        };

        let items = match data {
            Ok(Some(serde_json::Value::Array(items))) => items,
            Ok(_) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "Could not fetch users");
                return Vec::new();
            }
        };

        items
            .into_iter()
            .filter_map(|item| match User::from_payload(item) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!(error = %e, "Skipping malformed user");
                    None
                }
            })
            .collect()
    }

    /// Change a user's server-side role
    pub async fn update_role(&self, user_id: &str, role: Role) -> ClientResult<Option<User>> {
        info!(user_id = %user_id, role = %role, "Updating user role");
        let body = api::body(&RoleUpdate { role })?;
        self.write(&endpoints::user_role(user_id), body, messages::ROLE_FAILED)
            .await
            .inspect_err(|e| error!(user_id = %user_id, code = e.error_code(), error = %e, "Role update failed"))
    }

    /// Enable or disable an account
    pub async fn set_active(&self, user_id: &str, active: bool) -> ClientResult<Option<User>> {
        info!(user_id = %user_id, active, "Updating user active state");
        let body = api::body(&ActiveUpdate { active })?;
        self.write(&endpoints::user_active(user_id), body, messages::ACTIVE_FAILED)
            .await
            .inspect_err(|e| error!(user_id = %user_id, code = e.error_code(), error = %e, "Active update failed"))
    }

    async fn write(
        &self,
        path: &str,
        body: Option<serde_json::Value>,
        fallback: &str,
    ) -> ClientResult<Option<User>> {
        let response = self.api.send(Method::Patch, path, body).await?;
        response
            .into_data(fallback)?
            .map(User::from_payload)
            .transpose()
    }
}
