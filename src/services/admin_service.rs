//! Admin service

use tracing::{info, warn};

use crate::{
    error::ClientResult,
    models::{Role, User},
    participation,
    repositories::UserRepository,
    services::SessionManager,
    storage::local_state::IdSet,
};

/// An account as shown on the admin user list
#[derive(Debug, Clone, PartialEq)]
pub struct ManagedUser {
    pub user: User,
    /// Role after the local organizer override
    pub effective_role: Role,
    /// Whether the role comes from the local override list
    pub overridden: bool,
}

/// Admin operations over user accounts
pub struct AdminService<'a> {
    users: &'a UserRepository,
    session: &'a SessionManager,
}

impl<'a> AdminService<'a> {
    pub fn new(users: &'a UserRepository, session: &'a SessionManager) -> Self {
        Self { users, session }
    }

    /// List all users with their effective roles
    pub async fn list_users(&self) -> Vec<ManagedUser> {
        let overrides = self.overrides().await;

        self.users
            .list_users()
            .await
            .into_iter()
            .map(|user| ManagedUser {
                effective_role: participation::effective_role(&user, &overrides),
                overridden: overrides.contains(&user.id),
                user,
            })
            .collect()
    }

    /// Flip a user between organizer and volunteer.
    ///
    /// The role change is sent to the server, and the local override list is
    /// updated whatever the server answers.
    pub async fn toggle_organizer(&self, user: &User) -> ClientResult<IdSet> {
        let is_organizer = self.overrides().await.contains(&user.id);
        let new_role = if is_organizer { Role::User } else { Role::Organizer };

        // Server role first; the local list is advisory either way
        if let Err(e) = self.users.update_role(&user.id, new_role).await {
            warn!(user_id = %user.id, error = %e, "Server rejected role change, applying locally");
        }

        let overrides = self
            .session
            .set_organizer_override(&user.id, new_role == Role::Organizer)
            .await?;
        info!(user_id = %user.id, role = %new_role, "Organizer toggled");
        Ok(overrides)
    }

    /// Enable a disabled account or disable an enabled one. An account that
    /// never reported its state is treated as disabled.
    pub async fn toggle_active(&self, user: &User) -> ClientResult<Option<User>> {
        let active = !user.active.unwrap_or(false);
        self.users.set_active(&user.id, active).await
    }

    async fn overrides(&self) -> IdSet {
        self.session.organizer_overrides().await.unwrap_or_else(|e| {
            warn!(error = %e, "Could not read organizer overrides");
            IdSet::new()
        })
    }
}
