//! Session service
//!
//! [`SessionManager`] is the single owner of "who is the current user". It is
//! constructed once and handed to whoever needs it; nothing else keeps its own
//! copy of the session.

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock, watch};
use tracing::{debug, error, info, warn};
use validator::Validate;

use crate::{
    api::{self, ApiTransport, Method},
    constants::{endpoints, messages},
    error::{ClientError, ClientResult},
    models::{AuthPayload, LoginRequest, RegisterRequest, Role, User},
    participation,
    storage::{LocalState, local_state::IdSet},
    utils::validation::{validate_email, validate_password_confirmation, validate_required},
};

/// The signed-in user as the rest of the client should see it
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentUser {
    /// Profile as cached from the server, role untouched
    pub profile: User,
    /// Role after applying the local organizer override
    pub role: Role,
}

impl CurrentUser {
    fn resolve(profile: User, overrides: &IdSet) -> Self {
        let role = participation::effective_role(&profile, overrides);
        Self { profile, role }
    }

    pub fn id(&self) -> &str {
        &self.profile.id
    }

    /// Copy of the profile carrying the effective role
    pub fn resolved_user(&self) -> User {
        User {
            role: self.role,
            ..self.profile.clone()
        }
    }
}

/// Session lifecycle.
///
/// `Unknown` until [`SessionManager::restore_session`] runs; `Authenticated`
/// only when both a token and a cached user exist.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    Unknown,
    Anonymous,
    Authenticated(CurrentUser),
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub fn user(&self) -> Option<&CurrentUser> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

/// Authentication lifecycle and role reconciliation
pub struct SessionManager {
    api: Arc<dyn ApiTransport>,
    local: LocalState,
    state: RwLock<SessionState>,
    last_error: RwLock<Option<ClientError>>,
    /// Token rejections seen by the transport on any request
    rejections: Mutex<watch::Receiver<u64>>,
}

impl SessionManager {
    pub fn new(api: Arc<dyn ApiTransport>, local: LocalState) -> Self {
        let rejections = Mutex::new(local.session_rejections());
        Self {
            api,
            local,
            state: RwLock::new(SessionState::Unknown),
            last_error: RwLock::new(None),
            rejections,
        }
    }

    /// Rebuild the session from the device store without touching the
    /// network. Any storage failure degrades to `Anonymous` and is kept in
    /// [`SessionManager::last_error`].
    pub async fn restore_session(&self) -> SessionState {
        let restored = match self.load_cached_session().await {
            Ok(Some(user)) => SessionState::Authenticated(user),
            Ok(None) => SessionState::Anonymous,
            Err(e) => {
                warn!(error = %e, "Could not restore session");
                *self.last_error.write().await = Some(e);
                SessionState::Anonymous
            }
        };

        debug!(authenticated = restored.is_authenticated(), "Session restored");
        self.rejections.lock().await.mark_unchanged();
        *self.state.write().await = restored.clone();
        restored
    }

    /// Sign in. Blank fields and malformed emails are rejected before any
    /// request is made.
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<CurrentUser> {
        validate_required(&[("Email", email), ("Password", password)])
            .map_err(|field| ClientError::Validation(format!("{} is required", field)))?;
        validate_email(email).map_err(|e| ClientError::Validation(e.to_string()))?;

        let request = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        request.validate()?;

        info!(email = %request.email, "Logging in");
        let response = self
            .api
            .send(Method::Post, endpoints::LOGIN, api::body(&request)?)
            .await?;

        self.complete_auth(response.into_required_data(messages::INVALID_CREDENTIALS))
            .await
    }

    /// Create an account and sign in with it.
    ///
    /// `requested_role` outside the known set registers a plain volunteer.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
        requested_role: &str,
    ) -> ClientResult<CurrentUser> {
        // Local checks, in the order a form reports them
        validate_required(&[
            ("Name", name),
            ("Email", email),
            ("Password", password),
            ("Password confirmation", confirm_password),
        ])
        .map_err(|field| ClientError::Validation(format!("{} is required", field)))?;
        validate_email(email).map_err(|e| ClientError::Validation(e.to_string()))?;
        validate_password_confirmation(password, confirm_password)
            .map_err(|e| ClientError::Validation(e.to_string()))?;

        let request = RegisterRequest {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            password: password.to_string(),
            role: Role::clamp(requested_role),
        };
        request.validate()?;

        info!(email = %request.email, role = %request.role, "Registering account");
        let response = self
            .api
            .send(Method::Post, endpoints::REGISTER, api::body(&request)?)
            .await?;

        self.complete_auth(response.into_required_data(messages::REGISTER_FAILED))
            .await
    }

    /// Drop the cached token and user. The session ends up `Anonymous` even
    /// if the store could not be cleared; that failure is still returned.
    /// Joined markers and organizer overrides are kept.
    pub async fn logout(&self) -> ClientResult<()> {
        let cleared = self.local.clear_session().await;
        *self.state.write().await = SessionState::Anonymous;

        match &cleared {
            Ok(()) => info!("Logged out"),
            Err(e) => error!(error = %e, "Could not clear cached session on logout"),
        }
        cleared
    }

    /// Re-fetch the profile to pick up server-side role or active changes.
    ///
    /// On failure the cached user is left as it was. A `401` ends the session.
    pub async fn refresh_profile(&self) -> ClientResult<CurrentUser> {
        let result = async {
            let response = self.api.send(Method::Get, endpoints::PROFILE, None).await?;
            let data = response.into_required_data(messages::PROFILE_FAILED)?;
            User::from_payload(data)
        }
        .await;

        let profile = match result {
            Ok(profile) => profile,
            Err(ClientError::Unauthorized(message)) => {
                self.handle_unauthorized().await;
                return Err(ClientError::Unauthorized(message));
            }
            Err(e) => {
                warn!(error = %e, "Could not refresh profile");
                return Err(e);
            }
        };

        self.local.set_cached_user(&profile).await?;
        let current = CurrentUser::resolve(profile, &self.overrides_or_empty().await);
        debug!(user_id = %current.id(), role = %current.role, "Profile refreshed");

        *self.state.write().await = SessionState::Authenticated(current.clone());
        Ok(current)
    }

    /// Add or remove a user from the local organizer override set. No request
    /// is sent. When the target is the signed-in user, the session picks up
    /// the new effective role right away.
    pub async fn set_organizer_override(&self, user_id: &str, is_organizer: bool) -> ClientResult<IdSet> {
        self.sync_rejections().await;
        let overrides = self.local.set_organizer_override(user_id, is_organizer).await?;
        info!(user_id = %user_id, is_organizer, "Organizer override updated");

        let mut state = self.state.write().await;
        let updated = match &*state {
            SessionState::Authenticated(current) if current.id() == user_id => {
                Some(CurrentUser::resolve(current.profile.clone(), &overrides))
            }
            _ => None,
        };
        if let Some(current) = updated {
            *state = SessionState::Authenticated(current);
        }

        Ok(overrides)
    }

    pub async fn organizer_overrides(&self) -> ClientResult<IdSet> {
        self.local.organizer_overrides().await
    }

    /// Forced logout after the server rejected the token. The HTTP transport
    /// does this on its own for every `401`; other transports can call it
    /// directly.
    pub async fn handle_unauthorized(&self) {
        warn!("Session rejected by server");
        if let Err(e) = self.local.clear_session().await {
            error!(error = %e, "Could not clear cached session");
        }
        self.rejections.lock().await.mark_unchanged();
        *self.state.write().await = SessionState::Anonymous;
    }

    pub async fn state(&self) -> SessionState {
        self.sync_rejections().await;
        self.state.read().await.clone()
    }

    pub async fn current_user(&self) -> Option<CurrentUser> {
        self.sync_rejections().await;
        self.state.read().await.user().cloned()
    }

    /// Check if the signed-in user acts as an admin
    pub async fn is_admin(&self) -> bool {
        self.sync_rejections().await;
        self.state
            .read()
            .await
            .user()
            .is_some_and(|user| user.role == Role::Admin)
    }

    /// Last non-fatal error recorded by `restore_session`
    pub async fn last_error(&self) -> Option<ClientError> {
        self.last_error.read().await.clone()
    }

    async fn load_cached_session(&self) -> ClientResult<Option<CurrentUser>> {
        let token = self.local.token().await?;
        let user = self.local.cached_user().await?;

        match (token, user) {
            (Some(_), Some(user)) => {
                let overrides = self.local.organizer_overrides().await?;
                Ok(Some(CurrentUser::resolve(user, &overrides)))
            }
            (token, user) => {
                if token.is_some() != user.is_some() {
                    debug!(
                        has_token = token.is_some(),
                        has_user = user.is_some(),
                        "Partial session in store, treating as signed out"
                    );
                }
                Ok(None)
            }
        }
    }

    /// Persist token then user, resolve the effective role and switch to
    /// `Authenticated`. Nothing is written when the request failed.
    async fn complete_auth(&self, data: ClientResult<serde_json::Value>) -> ClientResult<CurrentUser> {
        let data = data.inspect_err(|e| warn!(code = e.error_code(), error = %e, "Authentication rejected"))?;

        let payload: AuthPayload =
            serde_json::from_value(data).map_err(|e| ClientError::MalformedPayload(e.to_string()))?;
        let profile = User::from_payload(payload.user)?;
        if payload.token.is_empty() {
            return Err(ClientError::MalformedPayload("authentication without token".to_string()));
        }

        self.local.set_token(&payload.token).await?;
        self.local.set_cached_user(&profile).await?;

        let current = CurrentUser::resolve(profile, &self.overrides_or_empty().await);
        info!(user_id = %current.id(), role = %current.role, "Authenticated");

        // Rejections of the previous token do not apply to the new one
        self.rejections.lock().await.mark_unchanged();
        *self.state.write().await = SessionState::Authenticated(current.clone());
        Ok(current)
    }

    /// Drop to `Anonymous` when the transport rejected the token since the
    /// last check. The store was already cleared by the transport.
    async fn sync_rejections(&self) {
        let rejected = {
            let mut rejections = self.rejections.lock().await;
            let changed = rejections.has_changed().unwrap_or(false);
            rejections.mark_unchanged();
            changed
        };

        if rejected {
            let mut state = self.state.write().await;
            if state.is_authenticated() {
                warn!("Session rejected by server, signing out");
                *state = SessionState::Anonymous;
            }
        }
    }

    async fn overrides_or_empty(&self) -> IdSet {
        self.local.organizer_overrides().await.unwrap_or_else(|e| {
            warn!(error = %e, "Could not read organizer overrides");
            IdSet::new()
        })
    }
}
