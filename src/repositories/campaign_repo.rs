//! Campaign repository

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, error, info, warn};
use validator::Validate;

use crate::{
    api::{self, ApiTransport, Method},
    constants::{endpoints, messages},
    error::ClientResult,
    models::{
        AttendanceUpdate, Campaign, CampaignStatus, CreateCampaignRequest, Role,
        UpdateCampaignRequest, User,
    },
    participation,
    storage::{LocalState, local_state::IdSet},
};

/// Repository for campaign API operations
#[derive(Clone)]
pub struct CampaignRepository {
    api: Arc<dyn ApiTransport>,
    local: LocalState,
}

impl CampaignRepository {
    pub fn new(api: Arc<dyn ApiTransport>, local: LocalState) -> Self {
        Self { api, local }
    }

    // =========================================================================
    // Reads: never fail, degrade to empty
    // =========================================================================

    /// All campaigns. Any failure yields an empty list.
    pub async fn list_all(&self) -> Vec<Campaign> {
        match self.fetch_list(endpoints::EVENTS).await {
            Ok(campaigns) => {
                debug!(count = campaigns.len(), "Fetched campaigns");
                campaigns
            }
            Err(e) => {
                warn!(error = %e, "Could not fetch campaigns");
                Vec::new()
            }
        }
    }

    /// One campaign, `None` when the server reports failure, sends no
    /// payload, or the payload cannot be normalized.
    pub async fn get_by_id(&self, id: &str) -> Option<Campaign> {
        let response = match self.api.send(Method::Get, &endpoints::event(id), None).await {
            Ok(response) => response,
            Err(e) => {
                warn!(event_id = %id, error = %e, "Could not fetch campaign");
                return None;
            }
        };

        let data = match response.into_data(messages::CONNECTION) {
            Ok(Some(data)) => data,
            Ok(None) => {
                debug!(event_id = %id, "Campaign response without data");
                return None;
            }
            Err(e) => {
                debug!(event_id = %id, error = %e, "Campaign not found");
                return None;
            }
        };

        match Campaign::from_payload(data) {
            Ok(campaign) => Some(campaign),
            Err(e) => {
                warn!(event_id = %id, error = %e, "Discarding malformed campaign");
                None
            }
        }
    }

    /// Campaigns created by the caller.
    ///
    /// Uses the dedicated endpoint and falls back to filtering the full list
    /// by creator when it fails. With a `user_id` the result is always
    /// restricted to that creator; without one the fallback has nothing to
    /// filter by and yields an empty list.
    pub async fn list_mine(&self, user_id: Option<&str>) -> Vec<Campaign> {
        let campaigns = match self.fetch_list(endpoints::MY_EVENTS).await {
            Ok(campaigns) => campaigns,
            Err(e) => {
                warn!(error = %e, "Own campaigns endpoint failed, filtering full list");
                if user_id.is_none() {
                    return Vec::new();
                }
                self.list_all().await
            }
        };

        match user_id {
            Some(user_id) => campaigns
                .into_iter()
                .filter(|c| c.creator_id() == Some(user_id))
                .collect(),
            None => campaigns,
        }
    }

    /// Campaigns the user has not joined. Summaries are populated first so
    /// membership can be checked.
    pub async fn available_for(&self, user_id: &str) -> Vec<Campaign> {
        let all = self.populate_participants(self.list_all().await).await;
        participation::available_campaigns(&all, user_id)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Replace list entries that report members without listing them by the
    /// full record. Entries whose fetch fails are kept as they were.
    pub async fn populate_participants(&self, campaigns: Vec<Campaign>) -> Vec<Campaign> {
        join_all(campaigns.into_iter().map(|campaign| async move {
            if !campaign.has_unpopulated_participants() {
                return campaign;
            }
            match self.get_by_id(&campaign.id).await {
                Some(full) => full,
                None => campaign,
            }
        }))
        .await
    }

    /// Volunteer view of joined campaigns for `user`.
    ///
    /// Organizers and admins (after applying `overrides`) get an empty list
    /// without any network call.
    pub async fn joined_view(&self, user: &User, overrides: &IdSet) -> Vec<Campaign> {
        let role = participation::effective_role(user, overrides);
        if role != Role::User {
            return Vec::new();
        }

        let all = self.populate_participants(self.list_all().await).await;
        let markers = self.local.joined_markers(&user.id).await.unwrap_or_else(|e| {
            warn!(user_id = %user.id, error = %e, "Could not read joined markers");
            IdSet::new()
        });

        participation::joined_campaigns(&all, user, role, &markers)
            .into_iter()
            .cloned()
            .collect()
    }

    // =========================================================================
    // Writes: failures propagate
    // =========================================================================

    /// Create a campaign. Nothing is checked locally; the server is the judge.
    pub async fn create(&self, request: &CreateCampaignRequest) -> ClientResult<Campaign> {
        info!(title = %request.title, "Creating campaign");
        let result = async {
            let response = self
                .api
                .send(Method::Post, endpoints::EVENTS, api::body(request)?)
                .await?;
            let data = response.into_required_data(messages::CREATE_FAILED)?;
            Campaign::from_payload(data)
        }
        .await;

        Self::log_write("create", None, result)
    }

    /// Validate the form locally, then create
    pub async fn create_validated(&self, request: &CreateCampaignRequest) -> ClientResult<Campaign> {
        request.validate()?;
        self.create(request).await
    }

    /// Partial update; only the fields set in `request` are sent
    pub async fn update(&self, id: &str, request: &UpdateCampaignRequest) -> ClientResult<Option<Campaign>> {
        let result = self
            .write(Method::Put, &endpoints::event(id), api::body(request)?, messages::UPDATE_FAILED)
            .await;
        Self::log_write("update", Some(id), result)
    }

    pub async fn update_status(&self, id: &str, status: CampaignStatus) -> ClientResult<Option<Campaign>> {
        let body = api::body(&UpdateCampaignRequest::status(status))?;
        let result = self
            .write(Method::Put, &endpoints::event(id), body, messages::STATUS_FAILED)
            .await;
        Self::log_write("update_status", Some(id), result)
    }

    /// Hard delete. Returns `true` on success; a refusal is an error, never a
    /// quiet `false`.
    pub async fn delete(&self, id: &str) -> ClientResult<bool> {
        let result = async {
            let response = self.api.send(Method::Delete, &endpoints::event(id), None).await?;
            response.into_data(messages::DELETE_FAILED)?;
            Ok(true)
        }
        .await;
        Self::log_write("delete", Some(id), result)
    }

    /// Join a campaign as the current user.
    ///
    /// Whenever the server accepts the join the device records a joined
    /// marker for the cached user, even if the returned campaign is unreadable.
    /// Use [`crate::error::ClientError::is_already_participating`] on the error to tell a
    /// duplicate join apart.
    pub async fn join(&self, id: &str) -> ClientResult<Option<Campaign>> {
        let result = self
            .write(Method::Post, &endpoints::join(id), None, messages::JOIN_FAILED)
            .await;
        let result = Self::log_write("join", Some(id), result)?;

        self.mark_joined(id, true).await;
        Ok(result)
    }

    /// Leave a campaign as the current user.
    ///
    /// The joined marker is dropped on success and also when the server says
    /// the user was not a participant, since the marker is stale then.
    pub async fn leave(&self, id: &str) -> ClientResult<Option<Campaign>> {
        let result = self
            .write(Method::Post, &endpoints::leave(id), None, messages::LEAVE_FAILED)
            .await;

        match Self::log_write("leave", Some(id), result) {
            Ok(campaign) => {
                self.mark_joined(id, false).await;
                Ok(campaign)
            }
            Err(e) if e.is_not_participating() => {
                self.mark_joined(id, false).await;
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Join, treating "already participating" as a cue to re-sync: the
    /// campaign is fetched again and the joined marker recorded.
    pub async fn join_or_resync(&self, id: &str) -> ClientResult<Option<Campaign>> {
        match self.join(id).await {
            Ok(campaign) => Ok(campaign),
            Err(e) if e.is_already_participating() => {
                info!(event_id = %id, "Already participating, re-syncing campaign");
                self.mark_joined(id, true).await;
                Ok(self.get_by_id(id).await)
            }
            Err(e) => Err(e),
        }
    }

    /// Mark a participant's attendance. Failures are reported as `false`.
    pub async fn set_attendance(&self, event_id: &str, participant_id: &str, attended: bool) -> bool {
        let body = match api::body(&AttendanceUpdate { attended }) {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "Could not encode attendance update");
                return false;
            }
        };

        let path = endpoints::attendance(event_id, participant_id);
        match self.api.send(Method::Patch, &path, body).await {
            Ok(response) if response.is_success() => true,
            Ok(response) => {
                warn!(
                    event_id = %event_id,
                    participant_id = %participant_id,
                    message = response.envelope.message.as_deref().unwrap_or_default(),
                    "Attendance update rejected"
                );
                false
            }
            Err(e) => {
                warn!(event_id = %event_id, error = %e, "Attendance update failed");
                false
            }
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn fetch_list(&self, path: &str) -> ClientResult<Vec<Campaign>> {
        let response = self.api.send(Method::Get, path, None).await?;
        Ok(response
            .into_data(messages::CONNECTION)?
            .map(Campaign::list_from_payload)
            .unwrap_or_default())
    }

    async fn write(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
        fallback: &str,
    ) -> ClientResult<Option<Campaign>> {
        let response = self.api.send(method, path, body).await?;
        let Some(data) = response.into_data(fallback)? else {
            return Ok(None);
        };

        // The write went through; an unreadable echo only loses the echo
        match Campaign::from_payload(data) {
            Ok(campaign) => Ok(Some(campaign)),
            Err(e) => {
                warn!(method = %method, path = %path, error = %e, "Write accepted with unreadable campaign");
                Ok(None)
            }
        }
    }

    fn log_write<T>(operation: &str, id: Option<&str>, result: ClientResult<T>) -> ClientResult<T> {
        if let Err(e) = &result {
            error!(
                operation,
                event_id = id.unwrap_or_default(),
                code = e.error_code(),
                error = %e,
                "Campaign write failed"
            );
        }
        result
    }

    async fn mark_joined(&self, campaign_id: &str, joined: bool) {
        let user = match self.local.cached_user().await {
            Ok(Some(user)) => user,
            Ok(None) => return,
            Err(e) => {
                warn!(error = %e, "Could not read cached user for joined marker");
                return;
            }
        };

        let outcome = if joined {
            self.local.add_joined_marker(&user.id, campaign_id).await
        } else {
            self.local.remove_joined_marker(&user.id, campaign_id).await
        };
        if let Err(e) = outcome {
            warn!(event_id = %campaign_id, error = %e, "Could not update joined marker");
        }
    }
}
