//! Participation and authorization rules
//!
//! Pure functions over normalized campaigns and users. Nothing here touches
//! the network or the device store; callers load the inputs and hand them in.

use crate::constants::messages;
use crate::models::{Campaign, Participant, Role, User};
use crate::storage::local_state::IdSet;
use crate::utils::time::compare_dates;

/// Identifier of the participating user, whichever shape `userId` had.
/// Empty when the record carries no id.
pub fn participant_identifier(participant: &Participant) -> &str {
    participant.user.id()
}

/// Populated name of the participant, or a generic label
pub fn participant_display_name(participant: &Participant) -> &str {
    participant
        .user
        .name()
        .unwrap_or(messages::UNKNOWN_PARTICIPANT)
}

/// Exact, case-sensitive match of `user_id` against the participant list.
/// An empty id never matches.
pub fn is_participant(campaign: &Campaign, user_id: &str) -> bool {
    !user_id.is_empty()
        && campaign
            .participants
            .iter()
            .any(|p| participant_identifier(p) == user_id)
}

/// Fallback used by the joined view: some endpoints flatten the member's
/// email onto the participant record instead of populating `userId`.
pub fn is_participant_by_email(campaign: &Campaign, email: &str) -> bool {
    !email.is_empty()
        && campaign.participants.iter().any(|p| {
            p.email.as_deref() == Some(email) || p.user.email() == Some(email)
        })
}

/// Progress towards the participation goal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// `current_progress / target_goal * 100`, unclamped
    pub raw: f64,
    /// `raw` clamped to `[0, 100]` for display
    pub display: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ProgressError {
    #[error("campaign has no target goal")]
    ZeroGoal,
}

/// Percentage of the goal reached.
///
/// A zero goal has no meaningful percentage; it is returned as an error so
/// the caller decides what to show.
pub fn progress_percentage(campaign: &Campaign) -> Result<Progress, ProgressError> {
    if campaign.target_goal == 0 {
        return Err(ProgressError::ZeroGoal);
    }

    let raw = f64::from(campaign.current_progress) * 100.0 / f64::from(campaign.target_goal);
    Ok(Progress {
        raw,
        display: raw.clamp(0.0, 100.0),
    })
}

/// Role the UI should act on: a local organizer override for this user wins
/// over the server role. The user record is not modified.
pub fn effective_role(user: &User, overrides: &IdSet) -> Role {
    if overrides.contains(&user.id) {
        Role::Organizer
    } else {
        user.role
    }
}

/// Copy of `user` carrying its effective role
pub fn apply_organizer_override(user: &User, overrides: &IdSet) -> User {
    User {
        role: effective_role(user, overrides),
        ..user.clone()
    }
}

pub fn can_manage_campaigns(role: Role) -> bool {
    role == Role::Admin
}

pub fn can_mark_attendance(role: Role) -> bool {
    matches!(role, Role::Admin | Role::Organizer)
}

/// Active and not already joined
pub fn is_joinable(campaign: &Campaign, user_id: &str) -> bool {
    campaign.is_active() && !is_participant(campaign, user_id)
}

/// Campaigns the user has not joined, for the general browse list
pub fn available_campaigns<'a>(all: &'a [Campaign], user_id: &str) -> Vec<&'a Campaign> {
    all.iter().filter(|c| !is_participant(c, user_id)).collect()
}

/// Campaigns created by `user_id`
pub fn campaigns_created_by<'a>(all: &'a [Campaign], user_id: &str) -> Vec<&'a Campaign> {
    all.iter()
        .filter(|c| c.creator_id() == Some(user_id))
        .collect()
}

/// Volunteer view of joined campaigns, sorted by date ascending.
///
/// A campaign counts as joined when the participant list says so or when the
/// device holds a joined marker for it. Organizers and admins get an empty
/// list.
pub fn joined_campaigns<'a>(
    all: &'a [Campaign],
    user: &User,
    effective_role: Role,
    markers: &IdSet,
) -> Vec<&'a Campaign> {
    if effective_role != Role::User {
        return Vec::new();
    }

    let mut joined: Vec<&Campaign> = all
        .iter()
        .filter(|c| {
            markers.contains(&c.id)
                || is_participant(c, &user.id)
                || is_participant_by_email(c, &user.email)
        })
        .collect();

    joined.sort_by(|a, b| compare_dates(&a.date, &b.date));
    joined
}
