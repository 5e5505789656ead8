//! Campaign (event) model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::models::reference::Reference;
use crate::utils::time::parse_datetime;

/// Lifecycle status of a campaign. Only active campaigns accept joins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    #[default]
    Active,
    Completed,
    Cancelled,
}

impl CampaignStatus {
    pub fn parse(status: &str) -> Option<Self> {
        match status {
            "active" => Some(Self::Active),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a campaign collects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Food,
    Clothes,
    Books,
    Toys,
    Medical,
    #[default]
    Other,
}

impl Category {
    /// Unknown categories fall into `Other`
    pub fn parse(category: &str) -> Self {
        match category {
            "food" => Self::Food,
            "clothes" => Self::Clothes,
            "books" => Self::Books,
            "toys" => Self::Toys,
            "medical" => Self::Medical,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Clothes => "clothes",
            Self::Books => "books",
            Self::Toys => "toys",
            Self::Medical => "medical",
            Self::Other => "other",
        }
    }
}

/// Membership record of a user within a campaign
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawParticipant", into = "RawParticipant")]
pub struct Participant {
    pub user: Reference,
    /// Id of the membership record itself, used for attendance updates
    pub id: Option<String>,
    /// Set by the server at join time
    pub joined_at: Option<String>,
    pub attended: Option<bool>,
    /// Some endpoints flatten the user's email onto the record
    pub email: Option<String>,
}

impl Participant {
    pub fn new(user: Reference) -> Self {
        Self {
            user,
            id: None,
            joined_at: None,
            attended: None,
            email: None,
        }
    }
}

/// Normalized campaign
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCampaign", into = "RawCampaign")]
pub struct Campaign {
    pub id: String,
    pub title: String,
    pub description: String,
    pub location: String,
    /// Free-text organizer display name
    pub organizer: String,
    pub category: Category,
    /// ISO-8601 instant
    pub date: String,
    pub target_goal: u32,
    /// Authoritative for progress display; may diverge from `participants.len()`
    pub current_progress: u32,
    pub status: CampaignStatus,
    pub created_by: Option<Reference>,
    /// Join order is preserved
    pub participants: Vec<Participant>,
    /// Count reported by list endpoints that omit the participant array
    pub participants_count: Option<u32>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Campaign {
    /// Normalize one raw JSON campaign
    pub fn from_payload(payload: serde_json::Value) -> Result<Self, ClientError> {
        serde_json::from_value(payload).map_err(|e| ClientError::MalformedPayload(e.to_string()))
    }

    /// Normalize a raw JSON list, skipping (and logging) entries that cannot
    /// be normalized so one bad record does not hide the rest.
    pub fn list_from_payload(payload: serde_json::Value) -> Vec<Self> {
        let items = match payload {
            serde_json::Value::Array(items) => items,
            serde_json::Value::Null => return Vec::new(),
            other => {
                tracing::warn!(kind = json_kind(&other), "Campaign list payload is not an array");
                return Vec::new();
            }
        };

        items
            .into_iter()
            .filter_map(|item| match Self::from_payload(item) {
                Ok(campaign) => Some(campaign),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping malformed campaign");
                    None
                }
            })
            .collect()
    }

    /// Parsed `date`, if it is a valid instant
    pub fn date_time(&self) -> Option<DateTime<Utc>> {
        parse_datetime(&self.date)
    }

    /// Identifier of the creating user, whichever shape `createdBy` had
    pub fn creator_id(&self) -> Option<&str> {
        self.created_by.as_ref().map(Reference::id).filter(|id| !id.is_empty())
    }

    pub fn is_active(&self) -> bool {
        self.status == CampaignStatus::Active
    }

    /// The list endpoint reported members but did not include them
    pub fn has_unpopulated_participants(&self) -> bool {
        self.participants.is_empty() && self.participants_count.unwrap_or(0) > 0
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Wire form of [`Participant`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawParticipant {
    #[serde(default)]
    pub user_id: Option<Reference>,
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub underscore_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joined_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attended: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl From<RawParticipant> for Participant {
    fn from(raw: RawParticipant) -> Self {
        Participant {
            user: raw.user_id.unwrap_or_default(),
            id: raw.underscore_id.or(raw.id),
            joined_at: raw.joined_at,
            attended: raw.attended,
            email: raw.email,
        }
    }
}

impl From<Participant> for RawParticipant {
    fn from(participant: Participant) -> Self {
        RawParticipant {
            user_id: Some(participant.user),
            underscore_id: participant.id.clone(),
            id: participant.id,
            joined_at: participant.joined_at,
            attended: participant.attended,
            email: participant.email,
        }
    }
}

/// Wire form of [`Campaign`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCampaign {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub underscore_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub organizer: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub target_goal: Option<u32>,
    #[serde(default)]
    pub current_progress: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participants_count: Option<u32>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<Reference>,
    #[serde(default)]
    pub participants: Option<Vec<Participant>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl TryFrom<RawCampaign> for Campaign {
    type Error = String;

    fn try_from(raw: RawCampaign) -> Result<Self, Self::Error> {
        let id = raw
            .underscore_id
            .filter(|id| !id.is_empty())
            .or(raw.id.filter(|id| !id.is_empty()))
            .ok_or_else(|| "campaign without identifier".to_string())?;

        let status = match raw.status.as_deref() {
            None => CampaignStatus::Active,
            Some(status) => CampaignStatus::parse(status)
                .ok_or_else(|| format!("unknown campaign status '{}'", status))?,
        };

        let organizer = raw
            .organizer
            .or_else(|| {
                raw.created_by
                    .as_ref()
                    .and_then(Reference::name)
                    .map(str::to_string)
            })
            .unwrap_or_default();

        Ok(Campaign {
            id,
            title: raw.title.unwrap_or_default(),
            description: raw.description.unwrap_or_default(),
            location: raw.location.unwrap_or_default(),
            organizer,
            category: Category::parse(raw.category.as_deref().unwrap_or_default()),
            date: raw.date.unwrap_or_default(),
            target_goal: raw.target_goal.unwrap_or(0),
            current_progress: raw.current_progress.or(raw.participants_count).unwrap_or(0),
            status,
            created_by: raw.created_by,
            participants: raw.participants.unwrap_or_default(),
            participants_count: raw.participants_count,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
        })
    }
}

impl From<Campaign> for RawCampaign {
    fn from(campaign: Campaign) -> Self {
        RawCampaign {
            underscore_id: Some(campaign.id.clone()),
            id: Some(campaign.id),
            title: Some(campaign.title),
            description: Some(campaign.description),
            location: Some(campaign.location),
            organizer: Some(campaign.organizer),
            category: Some(campaign.category.as_str().to_string()),
            date: Some(campaign.date),
            target_goal: Some(campaign.target_goal),
            current_progress: Some(campaign.current_progress),
            participants_count: campaign.participants_count,
            status: Some(campaign.status.as_str().to_string()),
            created_by: campaign.created_by,
            participants: Some(campaign.participants),
            created_at: campaign.created_at,
            updated_at: campaign.updated_at,
        }
    }
}
