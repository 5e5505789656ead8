//! User model

use serde::{Deserialize, Serialize};

use crate::constants::roles;
use crate::error::ClientError;

/// Role of a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Organizer,
    Admin,
}

impl Role {
    /// Map an arbitrary role string onto the known set. Anything unknown is a
    /// plain volunteer.
    pub fn clamp(role: &str) -> Self {
        match role {
            roles::ORGANIZER => Self::Organizer,
            roles::ADMIN => Self::Admin,
            _ => Self::User,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => roles::USER,
            Self::Organizer => roles::ORGANIZER,
            Self::Admin => roles::ADMIN,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized user profile.
///
/// On the wire a user carries its identifier as `_id`, `id` or both. After
/// normalization there is one `id`, and serializing writes it back under both
/// aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawUser", into = "RawUser")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Role as stored by the server. The on-device organizer override is never
    /// written here; see `participation::effective_role`.
    pub role: Role,
    pub active: Option<bool>,
    pub created_at: Option<String>,
    pub attended_count: Option<u32>,
}

impl User {
    /// Normalize a raw JSON user, unwrapping `{ "user": { .. } }` envelopes
    pub fn from_payload(payload: serde_json::Value) -> Result<Self, ClientError> {
        serde_json::from_value(unwrap_user(payload))
            .map_err(|e| ClientError::MalformedPayload(e.to_string()))
    }

    /// Check if the server says this account is disabled
    pub fn is_disabled(&self) -> bool {
        self.active == Some(false)
    }
}

/// Some endpoints answer `{ user: {..} }`, others the bare user.
fn unwrap_user(payload: serde_json::Value) -> serde_json::Value {
    match payload {
        serde_json::Value::Object(mut map)
            if map.get("user").is_some_and(|u| u.is_object()) && !map.contains_key("name") =>
        {
            map.remove("user").unwrap_or_default()
        }
        other => other,
    }
}

/// Wire form of [`User`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUser {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub underscore_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attended_count: Option<u32>,
}

impl TryFrom<RawUser> for User {
    type Error = String;

    fn try_from(raw: RawUser) -> Result<Self, Self::Error> {
        let id = raw
            .underscore_id
            .filter(|id| !id.is_empty())
            .or(raw.id.filter(|id| !id.is_empty()))
            .ok_or_else(|| "user without identifier".to_string())?;

        Ok(User {
            id,
            name: raw.name.unwrap_or_default(),
            email: raw.email.unwrap_or_default(),
            role: Role::clamp(raw.role.as_deref().unwrap_or_default()),
            active: raw.active,
            created_at: raw.created_at,
            attended_count: raw.attended_count,
        })
    }
}

impl From<User> for RawUser {
    fn from(user: User) -> Self {
        RawUser {
            underscore_id: Some(user.id.clone()),
            id: Some(user.id),
            name: Some(user.name),
            email: Some(user.email),
            role: Some(user.role.as_str().to_string()),
            active: user.active,
            created_at: user.created_at,
            attended_count: user.attended_count,
        }
    }
}
