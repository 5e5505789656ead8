//! Request bodies sent to the API

use serde::Serialize;
use validator::Validate;

use crate::constants::{MIN_PASSWORD_LENGTH, MIN_TARGET_GOAL};
use crate::models::campaign::{CampaignStatus, Category};
use crate::models::user::Role;

/// `POST /auth/login`
#[derive(Debug, Clone, Serialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// `POST /auth/register`
#[derive(Debug, Clone, Serialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[validate(length(min = MIN_PASSWORD_LENGTH, message = "Password must be at least 6 characters"))]
    pub password: String,

    pub role: Role,
}

/// `POST /events`
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCampaignRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    /// ISO-8601 instant
    #[validate(length(min = 1, message = "Date is required"))]
    pub date: String,

    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,

    #[validate(length(min = 1, message = "Organizer is required"))]
    pub organizer: String,

    #[validate(range(min = MIN_TARGET_GOAL, message = "Target goal must be positive"))]
    pub target_goal: u32,

    pub category: Category,
}

/// `PUT /events/:id`; only the fields that are set are sent
#[derive(Debug, Clone, Default, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCampaignRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub organizer: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = MIN_TARGET_GOAL, message = "Target goal must be positive"))]
    pub target_goal: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CampaignStatus>,
}

impl UpdateCampaignRequest {
    pub fn status(status: CampaignStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

/// `PATCH /users/:id/role`
#[derive(Debug, Clone, Serialize)]
pub struct RoleUpdate {
    pub role: Role,
}

/// `PATCH /users/:id/active`
#[derive(Debug, Clone, Serialize)]
pub struct ActiveUpdate {
    pub active: bool,
}

/// `PATCH /events/:id/participants/:participantId/attendance`
#[derive(Debug, Clone, Serialize)]
pub struct AttendanceUpdate {
    pub attended: bool,
}
