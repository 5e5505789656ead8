//! Application-wide constants
//!
//! This module contains all constant values used throughout the client.
//! Constants are grouped by their purpose for better organization.

// =============================================================================
// API DEFAULTS
// =============================================================================

/// Default base URL of the hosted campaign API
pub const DEFAULT_API_BASE_URL: &str = "https://uni-2-api.onrender.com/api";

/// Default ceiling for every network call, in seconds
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 10;

/// Default location of the device-local store
pub const DEFAULT_STORAGE_PATH: &str = ".campaign-client/store.json";

/// Default log filter
pub const DEFAULT_RUST_LOG: &str = "info";

// =============================================================================
// VALIDATION
// =============================================================================

/// Minimum password length accepted at registration
pub const MIN_PASSWORD_LENGTH: u64 = 6;

/// Minimum participation goal for a new campaign
pub const MIN_TARGET_GOAL: u32 = 1;

// =============================================================================
// DEVICE-LOCAL STORAGE KEYS
// =============================================================================

/// Keys of the device-local key-value store
pub mod storage_keys {
    /// Opaque session token
    pub const TOKEN: &str = "userToken";

    /// Cached, normalized user profile
    pub const USER: &str = "userData";

    /// Global organizer override list
    pub const ORGANIZERS: &str = "organizersList";

    /// Prefix of the per-user joined campaign markers
    pub const JOINED_PREFIX: &str = "joinedEvents:";

    /// Key holding the joined markers of one user
    pub fn joined_events(user_id: &str) -> String {
        format!("{}{}", JOINED_PREFIX, user_id)
    }
}

// =============================================================================
// API ENDPOINTS
// =============================================================================

/// Paths relative to the API base URL
pub mod endpoints {
    pub const LOGIN: &str = "/auth/login";
    pub const REGISTER: &str = "/auth/register";
    pub const PROFILE: &str = "/auth/profile";
    pub const EVENTS: &str = "/events";
    pub const MY_EVENTS: &str = "/events/mine";
    pub const USERS: &str = "/users";

    pub fn event(id: &str) -> String {
        format!("{}/{}", EVENTS, id)
    }

    pub fn join(id: &str) -> String {
        format!("{}/{}/join", EVENTS, id)
    }

    pub fn leave(id: &str) -> String {
        format!("{}/{}/leave", EVENTS, id)
    }

    pub fn attendance(event_id: &str, participant_id: &str) -> String {
        format!("{}/{}/participants/{}/attendance", EVENTS, event_id, participant_id)
    }

    pub fn user_role(id: &str) -> String {
        format!("{}/{}/role", USERS, id)
    }

    pub fn user_active(id: &str) -> String {
        format!("{}/{}/active", USERS, id)
    }
}

// =============================================================================
// USER ROLES
// =============================================================================

/// User role identifiers
pub mod roles {
    pub const USER: &str = "user";
    pub const ORGANIZER: &str = "organizer";
    pub const ADMIN: &str = "admin";

    /// All user roles
    pub const ALL: &[&str] = &[USER, ORGANIZER, ADMIN];
}

// =============================================================================
// USER-FACING FALLBACK MESSAGES
// =============================================================================

/// Messages shown when the server did not supply one
pub mod messages {
    pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
    pub const CONNECTION: &str = "Connection error";
    pub const REGISTER_FAILED: &str = "Registration failed";
    pub const PROFILE_FAILED: &str = "Error fetching profile";
    pub const CREATE_FAILED: &str = "Error creating campaign";
    pub const UPDATE_FAILED: &str = "Error updating campaign";
    pub const STATUS_FAILED: &str = "Error updating campaign status";
    pub const DELETE_FAILED: &str = "Error deleting campaign";
    pub const JOIN_FAILED: &str = "Error joining campaign";
    pub const LEAVE_FAILED: &str = "Error leaving campaign";
    pub const ROLE_FAILED: &str = "Error updating user role";
    pub const ACTIVE_FAILED: &str = "Error updating user state";
    pub const SESSION_EXPIRED: &str = "Session expired";

    /// Display name used when a participant is not populated
    pub const UNKNOWN_PARTICIPANT: &str = "Volunteer";
}

/// Substrings the server uses for expected participation conflicts
pub mod participation_markers {
    /// "already participating" wording, lowercase
    pub const ALREADY: &[&str] = &[
        "already participating",
        "already joined",
        "already a participant",
        "ya estás inscrito",
        "ya estas inscrito",
        "ya participa",
    ];

    /// "not participating" wording, lowercase
    pub const NOT_JOINED: &[&str] = &[
        "not participating",
        "not a participant",
        "not joined",
        "no estás",
        "no estas",
        "no participa",
    ];
}
