//! Foreign-key references that arrive either as a bare id or populated

use serde::{Deserialize, Serialize};

/// A reference to a user, as the server sends it.
///
/// Depending on whether the backend populated the relation, `createdBy` and
/// `participants[].userId` are either a bare id string or an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawReference", into = "RawReference")]
pub enum Reference {
    Id(String),
    Populated {
        id: String,
        name: Option<String>,
        email: Option<String>,
    },
}

impl Reference {
    /// Underlying identifier, empty when the payload carried none
    pub fn id(&self) -> &str {
        match self {
            Self::Id(id) => id,
            Self::Populated { id, .. } => id,
        }
    }

    /// Display name, only known when populated
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Id(_) => None,
            Self::Populated { name, .. } => name.as_deref().filter(|n| !n.is_empty()),
        }
    }

    /// Email, only known when populated
    pub fn email(&self) -> Option<&str> {
        match self {
            Self::Id(_) => None,
            Self::Populated { email, .. } => email.as_deref().filter(|e| !e.is_empty()),
        }
    }

    pub fn is_populated(&self) -> bool {
        matches!(self, Self::Populated { .. })
    }
}

impl Default for Reference {
    fn default() -> Self {
        Self::Id(String::new())
    }
}

/// Wire form of [`Reference`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawReference {
    Id(String),
    Object(RawReferenceObject),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawReferenceObject {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub underscore_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl From<RawReference> for Reference {
    fn from(raw: RawReference) -> Self {
        match raw {
            RawReference::Id(id) => Reference::Id(id),
            RawReference::Object(obj) => Reference::Populated {
                id: obj.underscore_id.or(obj.id).unwrap_or_default(),
                name: obj.name,
                email: obj.email,
            },
        }
    }
}

impl From<Reference> for RawReference {
    fn from(reference: Reference) -> Self {
        match reference {
            Reference::Id(id) => RawReference::Id(id),
            Reference::Populated { id, name, email } => RawReference::Object(RawReferenceObject {
                underscore_id: Some(id.clone()),
                id: Some(id),
                name,
                email,
            }),
        }
    }
}
