//! Moderator records as stored by the backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ModeratorId, Role, Uid};

/// A back-office user document (`/moderators`).
///
/// Every moderator also has an identity-provider account with the same
/// `uid`; the document carries the profile and the role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Moderator {
    #[serde(rename = "_id")]
    pub id: ModeratorId,
    pub uid: Uid,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Moderator {
    /// Payload that rewrites this record unchanged.
    #[must_use]
    pub fn to_draft(&self) -> ModeratorDraft {
        ModeratorDraft {
            uid: self.uid.clone(),
            display_name: self.display_name.clone(),
            email: self.email.clone(),
            role: self.role,
            image: self.image.clone(),
        }
    }
}

/// Body of `POST /moderators` and `PUT /moderators/:id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeratorDraft {
    pub uid: Uid,
    pub display_name: String,
    pub email: String,
    pub role: Role,
    pub image: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_backend_document() {
        let json = r#"{
            "_id": "665f1c2e9b1e",
            "uid": "firebase-uid",
            "displayName": "Maria",
            "email": "maria@example.com",
            "role": "admin",
            "image": null,
            "createdAt": "2024-06-04T12:00:00.000Z"
        }"#;
        let moderator: Moderator = serde_json::from_str(json).unwrap();
        assert_eq!(moderator.id.as_str(), "665f1c2e9b1e");
        assert_eq!(moderator.role, Role::Admin);
        assert!(moderator.image.is_none());
        assert!(moderator.created_at.is_some());
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let json = r#"{"_id": "1", "uid": "u1"}"#;
        let moderator: Moderator = serde_json::from_str(json).unwrap();
        assert_eq!(moderator.role, Role::Moderator);
        assert!(moderator.display_name.is_empty());
    }

    #[test]
    fn test_draft_uses_camel_case() {
        let draft = ModeratorDraft {
            uid: Uid::new("u1"),
            display_name: "Maria".to_owned(),
            email: "maria@example.com".to_owned(),
            role: Role::Moderator,
            image: None,
        };
        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value["displayName"], "Maria");
        assert_eq!(value["role"], "moderator");
        assert!(value["image"].is_null());
    }
}
