//! Record types exchanged with the org.
//!
//! Field names follow the platform's PascalCase wire format so query results
//! deserialize directly. Extra fields (including the `attributes` envelope the
//! REST API adds) are ignored.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The authenticated principal behind a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    pub user_id: String,
    pub organization_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserRecord {
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PermissionSetRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub label: String,
}

/// A Chatter group (`CollaborationGroup`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GroupRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// The join record granting a permission set to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AssignmentRecord {
    pub id: String,
    pub permission_set_id: String,
    pub assignee_id: String,
}

/// An uploaded file as the platform stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContentArtifact {
    pub id: String,
    pub content_document_id: String,
}

/// Platform-side reason a create was refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveError {
    #[serde(rename = "errorCode")]
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub fields: Vec<String>,
}

/// Result of a generic record create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Created { id: String },
    Rejected(SaveError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectKind {
    User,
    Group,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoKind {
    Profile,
    Banner,
}

/// Where an uploaded photo gets linked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhotoTarget {
    pub subject_id: String,
    pub subject_kind: SubjectKind,
    pub photo_kind: PhotoKind,
}

impl PhotoTarget {
    pub fn new(subject_id: impl Into<String>, subject_kind: SubjectKind, photo_kind: PhotoKind) -> Self {
        Self {
            subject_id: subject_id.into(),
            subject_kind,
            photo_kind,
        }
    }

    /// REST path segment, relative to `/services/data/vXX.X/`.
    pub fn path_segment(&self) -> String {
        let base = match self.subject_kind {
            SubjectKind::User => "connect/user-profiles",
            SubjectKind::Group => "chatter/groups",
        };
        let leaf = match self.photo_kind {
            PhotoKind::Profile => "photo",
            PhotoKind::Banner => "banner-photo",
        };
        format!("{}/{}/{}", base, self.subject_id, leaf)
    }
}

impl fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubjectKind::User => f.write_str("user"),
            SubjectKind::Group => f.write_str("group"),
        }
    }
}

impl fmt::Display for PhotoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhotoKind::Profile => f.write_str("photo"),
            PhotoKind::Banner => f.write_str("banner photo"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn photo_routing_covers_all_four_targets() {
        let cases = [
            (SubjectKind::User, PhotoKind::Profile, "connect/user-profiles/005A/photo"),
            (SubjectKind::User, PhotoKind::Banner, "connect/user-profiles/005A/banner-photo"),
            (SubjectKind::Group, PhotoKind::Profile, "chatter/groups/005A/photo"),
            (SubjectKind::Group, PhotoKind::Banner, "chatter/groups/005A/banner-photo"),
        ];
        for (subject, photo, expected) in cases {
            assert_eq!(PhotoTarget::new("005A", subject, photo).path_segment(), expected);
        }
    }

    #[test]
    fn user_record_ignores_attributes_envelope() {
        let value = json!({
            "attributes": {"type": "User", "url": "/services/data/v59.0/sobjects/User/005A"},
            "Id": "005A",
            "Username": "admin@org.com"
        });
        let user: UserRecord = serde_json::from_value(value).unwrap();
        assert_eq!(user.id, "005A");
        assert_eq!(user.username, "admin@org.com");
        assert_eq!(user.first_name, None);
    }

    #[test]
    fn save_error_reads_rest_shape() {
        let value = json!({"errorCode": "DUPLICATE_VALUE", "message": "duplicate value found", "fields": []});
        let err: SaveError = serde_json::from_value(value).unwrap();
        assert_eq!(err.code, "DUPLICATE_VALUE");
    }
}
