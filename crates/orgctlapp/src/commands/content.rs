use crate::connection::Connection;
use crate::error::{OrgError, Result};
use crate::model::{ContentArtifact, WriteOutcome};
use crate::query::{single_record, soql_literal, FailOnAmbiguity, SingleQuery};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::json;
use std::path::Path;
use tracing::debug;

const CONTENT_VERSION: &str = "ContentVersion";

/// Upload a local file as a new ContentVersion and return its ids.
///
/// Every call creates a fresh version; nothing is deduplicated.
pub async fn upload_file<C>(conn: &C, path: &Path) -> Result<ContentArtifact>
where
    C: Connection + ?Sized,
{
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| OrgError::InvalidInput(format!("{} is not a file", path.display())))?;
    let title = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.clone());

    debug!(file = %file_name, size = bytes.len(), "uploading content version");
    let fields = json!({
        "Title": title,
        "PathOnClient": file_name,
        "VersionData": STANDARD.encode(&bytes),
    });

    let id = match conn.create(CONTENT_VERSION, fields).await? {
        WriteOutcome::Created { id } => id,
        WriteOutcome::Rejected(err) => {
            return Err(OrgError::WriteRejected {
                object: CONTENT_VERSION.to_string(),
                code: err.code,
                message: err.message,
            })
        }
    };

    let query = SingleQuery {
        object: CONTENT_VERSION,
        fields: &["Id", "ContentDocumentId"],
        criteria: format!("Id = {}", soql_literal(&id)),
        choice_field: "Id",
    };
    single_record(conn, &query, &FailOnAmbiguity).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::memory::InMemoryOrg;

    #[tokio::test]
    async fn uploads_file_as_base64() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("avatar.png");
        std::fs::write(&path, b"\x89PNG fake").unwrap();
        let org = InMemoryOrg::new("admin@org.com");

        let artifact = upload_file(&org, &path).await.unwrap();

        let stored = &org.records(CONTENT_VERSION)[0];
        assert_eq!(stored["Title"], "avatar");
        assert_eq!(stored["PathOnClient"], "avatar.png");
        assert_eq!(stored["VersionData"], STANDARD.encode(b"\x89PNG fake"));
        assert_eq!(stored["ContentDocumentId"], artifact.content_document_id.as_str());
    }

    #[tokio::test]
    async fn each_upload_is_a_new_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.jpg");
        std::fs::write(&path, b"jpg").unwrap();
        let org = InMemoryOrg::new("admin@org.com");

        let first = upload_file(&org, &path).await.unwrap();
        let second = upload_file(&org, &path).await.unwrap();

        assert_ne!(first.content_document_id, second.content_document_id);
        assert_eq!(org.records(CONTENT_VERSION).len(), 2);
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let org = InMemoryOrg::new("admin@org.com");
        let err = upload_file(&org, Path::new("/definitely/not/here.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, OrgError::Io(_)));
        assert!(org.records(CONTENT_VERSION).is_empty());
    }

    #[tokio::test]
    async fn rejected_upload_surfaces_reason() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.png");
        std::fs::write(&path, b"x").unwrap();
        let org = InMemoryOrg::new("admin@org.com");
        org.reject_creates(CONTENT_VERSION, "STORAGE_LIMIT_EXCEEDED", "storage limit exceeded");

        let err = upload_file(&org, &path).await.unwrap_err();
        assert!(
            matches!(err, OrgError::WriteRejected { ref code, .. } if code == "STORAGE_LIMIT_EXCEEDED")
        );
    }
}
