use crate::commands::content;
use crate::connection::Connection;
use crate::error::Result;
use crate::model::PhotoTarget;
use serde_json::{json, Value};
use std::path::Path;
use tracing::info;

/// Upload `file` and link it as the target's photo or banner.
///
/// The link URL is built from the connection at call time. The platform's
/// response is returned as-is; nothing re-checks that the photo was applied.
pub async fn run<C>(conn: &C, target: &PhotoTarget, file: &Path) -> Result<Value>
where
    C: Connection + ?Sized,
{
    let artifact = content::upload_file(conn, file).await?;
    let url = format!("{}/{}", conn.data_url(), target.path_segment());
    info!(%url, document = %artifact.content_document_id, "linking photo");
    conn.post_json(&url, &json!({ "fileId": artifact.content_document_id }))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OrgError;
    use crate::model::{PhotoKind, SubjectKind};
    use crate::platform::memory::InMemoryOrg;

    fn photo_file() -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("me.png");
        std::fs::write(&path, b"png").unwrap();
        (dir, path)
    }

    #[tokio::test]
    async fn group_banner_goes_to_chatter_groups() {
        let (_dir, path) = photo_file();
        let org = InMemoryOrg::new("admin@org.com");
        org.set_post_response(json!({"bannerPhotoUrl": "/banner"}));

        let target = PhotoTarget::new("0F9A", SubjectKind::Group, PhotoKind::Banner);
        let response = run(&org, &target, &path).await.unwrap();

        let posts = org.posts();
        assert_eq!(posts.len(), 1);
        assert_eq!(
            posts[0].0,
            "https://memory.my.salesforce.com/services/data/v59.0/chatter/groups/0F9A/banner-photo"
        );
        let document = org.records("ContentVersion")[0]["ContentDocumentId"].clone();
        assert_eq!(posts[0].1, json!({ "fileId": document }));
        assert_eq!(response, json!({"bannerPhotoUrl": "/banner"}));
    }

    #[tokio::test]
    async fn user_profile_goes_to_user_profiles() {
        let (_dir, path) = photo_file();
        let org = InMemoryOrg::new("admin@org.com");

        let target = PhotoTarget::new("005A", SubjectKind::User, PhotoKind::Profile);
        run(&org, &target, &path).await.unwrap();

        assert!(org.posts()[0]
            .0
            .ends_with("/services/data/v59.0/connect/user-profiles/005A/photo"));
    }

    #[tokio::test]
    async fn api_version_is_read_per_call() {
        let (_dir, path) = photo_file();
        let org = InMemoryOrg::new("admin@org.com");
        let target = PhotoTarget::new("005A", SubjectKind::User, PhotoKind::Banner);

        run(&org, &target, &path).await.unwrap();
        org.set_api_version("61.0");
        run(&org, &target, &path).await.unwrap();

        let posts = org.posts();
        assert!(posts[0].0.contains("/v59.0/"));
        assert!(posts[1].0.contains("/v61.0/"));
    }

    #[tokio::test]
    async fn upload_failure_skips_the_link_call() {
        let org = InMemoryOrg::new("admin@org.com");
        let target = PhotoTarget::new("005A", SubjectKind::User, PhotoKind::Profile);

        let err = run(&org, &target, Path::new("/no/such/file.png"))
            .await
            .unwrap_err();

        assert!(matches!(err, OrgError::Io(_)));
        assert!(org.posts().is_empty());
    }
}
