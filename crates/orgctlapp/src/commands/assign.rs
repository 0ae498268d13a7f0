use crate::connection::Connection;
use crate::error::{OrgError, Result};
use crate::model::{AssignmentRecord, PermissionSetRecord, UserRecord, WriteOutcome};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info};

pub const ASSIGNMENT_OBJECT: &str = "PermissionSetAssignment";

/// Rejection code the platform uses when the (permission set, assignee)
/// pair already exists.
pub const DUPLICATE_VALUE: &str = "DUPLICATE_VALUE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AssignOutcome {
    Created(AssignmentRecord),
    AlreadyAssigned,
}

/// Grant `permset` to `user`. An existing identical grant counts as success.
pub async fn run<C>(
    conn: &C,
    permset: &PermissionSetRecord,
    user: &UserRecord,
) -> Result<AssignOutcome>
where
    C: Connection + ?Sized,
{
    debug!(permset = %permset.id, user = %user.id, "creating assignment");
    let fields = json!({
        "PermissionSetId": permset.id,
        "AssigneeId": user.id,
    });

    match conn.create(ASSIGNMENT_OBJECT, fields).await? {
        WriteOutcome::Created { id } => {
            info!(assignment = %id, "permission set assigned");
            Ok(AssignOutcome::Created(AssignmentRecord {
                id,
                permission_set_id: permset.id.clone(),
                assignee_id: user.id.clone(),
            }))
        }
        WriteOutcome::Rejected(err) if err.code == DUPLICATE_VALUE => {
            info!(permset = %permset.id, user = %user.id, "permission set already assigned");
            Ok(AssignOutcome::AlreadyAssigned)
        }
        WriteOutcome::Rejected(err) => Err(OrgError::WriteRejected {
            object: ASSIGNMENT_OBJECT.to_string(),
            code: err.code,
            message: err.message,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{resolve_permset, resolve_user};
    use crate::platform::memory::InMemoryOrg;
    use crate::query::FailOnAmbiguity;

    fn setup() -> (InMemoryOrg, PermissionSetRecord, UserRecord) {
        let org = InMemoryOrg::new("admin@org.com");
        let id = org.insert(
            "PermissionSet",
            json!({"Name": "Sales_Admin", "Label": "Sales Admin"}),
        );
        let permset = PermissionSetRecord {
            id,
            name: "Sales_Admin".into(),
            label: "Sales Admin".into(),
        };
        let user = UserRecord {
            id: "005X".into(),
            username: "someone@org.com".into(),
            first_name: None,
            last_name: None,
        };
        (org, permset, user)
    }

    #[tokio::test]
    async fn second_assign_is_a_no_op() {
        let (org, permset, user) = setup();

        let first = run(&org, &permset, &user).await.unwrap();
        let second = run(&org, &permset, &user).await.unwrap();

        match first {
            AssignOutcome::Created(record) => {
                assert_eq!(record.permission_set_id, permset.id);
                assert_eq!(record.assignee_id, "005X");
            }
            other => panic!("expected creation, got {other:?}"),
        }
        assert_eq!(second, AssignOutcome::AlreadyAssigned);
        assert_eq!(org.records(ASSIGNMENT_OBJECT).len(), 1);
    }

    #[tokio::test]
    async fn full_pipeline_is_idempotent() {
        let (org, _, _) = setup();

        let mut outcomes = Vec::new();
        for _ in 0..2 {
            let user = resolve_user::run(&org, None, None).await.unwrap();
            let permset = resolve_permset::run(&org, "Sales Admin", &FailOnAmbiguity)
                .await
                .unwrap();
            outcomes.push(run(&org, &permset, &user).await.unwrap());
        }

        assert!(matches!(outcomes[0], AssignOutcome::Created(_)));
        assert_eq!(outcomes[1], AssignOutcome::AlreadyAssigned);
        let stored = org.records(ASSIGNMENT_OBJECT);
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0]["AssigneeId"], json!(org.records("User")[0]["Id"]));
    }

    #[tokio::test]
    async fn other_rejections_keep_their_reason() {
        let (org, permset, user) = setup();
        org.reject_creates(
            ASSIGNMENT_OBJECT,
            "FIELD_INTEGRITY_EXCEPTION",
            "Permission set license doesn't match the user license",
        );

        let err = run(&org, &permset, &user).await.unwrap_err();
        match err {
            OrgError::WriteRejected { object, code, message } => {
                assert_eq!(object, ASSIGNMENT_OBJECT);
                assert_eq!(code, "FIELD_INTEGRITY_EXCEPTION");
                assert!(message.contains("license"));
            }
            other => panic!("expected write rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn transport_failure_is_not_swallowed() {
        let (org, permset, user) = setup();
        org.set_transport_down(true);
        let err = run(&org, &permset, &user).await.unwrap_err();
        assert!(matches!(err, OrgError::Transport(_)));
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let value = serde_json::to_value(AssignOutcome::AlreadyAssigned).unwrap();
        assert_eq!(value, json!({"status": "already_assigned"}));

        let created = AssignOutcome::Created(AssignmentRecord {
            id: "0Pa000000000001".into(),
            permission_set_id: "0PS000000000001".into(),
            assignee_id: "005000000000001".into(),
        });
        assert_eq!(
            serde_json::to_value(created).unwrap(),
            json!({
                "status": "created",
                "Id": "0Pa000000000001",
                "PermissionSetId": "0PS000000000001",
                "AssigneeId": "005000000000001"
            })
        );
    }
}
