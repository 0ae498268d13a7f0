use crate::connection::Connection;
use crate::error::{OrgError, Result};
use crate::model::PermissionSetRecord;
use crate::query::{single_record, soql_literal, Chooser, SingleQuery};

const PERMSET_FIELDS: &[&str] = &["Id", "Name", "Label"];

/// Resolve a permission set by API name or label.
///
/// Both fields are matched with equal weight. When the token hits several
/// permission sets (shared labels, or a name on one and a label on another)
/// the chooser decides; no precedence between name and label is applied.
pub async fn run<C>(conn: &C, token: &str, chooser: &dyn Chooser) -> Result<PermissionSetRecord>
where
    C: Connection + ?Sized,
{
    if token.trim().is_empty() {
        return Err(OrgError::InvalidInput(
            "permission set name is empty".to_string(),
        ));
    }
    let literal = soql_literal(token);
    let query = SingleQuery {
        object: "PermissionSet",
        fields: PERMSET_FIELDS,
        criteria: format!("Name = {} OR Label = {}", literal, literal),
        choice_field: "Name",
    };
    single_record(conn, &query, chooser).await
}
