use crate::connection::Connection;
use crate::error::{OrgError, Result};
use crate::model::GroupRecord;
use crate::query::{single_record, soql_literal, Chooser, SingleQuery};

const GROUP_FIELDS: &[&str] = &["Id", "Name"];

/// How the caller identified a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupRef {
    Id(String),
    Name(String),
}

pub async fn run<C>(conn: &C, group: &GroupRef, chooser: &dyn Chooser) -> Result<GroupRecord>
where
    C: Connection + ?Sized,
{
    let (criteria, label) = match group {
        GroupRef::Id(id) => (format!("Id = {}", soql_literal(id)), id),
        GroupRef::Name(name) => (format!("Name = {}", soql_literal(name)), name),
    };
    if label.trim().is_empty() {
        return Err(OrgError::InvalidInput("group is empty".to_string()));
    }
    let query = SingleQuery {
        object: "CollaborationGroup",
        fields: GROUP_FIELDS,
        criteria,
        choice_field: "Name",
    };
    single_record(conn, &query, chooser).await
}
