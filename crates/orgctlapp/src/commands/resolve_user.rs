use crate::connection::Connection;
use crate::error::{OrgError, Result};
use crate::model::UserRecord;
use crate::query::{single_record, soql_literal, FailOnAmbiguity, SingleQuery};
use tracing::debug;

const USER_FIELDS: &[&str] = &["Id", "Username", "FirstName", "LastName"];

/// Resolve a user by name, or the connection's own user when no last name is given.
///
/// A blank last name counts as no last name. A first name is only meaningful next to a last name. User lookups never
/// prompt: several matches are an [`OrgError::AmbiguousResult`].
pub async fn run<C>(conn: &C, last_name: Option<&str>, first_name: Option<&str>) -> Result<UserRecord>
where
    C: Connection + ?Sized,
{
    let last_name = last_name.filter(|l| !l.trim().is_empty());
    match (last_name, first_name) {
        (Some(last), first) => by_name(conn, last, first).await,
        (None, Some(_)) => Err(OrgError::InvalidInput(
            "a first name requires a last name".to_string(),
        )),
        (None, None) => current(conn).await,
    }
}

pub async fn current<C>(conn: &C) -> Result<UserRecord>
where
    C: Connection + ?Sized,
{
    let identity = conn.identity().await?;
    debug!(username = %identity.username, "resolving connected user");
    let query = SingleQuery {
        object: "User",
        fields: USER_FIELDS,
        criteria: format!("Username = {}", soql_literal(&identity.username)),
        choice_field: "Username",
    };
    single_record(conn, &query, &FailOnAmbiguity).await
}

pub async fn by_name<C>(conn: &C, last_name: &str, first_name: Option<&str>) -> Result<UserRecord>
where
    C: Connection + ?Sized,
{
    let last_name = last_name.trim();
    if last_name.is_empty() {
        return Err(OrgError::InvalidInput("last name is empty".to_string()));
    }

    let mut criteria = format!("LastName = {}", soql_literal(last_name));
    if let Some(first) = first_name.map(str::trim).filter(|f| !f.is_empty()) {
        criteria.push_str(&format!(" AND FirstName = {}", soql_literal(first)));
    }

    let query = SingleQuery {
        object: "User",
        fields: USER_FIELDS,
        criteria,
        choice_field: "Username",
    };
    single_record(conn, &query, &FailOnAmbiguity).await
}
