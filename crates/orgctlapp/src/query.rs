//! # Record Query Gateway
//!
//! Runs queries against the org and narrows their results to a single record.
//!
//! ## Single-record contract
//!
//! [`single_record`] runs one query (one round-trip, no retries) and:
//! - fails with [`OrgError::NotFound`] when nothing matches
//! - returns the record directly when exactly one matches
//! - hands the candidates to a [`Chooser`] when several match
//!
//! ## Choosers
//!
//! Disambiguation is a strategy supplied by the caller, so resolution logic never
//! knows whether a person is at a terminal:
//! - [`FailOnAmbiguity`] (the default) declines, producing [`OrgError::AmbiguousResult`]
//! - [`FirstMatch`] takes the first candidate in query order
//! - the CLI plugs in an interactive terminal prompt
//!
//! Candidates are presented by a visible choice field (e.g. `Name`) with the
//! record id appended, so records sharing a label are still distinguishable.

use crate::connection::Connection;
use crate::error::{OrgError, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// Picks one record out of several matches.
pub trait Chooser: Send + Sync {
    /// Returns the index of the chosen candidate, or `None` to decline.
    fn choose(&self, object: &str, candidates: &[String]) -> Result<Option<usize>>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FailOnAmbiguity;

impl Chooser for FailOnAmbiguity {
    fn choose(&self, _object: &str, _candidates: &[String]) -> Result<Option<usize>> {
        Ok(None)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FirstMatch;

impl Chooser for FirstMatch {
    fn choose(&self, _object: &str, candidates: &[String]) -> Result<Option<usize>> {
        Ok(if candidates.is_empty() { None } else { Some(0) })
    }
}

/// A query expected to identify one record of `object`.
#[derive(Debug, Clone)]
pub struct SingleQuery<'a> {
    pub object: &'a str,
    pub fields: &'a [&'a str],
    /// Body of the WHERE clause, literals already escaped.
    pub criteria: String,
    /// Field shown to the chooser for each candidate.
    pub choice_field: &'a str,
}

impl SingleQuery<'_> {
    pub fn soql(&self) -> String {
        format!(
            "SELECT {} FROM {} WHERE {}",
            self.fields.join(", "),
            self.object,
            self.criteria
        )
    }
}

/// Quote a user-supplied value as a string literal.
pub fn soql_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

pub async fn query_records<C>(conn: &C, soql: &str) -> Result<Vec<Value>>
where
    C: Connection + ?Sized,
{
    debug!(soql, "running query");
    let records = conn.query(soql).await?;
    debug!(count = records.len(), "query returned");
    Ok(records)
}

pub async fn single_record<T, C>(
    conn: &C,
    query: &SingleQuery<'_>,
    chooser: &dyn Chooser,
) -> Result<T>
where
    T: DeserializeOwned,
    C: Connection + ?Sized,
{
    let mut records = query_records(conn, &query.soql()).await?;

    let record = match records.len() {
        0 => {
            return Err(OrgError::NotFound {
                object: query.object.to_string(),
                criteria: query.criteria.clone(),
            })
        }
        1 => records.swap_remove(0),
        count => {
            let candidates: Vec<String> = records
                .iter()
                .map(|r| candidate_label(r, query.choice_field))
                .collect();
            match chooser.choose(query.object, &candidates)? {
                Some(index) if index < count => records.swap_remove(index),
                Some(index) => {
                    return Err(OrgError::InvalidInput(format!(
                        "choice {} is out of range (1-{})",
                        index + 1,
                        count
                    )))
                }
                None => {
                    return Err(OrgError::AmbiguousResult {
                        object: query.object.to_string(),
                        criteria: query.criteria.clone(),
                        candidates,
                    })
                }
            }
        }
    };

    Ok(serde_json::from_value(record)?)
}

/// Case-insensitive string field lookup on a raw record.
pub fn field_str<'a>(record: &'a Value, field: &str) -> Option<&'a str> {
    let map = record.as_object()?;
    map.get(field)
        .or_else(|| {
            map.iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(field))
                .map(|(_, v)| v)
        })
        .and_then(Value::as_str)
}

fn candidate_label(record: &Value, choice_field: &str) -> String {
    let id = field_str(record, "Id").unwrap_or("?");
    match field_str(record, choice_field) {
        Some(shown) => format!("{} ({})", shown, id),
        None => id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PermissionSetRecord;
    use crate::platform::memory::InMemoryOrg;
    use serde_json::json;
    use std::sync::Mutex;

    const FIELDS: &[&str] = &["Id", "Name", "Label"];

    fn by_label(label: &str) -> SingleQuery<'static> {
        SingleQuery {
            object: "PermissionSet",
            fields: FIELDS,
            criteria: format!("Label = {}", soql_literal(label)),
            choice_field: "Name",
        }
    }

    fn org_with_two_admins() -> InMemoryOrg {
        let org = InMemoryOrg::new("admin@org.com");
        org.insert("PermissionSet", json!({"Name": "Admin_A", "Label": "Admin"}));
        org.insert("PermissionSet", json!({"Name": "Admin_B", "Label": "Admin"}));
        org
    }

    struct Recording {
        seen: Mutex<Vec<String>>,
        pick: Option<usize>,
    }

    impl Chooser for Recording {
        fn choose(&self, _object: &str, candidates: &[String]) -> Result<Option<usize>> {
            self.seen.lock().unwrap().extend(candidates.iter().cloned());
            Ok(self.pick)
        }
    }

    #[test]
    fn literal_escapes_quotes_and_backslashes() {
        assert_eq!(soql_literal("O'Brien"), r"'O\'Brien'");
        assert_eq!(soql_literal(r"a\b"), r"'a\\b'");
        assert_eq!(soql_literal("plain"), "'plain'");
    }

    #[test]
    fn builds_select_statement() {
        assert_eq!(
            by_label("Admin").soql(),
            "SELECT Id, Name, Label FROM PermissionSet WHERE Label = 'Admin'"
        );
    }

    #[tokio::test]
    async fn zero_matches_is_not_found() {
        let org = InMemoryOrg::new("admin@org.com");
        let err = single_record::<PermissionSetRecord, _>(&org, &by_label("Nope"), &FirstMatch)
            .await
            .unwrap_err();
        assert!(matches!(err, OrgError::NotFound { ref object, .. } if object == "PermissionSet"));
    }

    #[tokio::test]
    async fn single_match_skips_chooser() {
        let org = InMemoryOrg::new("admin@org.com");
        org.insert("PermissionSet", json!({"Name": "Only", "Label": "Only"}));
        let chooser = Recording {
            seen: Mutex::new(Vec::new()),
            pick: None,
        };

        let found: PermissionSetRecord = single_record(&org, &by_label("Only"), &chooser)
            .await
            .unwrap();

        assert_eq!(found.name, "Only");
        assert!(chooser.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn many_matches_fail_by_default() {
        let org = org_with_two_admins();
        let err = single_record::<PermissionSetRecord, _>(&org, &by_label("Admin"), &FailOnAmbiguity)
            .await
            .unwrap_err();
        match err {
            OrgError::AmbiguousResult { candidates, .. } => {
                assert_eq!(candidates.len(), 2);
                assert!(candidates[0].starts_with("Admin_A ("));
            }
            other => panic!("expected ambiguity, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn chooser_picks_among_matches() {
        let org = org_with_two_admins();
        let chooser = Recording {
            seen: Mutex::new(Vec::new()),
            pick: Some(1),
        };

        let found: PermissionSetRecord = single_record(&org, &by_label("Admin"), &chooser)
            .await
            .unwrap();

        assert_eq!(found.name, "Admin_B");
        assert_eq!(chooser.seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn out_of_range_choice_is_rejected() {
        let org = org_with_two_admins();
        let chooser = Recording {
            seen: Mutex::new(Vec::new()),
            pick: Some(5),
        };
        let err = single_record::<PermissionSetRecord, _>(&org, &by_label("Admin"), &chooser)
            .await
            .unwrap_err();
        assert!(matches!(err, OrgError::InvalidInput(_)));
    }

    #[test]
    fn field_lookup_ignores_case() {
        let record = json!({"Id": "1", "USERNAME": "x"});
        assert_eq!(field_str(&record, "Username"), Some("x"));
        assert_eq!(field_str(&record, "Missing"), None);
    }
}
