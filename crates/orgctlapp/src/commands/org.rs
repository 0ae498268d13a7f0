use crate::commands::{CmdMessage, CmdResult, OrgSummary};
use crate::config::{OrgConfig, OrgEntry};
use crate::error::{OrgError, Result};
use chrono::Utc;
use serde_json::json;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct NewOrg {
    pub alias: String,
    pub instance_url: String,
    pub access_token: String,
    pub api_version: Option<String>,
    pub set_default: bool,
}

pub fn add(config_dir: &Path, org: NewOrg) -> Result<CmdResult> {
    let alias = org.alias.trim();
    if alias.is_empty() {
        return Err(OrgError::InvalidInput("alias is empty".to_string()));
    }
    let instance_url = org.instance_url.trim().trim_end_matches('/');
    if !instance_url.starts_with("https://") {
        return Err(OrgError::InvalidInput(format!(
            "instance URL must start with https:// (got '{}')",
            org.instance_url
        )));
    }
    if org.access_token.trim().is_empty() {
        return Err(OrgError::InvalidInput("access token is empty".to_string()));
    }
    if let Some(version) = &org.api_version {
        validate_api_version(version)?;
    }

    let mut config = OrgConfig::load(config_dir)?;
    let replaced = config
        .orgs
        .insert(
            alias.to_string(),
            OrgEntry {
                instance_url: instance_url.to_string(),
                access_token: org.access_token,
                api_version: org.api_version,
                added_at: Utc::now(),
            },
        )
        .is_some();
    let make_default = org.set_default || config.default_org.is_none();
    if make_default {
        config.default_org = Some(alias.to_string());
    }
    config.save(config_dir)?;

    let mut result = CmdResult::default().with_data(json!({
        "alias": alias,
        "instance_url": instance_url,
        "default": make_default,
    }));
    let verb = if replaced { "Updated" } else { "Added" };
    result.add_message(CmdMessage::success(format!("{} org {}", verb, alias)));
    if make_default {
        result.add_message(CmdMessage::info(format!("{} is now the default org", alias)));
    }
    Ok(result)
}

pub fn list(config_dir: &Path) -> Result<CmdResult> {
    let config = OrgConfig::load(config_dir)?;
    let orgs: Vec<OrgSummary> = config
        .orgs
        .iter()
        .map(|(alias, entry)| OrgSummary {
            alias: alias.clone(),
            instance_url: entry.instance_url.clone(),
            api_version: entry
                .api_version
                .clone()
                .unwrap_or_else(|| config.api_version.clone()),
            is_default: config.default_org.as_deref() == Some(alias.as_str()),
            token_hint: token_hint(&entry.access_token),
            added_at: entry.added_at,
        })
        .collect();

    let mut result = CmdResult::default().with_data(serde_json::to_value(&orgs)?);
    if orgs.is_empty() {
        result.add_message(CmdMessage::info(
            "No orgs configured. Add one with `orgctl org add`.",
        ));
    }
    Ok(result.with_listed_orgs(orgs))
}

pub fn remove(config_dir: &Path, alias: &str) -> Result<CmdResult> {
    let mut config = OrgConfig::load(config_dir)?;
    if config.orgs.remove(alias).is_none() {
        return Err(OrgError::Config(format!("unknown org alias '{}'", alias)));
    }
    let mut result = CmdResult::default().with_data(json!({ "removed": alias }));
    if config.default_org.as_deref() == Some(alias) {
        config.default_org = None;
        result.add_message(CmdMessage::warning(
            "Removed the default org; no default is set now",
        ));
    }
    config.save(config_dir)?;
    result.add_message(CmdMessage::success(format!("Removed org {}", alias)));
    Ok(result)
}

fn validate_api_version(version: &str) -> Result<()> {
    let valid = version
        .split_once('.')
        .is_some_and(|(major, minor)| {
            !major.is_empty()
                && !minor.is_empty()
                && major.chars().all(|c| c.is_ascii_digit())
                && minor.chars().all(|c| c.is_ascii_digit())
        });
    if valid {
        Ok(())
    } else {
        Err(OrgError::InvalidInput(format!(
            "API version must look like 59.0 (got '{}')",
            version
        )))
    }
}

/// Last four characters of a token, masked.
fn token_hint(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}
