use chrono::{DateTime, Utc};
use colored::Colorize;
use orgctlapp::commands::{CmdMessage, CmdResult, MessageLevel, OrgSummary};
use orgctlapp::error::{OrgError, Result};
use serde_json::json;
use timeago::Formatter;
use unicode_width::UnicodeWidthStr;

const DEFAULT_MARKER: &str = "*";

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
        }
    }
}

/// Prints a command result either for humans or as a single JSON document.
pub(super) fn print_result(result: &CmdResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&json_envelope(result))?);
        return Ok(());
    }
    if !result.listed_orgs.is_empty() {
        print!("{}", render_org_list(&result.listed_orgs, Utc::now()));
    }
    print_messages(&result.messages);
    Ok(())
}

fn json_envelope(result: &CmdResult) -> serde_json::Value {
    json!({
        "status": 0,
        "result": result.data.clone().unwrap_or(serde_json::Value::Null),
        "messages": result.messages,
    })
}

/// The `--json` counterpart of `Error: …` on stderr.
pub(super) fn print_error_json(err: &OrgError) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&error_envelope(err))?);
    Ok(())
}

fn error_envelope(err: &OrgError) -> serde_json::Value {
    json!({
        "status": 1,
        "name": err.kind(),
        "message": err.to_string(),
        "stage": err.stage().map(|s| s.to_string()),
    })
}

/// One line per org, columns aligned on display width.
pub(super) fn render_org_list(orgs: &[OrgSummary], now: DateTime<Utc>) -> String {
    let alias_width = orgs.iter().map(|o| o.alias.width()).max().unwrap_or(0);
    let url_width = orgs.iter().map(|o| o.instance_url.width()).max().unwrap_or(0);

    let mut out = String::new();
    for org in orgs {
        let marker = if org.is_default { DEFAULT_MARKER } else { " " };
        out.push_str(&format!(
            "{} {}{}  {}{}  v{}  {}  {}\n",
            marker,
            org.alias,
            " ".repeat(alias_width - org.alias.width()),
            org.instance_url,
            " ".repeat(url_width - org.instance_url.width()),
            org.api_version,
            org.token_hint,
            format_time_ago(org.added_at, now),
        ));
    }
    out
}

fn format_time_ago(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(timestamp);
    Formatter::new().convert(duration.to_std().unwrap_or_default())
}
