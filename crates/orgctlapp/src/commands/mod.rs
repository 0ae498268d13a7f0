//! # Command Layer
//!
//! The business logic of orgctl. Each operation lives in its own submodule as
//! plain async functions over a [`Connection`](crate::connection::Connection).
//!
//! ## What Commands Do NOT Do
//!
//! - **Any terminal I/O**: no stdout, stderr or prompts
//! - **Argument parsing**: that's the CLI layer's job
//! - **Choosing a disambiguation policy**: a [`Chooser`](crate::query::Chooser)
//!   is passed in by the caller
//!
//! ## Testing Strategy
//!
//! Command tests run against [`InMemoryOrg`](crate::platform::memory::InMemoryOrg)
//! so every branch (not found, ambiguity, duplicate writes, transport failure)
//! is exercised without a network.
//!
//! ## Command Modules
//!
//! - [`resolve_user`]: name or connected identity → User
//! - [`resolve_permset`]: name or label → PermissionSet
//! - [`resolve_group`]: id or name → CollaborationGroup
//! - [`assign`]: idempotent permission set assignment
//! - [`content`]: local file → ContentVersion
//! - [`photo`]: upload and link a profile or banner photo
//! - [`org`]: manage saved org logins

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

pub mod assign;
pub mod content;
pub mod org;
pub mod photo;
pub mod resolve_group;
pub mod resolve_permset;
pub mod resolve_user;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
}

#[derive(Debug, Clone, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }
}

/// A saved org as shown by `org list`. The token is reduced to a hint.
#[derive(Debug, Clone, Serialize)]
pub struct OrgSummary {
    pub alias: String,
    pub instance_url: String,
    pub api_version: String,
    pub is_default: bool,
    pub token_hint: String,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub messages: Vec<CmdMessage>,
    /// Machine-readable result, printed as-is under `--json`.
    pub data: Option<Value>,
    pub listed_orgs: Vec<OrgSummary>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_listed_orgs(mut self, orgs: Vec<OrgSummary>) -> Self {
        self.listed_orgs = orgs;
        self
    }
}
