//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer and the single entry
//! point for UI clients.
//!
//! ## Role and Responsibilities
//!
//! The API facade:
//! - **Sequences** the resolve → write steps of each operation
//! - **Names the failing stage** by wrapping errors in [`OrgError::Stage`](crate::error::OrgError::Stage)
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! It does no printing and no prompting; a [`Chooser`] comes in from the caller.
//!
//! ## Generic Over Connection
//!
//! `OrgApi<C: Connection>`:
//! - Production: `OrgApi<RestConnection>`
//! - Testing: `OrgApi<InMemoryOrg>`

use crate::commands::{self, assign::AssignOutcome, resolve_group::GroupRef, CmdMessage, CmdResult};
use crate::connection::Connection;
use crate::error::{Result, Stage};
use crate::model::{PhotoKind, PhotoTarget, SubjectKind};
use crate::query::{Chooser, FailOnAmbiguity};
use serde_json::json;
use std::path::Path;

/// Who should receive a permission set.
#[derive(Debug, Clone, Default)]
pub struct AssignRequest {
    /// Permission set API name or label
    pub permission_set: String,
    pub last_name: Option<String>,
    pub first_name: Option<String>,
}

pub struct OrgApi<C: Connection> {
    conn: C,
}

impl<C: Connection> OrgApi<C> {
    pub fn new(conn: C) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &C {
        &self.conn
    }

    /// Same as [`Self::assign_permission_set`] with ambiguity treated as an error.
    pub async fn assign_permission_set_strict(&self, request: &AssignRequest) -> Result<CmdResult> {
        self.assign_permission_set(request, &FailOnAmbiguity).await
    }

    pub async fn assign_permission_set(
        &self,
        request: &AssignRequest,
        chooser: &dyn Chooser,
    ) -> Result<CmdResult> {
        let mut result = CmdResult::default();

        let user = commands::resolve_user::run(
            &self.conn,
            request.last_name.as_deref(),
            request.first_name.as_deref(),
        )
        .await
        .map_err(|e| e.at(Stage::ResolveUser))?;
        result.add_message(CmdMessage::info(format!("found user with id {}", user.id)));

        let permset = commands::resolve_permset::run(&self.conn, &request.permission_set, chooser)
            .await
            .map_err(|e| e.at(Stage::ResolvePermissionSet))?;
        result.add_message(CmdMessage::info(format!(
            "found permset with id {}",
            permset.id
        )));

        let outcome = commands::assign::run(&self.conn, &permset, &user)
            .await
            .map_err(|e| e.at(Stage::Assign))?;

        let summary = format!(
            "User {} has been assigned permset {} ({})",
            user.id, request.permission_set, permset.id
        );
        match &outcome {
            AssignOutcome::Created(_) => result.add_message(CmdMessage::success(summary)),
            AssignOutcome::AlreadyAssigned => {
                result.add_message(CmdMessage::success(summary));
                result.add_message(CmdMessage::info("assignment already existed"));
            }
        }

        Ok(result.with_data(json!({
            "user": user,
            "permissionSet": permset,
            "assignment": outcome,
        })))
    }

    /// Upload a photo for a user found by name, or for the connected user.
    pub async fn upload_user_photo(
        &self,
        last_name: Option<&str>,
        first_name: Option<&str>,
        file: &Path,
        kind: PhotoKind,
    ) -> Result<CmdResult> {
        let user = commands::resolve_user::run(&self.conn, last_name, first_name)
            .await
            .map_err(|e| e.at(Stage::ResolveUser))?;
        let target = PhotoTarget::new(user.id.clone(), SubjectKind::User, kind);
        self.upload(target, &user.username, file).await
    }

    pub async fn upload_group_photo(
        &self,
        group: &GroupRef,
        file: &Path,
        kind: PhotoKind,
        chooser: &dyn Chooser,
    ) -> Result<CmdResult> {
        let record = commands::resolve_group::run(&self.conn, group, chooser)
            .await
            .map_err(|e| e.at(Stage::ResolveGroup))?;
        let target = PhotoTarget::new(record.id.clone(), SubjectKind::Group, kind);
        self.upload(target, &record.name, file).await
    }

    /// Upload straight to a known subject id, without resolving it first.
    pub async fn upload_photo(&self, target: PhotoTarget, file: &Path) -> Result<CmdResult> {
        let shown = target.subject_id.clone();
        self.upload(target, &shown, file).await
    }

    async fn upload(&self, target: PhotoTarget, shown: &str, file: &Path) -> Result<CmdResult> {
        let response = commands::photo::run(&self.conn, &target, file)
            .await
            .map_err(|e| e.at(Stage::Upload))?;

        let mut result = CmdResult::default();
        result.add_message(CmdMessage::success(format!(
            "Set {} for {} {} ({})",
            target.photo_kind, target.subject_kind, shown, target.subject_id
        )));
        Ok(result.with_data(json!({ "target": target, "response": response })))
    }
}
