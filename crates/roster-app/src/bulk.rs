// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::{ClientRecord, SelectionSnapshot};

const UNKNOWN_CLIENT: &str = "Unknown Client";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BulkAction {
    AssignTo,
    CreateFolders,
    CreateProject,
    InviteToMeeting,
    SendLogin,
    Delete,
}

impl BulkAction {
    pub const ALL: [Self; 6] = [
        Self::AssignTo,
        Self::CreateFolders,
        Self::CreateProject,
        Self::InviteToMeeting,
        Self::SendLogin,
        Self::Delete,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AssignTo => "assign",
            Self::CreateFolders => "create-folders",
            Self::CreateProject => "create-project",
            Self::InviteToMeeting => "invite-to-meeting",
            Self::SendLogin => "send-login",
            Self::Delete => "bulk-delete",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::AssignTo => "assign to",
            Self::CreateFolders => "create folders",
            Self::CreateProject => "create project",
            Self::InviteToMeeting => "invite to meeting",
            Self::SendLogin => "send login",
            Self::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderNode {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub children: Vec<FolderNode>,
    pub permissions: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub folders: Vec<FolderNode>,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRequest {
    pub project_name: String,
    pub workflow: String,
    pub starting_stage: String,
    pub account_manager: String,
}

/// What a bulk dialog hands back on confirm. Forwarded untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulkPayload {
    AssignTo { team_member_ids: Vec<String> },
    CreateFolders(FolderTemplate),
    CreateProject(ProjectRequest),
    InviteToMeeting { meeting_id: String },
    SendLogin,
    Delete,
}

impl BulkPayload {
    pub const fn action(&self) -> BulkAction {
        match self {
            Self::AssignTo { .. } => BulkAction::AssignTo,
            Self::CreateFolders(_) => BulkAction::CreateFolders,
            Self::CreateProject(_) => BulkAction::CreateProject,
            Self::InviteToMeeting { .. } => BulkAction::InviteToMeeting,
            Self::SendLogin => BulkAction::SendLogin,
            Self::Delete => BulkAction::Delete,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkRequest {
    pub snapshot: SelectionSnapshot,
    pub payload: BulkPayload,
}

impl BulkRequest {
    pub const fn action(&self) -> BulkAction {
        self.payload.action()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenBulkDialog {
    action: BulkAction,
    snapshot: SelectionSnapshot,
}

impl OpenBulkDialog {
    pub const fn action(&self) -> BulkAction {
        self.action
    }

    pub fn selected_count(&self) -> usize {
        self.snapshot.count()
    }

    pub const fn snapshot(&self) -> &SelectionSnapshot {
        &self.snapshot
    }
}

/// Single open/close/confirm path shared by all six bulk dialogs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BulkDispatcher {
    open: Option<OpenBulkDialog>,
}

impl BulkDispatcher {
    pub fn current(&self) -> Option<&OpenBulkDialog> {
        self.open.as_ref()
    }

    pub fn is_open(&self, action: BulkAction) -> bool {
        self.open.as_ref().is_some_and(|open| open.action == action)
    }

    /// Opening replaces any dialog that is already showing.
    pub fn open(&mut self, action: BulkAction, snapshot: SelectionSnapshot) -> &OpenBulkDialog {
        self.open.insert(OpenBulkDialog { action, snapshot })
    }

    pub fn close(&mut self) -> Option<BulkAction> {
        self.open.take().map(|open| open.action)
    }

    /// Pairs the payload with the snapshot taken at open time and closes the
    /// dialog. A payload for another action leaves the dialog open.
    pub fn confirm(&mut self, payload: BulkPayload) -> Result<BulkRequest> {
        let Some(open) = self.open.take() else {
            bail!(
                "no bulk dialog is open for {} -- open the action first",
                payload.action().label()
            );
        };
        if open.action != payload.action() {
            let expected = open.action;
            self.open = Some(open);
            bail!(
                "{} dialog cannot confirm a {} payload",
                expected.label(),
                payload.action().label()
            );
        }
        Ok(BulkRequest {
            snapshot: open.snapshot,
            payload,
        })
    }
}

/// Names shown by the delete confirmation, one per snapshot id.
pub fn snapshot_client_names(snapshot: &SelectionSnapshot, clients: &[ClientRecord]) -> Vec<String> {
    snapshot
        .ids()
        .iter()
        .map(|id| {
            clients
                .iter()
                .find(|client| client.id == *id)
                .map(|client| client.name.clone())
                .unwrap_or_else(|| UNKNOWN_CLIENT.to_owned())
        })
        .collect()
}
