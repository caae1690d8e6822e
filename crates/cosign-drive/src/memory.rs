//! In-memory external store for testing.
//!
//! Keeps files and grants in a mutex-guarded map, records every call in a
//! journal, and can be told to fail the next call of a given kind or to
//! delay every call.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use cosign_core::{DocumentId, Email, Role};

use crate::error::{DriveError, Result};
use crate::service::{DocumentService, FileMeta, Grant, PermissionId};

/// Kinds of external call, for failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriveOp {
    CreateDocument,
    CopyTemplate,
    InsertPermission,
    PermissionIdForEmail,
    UpdatePermission,
    LastModifyingUser,
}

/// One recorded external call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriveCall {
    CreateDocument {
        title: String,
    },
    CopyTemplate {
        template_id: DocumentId,
    },
    InsertPermission {
        document_id: DocumentId,
        email: Email,
        role: Role,
        notify: bool,
    },
    PermissionIdForEmail {
        email: Email,
    },
    UpdatePermission {
        document_id: DocumentId,
        permission_id: PermissionId,
        role: Role,
    },
    LastModifyingUser {
        document_id: DocumentId,
    },
}

impl DriveCall {
    fn op(&self) -> DriveOp {
        match self {
            DriveCall::CreateDocument { .. } => DriveOp::CreateDocument,
            DriveCall::CopyTemplate { .. } => DriveOp::CopyTemplate,
            DriveCall::InsertPermission { .. } => DriveOp::InsertPermission,
            DriveCall::PermissionIdForEmail { .. } => DriveOp::PermissionIdForEmail,
            DriveCall::UpdatePermission { .. } => DriveOp::UpdatePermission,
            DriveCall::LastModifyingUser { .. } => DriveOp::LastModifyingUser,
        }
    }
}

#[derive(Debug, Clone)]
struct StoredGrant {
    permission_id: PermissionId,
    email: Email,
    role: Role,
}

#[derive(Debug, Default)]
struct FileState {
    title: String,
    last_modifier: Option<Email>,
    grants: Vec<StoredGrant>,
}

#[derive(Default)]
struct State {
    files: BTreeMap<DocumentId, FileState>,
    permission_ids: HashMap<Email, PermissionId>,
    failures: HashMap<DriveOp, VecDeque<Option<DriveError>>>,
    calls: Vec<DriveCall>,
    latency: Option<Duration>,
    next_file: u64,
}

/// In-memory [`DocumentService`].
///
/// Permission ids are per email, like the real store: the same email gets
/// the same id on every document.
#[derive(Default)]
pub struct MemoryDrive {
    state: Mutex<State>,
}

impl MemoryDrive {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        // A panicking test thread must not cascade into every other assertion.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register an existing file (a template, or a document created elsewhere).
    pub fn add_file(&self, id: &DocumentId, title: &str) {
        self.state().files.insert(
            id.clone(),
            FileState {
                title: title.to_string(),
                ..FileState::default()
            },
        );
    }

    /// Record `email` as the document's last modifier.
    pub fn set_last_modifier(&self, id: &DocumentId, email: &Email) {
        if let Some(file) = self.state().files.get_mut(id) {
            file.last_modifier = Some(email.clone());
        }
    }

    /// Make the next call of kind `op` fail with `error`.
    ///
    /// Queued outcomes for the same op are consumed in order.
    pub fn fail_next(&self, op: DriveOp, error: DriveError) {
        self.state().failures.entry(op).or_default().push_back(Some(error));
    }

    /// Queue a pass-through for the next call of kind `op`.
    pub fn succeed_next(&self, op: DriveOp) {
        self.state().failures.entry(op).or_default().push_back(None);
    }

    /// Delay every call by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.state().latency = Some(latency);
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<DriveCall> {
        self.state().calls.clone()
    }

    /// Calls that would change access on the store.
    pub fn grant_calls(&self) -> Vec<DriveCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, DriveCall::InsertPermission { .. } | DriveCall::UpdatePermission { .. }))
            .collect()
    }

    /// Grants on a document, in insertion order. Duplicates are kept.
    pub fn permissions(&self, id: &DocumentId) -> Vec<(Email, Role)> {
        self.state()
            .files
            .get(id)
            .map(|f| f.grants.iter().map(|g| (g.email.clone(), g.role)).collect())
            .unwrap_or_default()
    }

    /// Current role of `email` on a document.
    pub fn role_of(&self, id: &DocumentId, email: &Email) -> Option<Role> {
        self.state()
            .files
            .get(id)
            .and_then(|f| f.grants.iter().rev().find(|g| &g.email == email))
            .map(|g| g.role)
    }

    /// Title of a stored file.
    pub fn title_of(&self, id: &DocumentId) -> Option<String> {
        self.state().files.get(id).map(|f| f.title.clone())
    }

    /// Journal the call, then pop an injected failure if one is queued.
    async fn enter(&self, call: DriveCall) -> Result<()> {
        let (latency, failure) = {
            let mut state = self.state();
            let op = call.op();
            state.calls.push(call);
            let failure = state
                .failures
                .get_mut(&op)
                .and_then(VecDeque::pop_front)
                .flatten();
            (state.latency, failure)
        };

        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        match failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn new_file(state: &mut State, title: String) -> Result<FileMeta> {
        state.next_file += 1;
        let id = DocumentId::parse(format!("mem-doc-{}", state.next_file))
            .map_err(|e| DriveError::Decode(e.to_string()))?;
        state.files.insert(
            id.clone(),
            FileState {
                title: title.clone(),
                ..FileState::default()
            },
        );
        Ok(FileMeta { id, title })
    }

    fn permission_id(state: &mut State, email: &Email) -> PermissionId {
        let next = state.permission_ids.len() + 1;
        state
            .permission_ids
            .entry(email.clone())
            .or_insert_with(|| PermissionId(format!("perm-{next}")))
            .clone()
    }
}

#[async_trait]
impl DocumentService for MemoryDrive {
    async fn create_document(&self, title: &str) -> Result<FileMeta> {
        self.enter(DriveCall::CreateDocument {
            title: title.to_string(),
        })
        .await?;

        let mut state = self.state();
        Self::new_file(&mut state, title.to_string())
    }

    async fn copy_template(&self, template_id: &DocumentId) -> Result<FileMeta> {
        self.enter(DriveCall::CopyTemplate {
            template_id: template_id.clone(),
        })
        .await?;

        let mut state = self.state();
        let title = state
            .files
            .get(template_id)
            .map(|f| f.title.clone())
            .ok_or_else(|| DriveError::NotFound(format!("file {template_id}")))?;
        Self::new_file(&mut state, title)
    }

    async fn insert_permission(&self, document_id: &DocumentId, grant: &Grant) -> Result<PermissionId> {
        self.enter(DriveCall::InsertPermission {
            document_id: document_id.clone(),
            email: grant.email.clone(),
            role: grant.role,
            notify: grant.send_notification_emails,
        })
        .await?;

        let mut state = self.state();
        if !state.files.contains_key(document_id) {
            return Err(DriveError::NotFound(format!("file {document_id}")));
        }
        let permission_id = Self::permission_id(&mut state, &grant.email);
        if let Some(file) = state.files.get_mut(document_id) {
            file.grants.push(StoredGrant {
                permission_id: permission_id.clone(),
                email: grant.email.clone(),
                role: grant.role,
            });
        }
        Ok(permission_id)
    }

    async fn permission_id_for_email(&self, email: &Email) -> Result<PermissionId> {
        self.enter(DriveCall::PermissionIdForEmail {
            email: email.clone(),
        })
        .await?;

        let mut state = self.state();
        Ok(Self::permission_id(&mut state, email))
    }

    async fn update_permission(
        &self,
        document_id: &DocumentId,
        permission_id: &PermissionId,
        grant: &Grant,
    ) -> Result<()> {
        self.enter(DriveCall::UpdatePermission {
            document_id: document_id.clone(),
            permission_id: permission_id.clone(),
            role: grant.role,
        })
        .await?;

        let mut state = self.state();
        let file = state
            .files
            .get_mut(document_id)
            .ok_or_else(|| DriveError::NotFound(format!("file {document_id}")))?;
        let mut found = false;
        for stored in file.grants.iter_mut().filter(|g| &g.permission_id == permission_id) {
            stored.role = grant.role;
            found = true;
        }
        if found {
            Ok(())
        } else {
            Err(DriveError::NotFound(format!(
                "permission {permission_id} on file {document_id}"
            )))
        }
    }

    async fn last_modifying_user(&self, document_id: &DocumentId) -> Result<Option<Email>> {
        self.enter(DriveCall::LastModifyingUser {
            document_id: document_id.clone(),
        })
        .await?;

        self.state()
            .files
            .get(document_id)
            .map(|f| f.last_modifier.clone())
            .ok_or_else(|| DriveError::NotFound(format!("file {document_id}")))
    }
}
