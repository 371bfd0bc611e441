use std::sync::Arc;

use crate::error::Result;
use crate::services::DraftsApi;

/// A change to a single draft. Success is followed by a list refresh, never a local patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Update {
        draft_id: String,
        subject: String,
        body: String,
    },
    Send {
        draft_id: String,
        recipient_email: String,
    },
    Delete {
        draft_id: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Update,
    Send,
    Delete,
}

impl MutationKind {
    pub fn label(&self) -> &'static str {
        match self {
            MutationKind::Update => "save",
            MutationKind::Send => "send",
            MutationKind::Delete => "delete",
        }
    }
}

impl Mutation {
    pub fn draft_id(&self) -> &str {
        match self {
            Mutation::Update { draft_id, .. }
            | Mutation::Send { draft_id, .. }
            | Mutation::Delete { draft_id } => draft_id,
        }
    }

    pub fn kind(&self) -> MutationKind {
        match self {
            Mutation::Update { .. } => MutationKind::Update,
            Mutation::Send { .. } => MutationKind::Send,
            Mutation::Delete { .. } => MutationKind::Delete,
        }
    }

    /// Runs the mutation against the API. Send yields the provider message id.
    pub async fn apply(&self, api: Arc<dyn DraftsApi>) -> Result<Option<String>> {
        match self {
            Mutation::Update {
                draft_id,
                subject,
                body,
            } => {
                api.update_draft(draft_id, subject, body).await?;
                Ok(None)
            }
            Mutation::Send {
                draft_id,
                recipient_email,
            } => Ok(Some(api.send_draft(draft_id, recipient_email).await?)),
            Mutation::Delete { draft_id } => {
                api.delete_draft(draft_id).await?;
                Ok(None)
            }
        }
    }
}

/// Failure scoped to the draft and action that caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationError {
    pub draft_id: String,
    pub kind: MutationKind,
    pub message: String,
}

#[derive(Debug)]
pub struct MutationOutcome {
    pub draft_id: String,
    pub kind: MutationKind,
    pub result: std::result::Result<Option<String>, String>,
}

#[cfg(test)]
impl MutationOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}
