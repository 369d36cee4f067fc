use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use tracing::{info, warn};

use super::fetcher::SessionId;
use super::store::FeedState;
use crate::model::{Card, CardId, ColumnId, Comment, CommentId};

/// What a submission asks the backend to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Intent {
    CreateComment,
    EditComment,
    DeleteComment,
    EditCard,
    DeleteCard,
}

impl Intent {
    pub fn method(self) -> Method {
        match self {
            Intent::CreateComment => Method::Post,
            Intent::EditComment | Intent::EditCard => Method::Put,
            Intent::DeleteComment | Intent::DeleteCard => Method::Delete,
        }
    }

    /// Intents that change the comment feed (as opposed to the card itself)
    pub fn touches_feed(self) -> bool {
        matches!(
            self,
            Intent::CreateComment | Intent::EditComment | Intent::DeleteComment
        )
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Intent::CreateComment => "createComment",
            Intent::EditComment => "editComment",
            Intent::DeleteComment => "deleteComment",
            Intent::EditCard => "editTodo",
            Intent::DeleteCard => "deleteTodo",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Post,
    Put,
    Delete,
}

/// Fields sent with a submission. Which ones are set depends on the intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payload {
    pub card_id: CardId,
    pub column_id: ColumnId,
    pub dashboard_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_id: Option<CommentId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Payload {
    pub fn for_card(card: &Card, dashboard_id: u64) -> Self {
        Payload {
            card_id: card.id,
            column_id: card.column_id,
            dashboard_id,
            comment_id: None,
            content: None,
            title: None,
            description: None,
        }
    }
}

/// A validated write, ready for a [`SubmissionSink`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitRequest {
    pub intent: Intent,
    pub method: Method,
    pub payload: Payload,
}

impl SubmitRequest {
    pub fn new(intent: Intent, payload: Payload) -> Self {
        SubmitRequest {
            intent,
            method: intent.method(),
            payload,
        }
    }
}

/// A submission tied to the view session that issued it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitTicket {
    pub session: SessionId,
    pub request: SubmitRequest,
}

/// What the backend reports back on success
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReceipt {
    /// Comment created or touched by the request, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_id: Option<CommentId>,
}

/// Rejected before anything is sent
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("comment is empty")]
    EmptyContent,
    #[error("card title is empty")]
    EmptyTitle,
    #[error("no comment selected for editing")]
    NoSelection,
    #[error("comment {0} is not in this feed")]
    UnknownComment(CommentId),
    #[error("a change to comment {0} is still being submitted")]
    AlreadyPending(CommentId),
}

/// The backend refused or never received a submission
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("could not reach the board: {0}")]
    Transport(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("rejected: {0}")]
    Rejected(String),
}

/// Write side of the data-access collaborator
pub trait SubmissionSink {
    fn submit(&self, request: &SubmitRequest) -> Result<SubmitReceipt, SubmissionError>;
}

/// Validates comment writes and keeps per-comment submissions from
/// overlapping. Edits and deletes of the same comment are serialized; writes
/// to different comments, and creates, may race.
#[derive(Debug, Default)]
pub struct MutationCoordinator {
    pending: HashSet<CommentId>,
    outstanding: usize,
}

impl MutationCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(
        &mut self,
        card: &Card,
        dashboard_id: u64,
        content: &str,
    ) -> Result<SubmitRequest, ValidationError> {
        let content = non_empty(content)?;
        let mut payload = Payload::for_card(card, dashboard_id);
        payload.content = Some(content);
        self.outstanding += 1;
        Ok(SubmitRequest::new(Intent::CreateComment, payload))
    }

    pub fn edit(
        &mut self,
        card: &Card,
        dashboard_id: u64,
        selected: Option<&Comment>,
        content: &str,
    ) -> Result<SubmitRequest, ValidationError> {
        let target = selected.ok_or(ValidationError::NoSelection)?;
        let content = non_empty(content)?;
        self.claim(target.id)?;
        let mut payload = Payload::for_card(card, dashboard_id);
        payload.comment_id = Some(target.id);
        payload.content = Some(content);
        Ok(SubmitRequest::new(Intent::EditComment, payload))
    }

    pub fn delete(
        &mut self,
        card: &Card,
        dashboard_id: u64,
        feed: &FeedState,
        id: CommentId,
    ) -> Result<SubmitRequest, ValidationError> {
        if feed.find(id).is_none() {
            return Err(ValidationError::UnknownComment(id));
        }
        self.claim(id)?;
        let mut payload = Payload::for_card(card, dashboard_id);
        payload.comment_id = Some(id);
        Ok(SubmitRequest::new(Intent::DeleteComment, payload))
    }

    /// Record a completion. Returns true on success.
    pub fn complete(
        &mut self,
        request: &SubmitRequest,
        result: &Result<SubmitReceipt, SubmissionError>,
    ) -> bool {
        if let Some(id) = request.payload.comment_id {
            self.pending.remove(&id);
        }
        self.outstanding = self.outstanding.saturating_sub(1);
        match result {
            Ok(_) => {
                info!(intent = %request.intent, card = %request.payload.card_id, "submission completed");
                true
            }
            Err(e) => {
                warn!(
                    intent = %request.intent,
                    card = %request.payload.card_id,
                    error = %e,
                    "submission failed"
                );
                false
            }
        }
    }

    pub fn is_pending(&self, id: CommentId) -> bool {
        self.pending.contains(&id)
    }

    /// Submissions sent and not yet completed
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    /// Forget everything in flight (view closed)
    pub fn clear(&mut self) {
        self.pending.clear();
        self.outstanding = 0;
    }

    fn claim(&mut self, id: CommentId) -> Result<(), ValidationError> {
        if !self.pending.insert(id) {
            return Err(ValidationError::AlreadyPending(id));
        }
        self.outstanding += 1;
        Ok(())
    }
}

fn non_empty(content: &str) -> Result<String, ValidationError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyContent);
    }
    Ok(trimmed.to_string())
}
