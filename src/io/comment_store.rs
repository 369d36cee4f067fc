//! Local board backend.
//!
//! Serves comment pages and applies submissions against the JSON files in a
//! board directory. It is the data-access collaborator for both the TUI
//! (through the worker thread) and the CLI.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info};

use crate::feed::{
    FetchError, Intent, PageFetcher, SubmissionError, SubmissionSink, SubmitReceipt,
    SubmitRequest,
};
use crate::io::board_io::{self, BoardError};
use crate::io::card_store;
use crate::io::lock::BoardLock;
use crate::model::{Author, Board, CardId, Comment, CommentId, Cursor, FeedPage};

impl From<BoardError> for FetchError {
    fn from(e: BoardError) -> Self {
        if e.is_corrupt() {
            FetchError::Server(e.to_string())
        } else {
            FetchError::Network(e.to_string())
        }
    }
}

impl From<BoardError> for SubmissionError {
    fn from(e: BoardError) -> Self {
        if e.is_corrupt() {
            SubmissionError::Rejected(e.to_string())
        } else {
            SubmissionError::Transport(e.to_string())
        }
    }
}

/// A board directory acting as the comment API
#[derive(Debug, Clone)]
pub struct LocalBoard {
    board_dir: PathBuf,
    page_size: usize,
    author: Author,
}

impl LocalBoard {
    pub fn new(board_dir: impl Into<PathBuf>, page_size: usize, author: Author) -> Self {
        LocalBoard {
            board_dir: board_dir.into(),
            page_size: page_size.max(1),
            author,
        }
    }

    pub fn for_board(board: &Board) -> Self {
        Self::new(
            board.board_dir.clone(),
            board.config.feed.page_size,
            current_author(),
        )
    }

    pub fn board_dir(&self) -> &Path {
        &self.board_dir
    }

    fn create_comment(&self, request: &SubmitRequest) -> Result<SubmitReceipt, SubmissionError> {
        let content = required_content(request)?;
        let card_id = request.payload.card_id;
        let _lock = BoardLock::acquire(&self.board_dir).map_err(BoardError::from)?;

        let cards = board_io::read_cards(&self.board_dir)?;
        if !cards.cards.iter().any(|c| c.id == card_id) {
            return Err(SubmissionError::NotFound(format!("card {}", card_id)));
        }

        let mut file = board_io::read_comments(&self.board_dir)?;
        // never reuse an id, even when nextId is missing or behind
        let next = file
            .comments
            .iter()
            .map(|c| c.id.0 + 1)
            .max()
            .unwrap_or(1)
            .max(file.next_id);
        let id = CommentId(next);
        file.next_id = next + 1;
        file.comments.push(Comment {
            id,
            content,
            author: self.author.clone(),
            created_at: Utc::now(),
            card_id,
        });
        board_io::write_comments(&self.board_dir, &file)?;
        info!(card = %card_id, comment = %id, "comment created");
        Ok(SubmitReceipt {
            comment_id: Some(id),
        })
    }

    fn edit_comment(&self, request: &SubmitRequest) -> Result<SubmitReceipt, SubmissionError> {
        let content = required_content(request)?;
        let id = required_comment(request)?;
        let _lock = BoardLock::acquire(&self.board_dir).map_err(BoardError::from)?;

        let mut file = board_io::read_comments(&self.board_dir)?;
        let comment = file
            .comments
            .iter_mut()
            .find(|c| c.id == id && c.card_id == request.payload.card_id)
            .ok_or_else(|| SubmissionError::NotFound(format!("comment {}", id)))?;
        comment.content = content;
        board_io::write_comments(&self.board_dir, &file)?;
        info!(comment = %id, "comment edited");
        Ok(SubmitReceipt {
            comment_id: Some(id),
        })
    }

    fn delete_comment(&self, request: &SubmitRequest) -> Result<SubmitReceipt, SubmissionError> {
        let id = required_comment(request)?;
        let _lock = BoardLock::acquire(&self.board_dir).map_err(BoardError::from)?;

        let mut file = board_io::read_comments(&self.board_dir)?;
        let before = file.comments.len();
        file.comments
            .retain(|c| !(c.id == id && c.card_id == request.payload.card_id));
        if file.comments.len() == before {
            return Err(SubmissionError::NotFound(format!("comment {}", id)));
        }
        board_io::write_comments(&self.board_dir, &file)?;
        info!(comment = %id, "comment deleted");
        Ok(SubmitReceipt {
            comment_id: Some(id),
        })
    }
}

impl PageFetcher for LocalBoard {
    fn fetch_page(&self, card: CardId, cursor: Option<Cursor>) -> Result<FeedPage, FetchError> {
        let file = board_io::read_comments(&self.board_dir)?;
        let page = paginate(file.comments, card, cursor, self.page_size);
        debug!(card = %card, cursor = ?cursor, count = page.items.len(), "served page");
        Ok(page)
    }
}

impl SubmissionSink for LocalBoard {
    fn submit(&self, request: &SubmitRequest) -> Result<SubmitReceipt, SubmissionError> {
        match request.intent {
            Intent::CreateComment => self.create_comment(request),
            Intent::EditComment => self.edit_comment(request),
            Intent::DeleteComment => self.delete_comment(request),
            Intent::EditCard => card_store::edit_card(&self.board_dir, request),
            Intent::DeleteCard => card_store::delete_card(&self.board_dir, request),
        }
    }
}

/// Cut one page out of all comments: newest first, strictly older than the
/// cursor. The cursor of a page is the id of its last comment, or `None`
/// when nothing older remains.
pub fn paginate(
    comments: Vec<Comment>,
    card: CardId,
    cursor: Option<Cursor>,
    page_size: usize,
) -> FeedPage {
    let mut remaining: Vec<Comment> = comments
        .into_iter()
        .filter(|c| c.card_id == card)
        .filter(|c| cursor.is_none_or(|cur| c.id.0 < cur.raw()))
        .collect();
    remaining.sort_by(|a, b| b.id.cmp(&a.id));

    let has_more = remaining.len() > page_size;
    remaining.truncate(page_size);
    let next = if has_more {
        remaining.last().map(|c| Cursor::new(c.id.0))
    } else {
        None
    };
    FeedPage {
        items: remaining,
        cursor: next,
    }
}

/// The local user, from `$CARDFEED_USER` or `$USER`
pub fn current_author() -> Author {
    let nickname = std::env::var("CARDFEED_USER")
        .or_else(|_| std::env::var("USER"))
        .unwrap_or_else(|_| "me".to_string());
    Author {
        id: 0,
        nickname,
        profile_image_url: None,
    }
}

fn required_content(request: &SubmitRequest) -> Result<String, SubmissionError> {
    request
        .payload
        .content
        .clone()
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| SubmissionError::Rejected("content is required".into()))
}

fn required_comment(request: &SubmitRequest) -> Result<CommentId, SubmissionError> {
    request
        .payload
        .comment_id
        .ok_or_else(|| SubmissionError::Rejected("commentId is required".into()))
}
