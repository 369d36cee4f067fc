use std::path::Path;

use tracing::info;

use crate::feed::{SubmissionError, SubmitReceipt, SubmitRequest};
use crate::io::board_io::{self, BoardError};
use crate::io::lock::BoardLock;
use crate::model::{Card, CardId, Column, ColumnId};

/// Add a card to the bottom of a column. Cards are created locally only;
/// the comment feed never creates them.
pub fn create_card(
    board_dir: &Path,
    columns: &[Column],
    column_id: ColumnId,
    title: &str,
    description: &str,
    tags: Vec<String>,
) -> Result<Card, SubmissionError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(SubmissionError::Rejected("card title is empty".into()));
    }
    if !columns.iter().any(|c| c.id == column_id) {
        return Err(SubmissionError::NotFound(format!("column {}", column_id)));
    }
    let _lock = BoardLock::acquire(board_dir).map_err(BoardError::from)?;

    let mut file = board_io::read_cards(board_dir)?;
    let next = file
        .cards
        .iter()
        .map(|c| c.id.0 + 1)
        .max()
        .unwrap_or(1)
        .max(file.next_id);
    let mut card = Card::new(CardId(next), column_id, title.to_string());
    card.description = description.trim().to_string();
    card.tags = tags;
    file.next_id = next + 1;
    file.cards.push(card.clone());
    board_io::write_cards(board_dir, &file)?;
    info!(card = %card.id, column = %column_id, "card created");
    Ok(card)
}

/// Apply an `EditCard` submission (title and description)
pub fn edit_card(
    board_dir: &Path,
    request: &SubmitRequest,
) -> Result<SubmitReceipt, SubmissionError> {
    let card_id = request.payload.card_id;
    let _lock = BoardLock::acquire(board_dir).map_err(BoardError::from)?;

    let mut file = board_io::read_cards(board_dir)?;
    let card = file
        .cards
        .iter_mut()
        .find(|c| c.id == card_id)
        .ok_or_else(|| SubmissionError::NotFound(format!("card {}", card_id)))?;
    if let Some(title) = &request.payload.title {
        card.title = title.clone();
    }
    if let Some(description) = &request.payload.description {
        card.description = description.clone();
    }
    board_io::write_cards(board_dir, &file)?;
    info!(card = %card_id, "card edited");
    Ok(SubmitReceipt::default())
}

/// Apply a `DeleteCard` submission. The card's comments go with it.
pub fn delete_card(
    board_dir: &Path,
    request: &SubmitRequest,
) -> Result<SubmitReceipt, SubmissionError> {
    let card_id = request.payload.card_id;
    let _lock = BoardLock::acquire(board_dir).map_err(BoardError::from)?;

    let mut cards = board_io::read_cards(board_dir)?;
    let before = cards.cards.len();
    cards.cards.retain(|c| c.id != card_id);
    if cards.cards.len() == before {
        return Err(SubmissionError::NotFound(format!("card {}", card_id)));
    }

    let mut comments = board_io::read_comments(board_dir)?;
    let orphaned = comments.comments.iter().filter(|c| c.card_id == card_id).count();
    comments.comments.retain(|c| c.card_id != card_id);

    board_io::write_cards(board_dir, &cards)?;
    if orphaned > 0 {
        board_io::write_comments(board_dir, &comments)?;
    }
    info!(card = %card_id, comments = orphaned, "card deleted");
    Ok(SubmitReceipt::default())
}
