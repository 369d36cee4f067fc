use std::path::PathBuf;

use super::card::{Card, CardId};
use super::config::BoardConfig;

/// A loaded board: config plus the cards it holds.
///
/// Comments are not loaded here; they are paged in per card through the
/// comment feed.
#[derive(Debug, Clone)]
pub struct Board {
    /// Directory containing the `board/` folder
    pub root: PathBuf,
    /// The `board/` directory itself
    pub board_dir: PathBuf,
    pub config: BoardConfig,
    pub cards: Vec<Card>,
}

impl Board {
    pub fn find_card(&self, id: CardId) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    /// Cards ordered by column (config order), then by id
    pub fn cards_by_column(&self) -> Vec<&Card> {
        let rank = |card: &Card| {
            self.config
                .columns
                .iter()
                .position(|c| c.id == card.column_id)
                .unwrap_or(usize::MAX)
        };
        let mut cards: Vec<&Card> = self.cards.iter().collect();
        cards.sort_by_key(|c| (rank(c), c.id));
        cards
    }
}
