use crate::model::{CardId, Cursor, FeedPage};

/// Error type for page fetches
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The request never completed; trying again later may work
    #[error("network error: {0}")]
    Network(String),
    /// The backend answered with a failure that retrying will not fix
    #[error("server error: {0}")]
    Server(String),
}

impl FetchError {
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Network(_))
    }
}

/// Source of comment pages for a card
pub trait PageFetcher {
    /// Fetch one page. `cursor = None` asks for the first page.
    fn fetch_page(&self, card: CardId, cursor: Option<Cursor>) -> Result<FeedPage, FetchError>;
}

/// Identifies one open lifetime of a detail view.
///
/// Completions tagged with an older session belong to a view that has since
/// been closed (or reopened) and must not touch the current feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SessionId(u64);

impl SessionId {
    pub fn next(self) -> SessionId {
        SessionId(self.0.wrapping_add(1))
    }
}

/// A fetch the feed has committed to (its `loading` flag is already set).
/// Whoever runs it must hand the result back to the feed that issued it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub session: SessionId,
    pub card_id: CardId,
    pub cursor: Option<Cursor>,
}

impl FetchTicket {
    /// First-page fetch (initial open or post-mutation refresh)
    pub fn is_initial(&self) -> bool {
        self.cursor.is_none()
    }

    pub fn run(&self, fetcher: &dyn PageFetcher) -> Result<FeedPage, FetchError> {
        fetcher.fetch_page(self.card_id, self.cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_errors_are_transient() {
        assert!(FetchError::Network("reset".into()).is_transient());
        assert!(!FetchError::Server("bad cursor".into()).is_transient());
    }

    #[test]
    fn sessions_advance() {
        let s = SessionId::default();
        assert_ne!(s, s.next());
        assert_eq!(s.next(), s.next());
    }
}
