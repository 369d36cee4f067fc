use crate::model::{Comment, CommentId, Cursor, FeedPage};

/// Where pagination stands for the current feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorState {
    /// Nothing fetched since the last reset
    #[default]
    Unfetched,
    /// More pages exist; the token asks for the next one
    More(Cursor),
    /// The backend reported the end of the feed
    Exhausted,
}

impl CursorState {
    fn from_page(cursor: Option<Cursor>) -> Self {
        match cursor {
            Some(c) => CursorState::More(c),
            None => CursorState::Exhausted,
        }
    }

    /// Cursor to send with the next fetch (`None` = first page)
    pub fn next_request(self) -> Option<Cursor> {
        match self {
            CursorState::More(c) => Some(c),
            CursorState::Unfetched | CursorState::Exhausted => None,
        }
    }

    pub fn is_exhausted(self) -> bool {
        self == CursorState::Exhausted
    }
}

/// Accumulated comments for one open card, plus pagination bookkeeping.
///
/// `items` is append-only across pagination and fully replaced by `reset`.
/// Order is exactly the order pages arrived in; nothing is sorted or
/// deduplicated here.
#[derive(Debug, Clone, Default)]
pub struct FeedState {
    items: Vec<Comment>,
    cursor: CursorState,
    loading: bool,
}

impl FeedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Back to the empty, unfetched state
    pub fn reset(&mut self) {
        self.items.clear();
        self.cursor = CursorState::Unfetched;
        self.loading = false;
    }

    /// Mark a fetch as outstanding. Returns false when one already is; the
    /// caller must then skip its fetch.
    pub fn begin_load(&mut self) -> bool {
        if self.loading {
            return false;
        }
        self.loading = true;
        true
    }

    /// Merge a successfully fetched page
    pub fn apply_page(&mut self, page: FeedPage) {
        self.items.extend(page.items);
        self.cursor = CursorState::from_page(page.cursor);
        self.loading = false;
    }

    /// The outstanding fetch failed. Items and cursor stay as they were so
    /// the next trigger retries from the same place.
    pub fn fail_load(&mut self) {
        self.loading = false;
    }

    pub fn items(&self) -> &[Comment] {
        &self.items
    }

    pub fn cursor(&self) -> CursorState {
        self.cursor
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn can_load_more(&self) -> bool {
        !self.loading && !self.cursor.is_exhausted()
    }

    pub fn find(&self, id: CommentId) -> Option<&Comment> {
        self.items.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::testing::{comment, page};

    #[test]
    fn pages_append_in_arrival_order() {
        let mut state = FeedState::new();
        let sizes = [3usize, 5, 0, 2];
        let mut next_id = 100;
        let mut expected = Vec::new();
        for (i, size) in sizes.iter().enumerate() {
            let items: Vec<_> = (0..*size)
                .map(|_| {
                    next_id -= 1;
                    comment(next_id, "c")
                })
                .collect();
            expected.extend(items.iter().map(|c| c.id));
            let last = i == sizes.len() - 1;
            assert!(state.begin_load());
            state.apply_page(page(items, if last { None } else { Some(next_id) }));
        }
        assert_eq!(state.len(), sizes.iter().sum::<usize>());
        let ids: Vec<_> = state.items().iter().map(|c| c.id).collect();
        assert_eq!(ids, expected);
        assert!(state.cursor().is_exhausted());
        assert!(!state.is_loading());
    }

    #[test]
    fn begin_load_refuses_second_fetch() {
        let mut state = FeedState::new();
        assert!(state.begin_load());
        assert!(!state.begin_load());
        assert!(state.is_loading());
    }

    #[test]
    fn reset_twice_is_same_as_once() {
        let mut state = FeedState::new();
        state.begin_load();
        state.apply_page(page(vec![comment(2, "a"), comment(1, "b")], Some(1)));

        state.reset();
        let once = (state.len(), state.cursor(), state.is_loading());
        state.reset();
        let twice = (state.len(), state.cursor(), state.is_loading());

        assert_eq!(once, (0, CursorState::Unfetched, false));
        assert_eq!(once, twice);
    }

    #[test]
    fn failed_load_leaves_items_and_cursor() {
        let mut state = FeedState::new();
        state.begin_load();
        state.apply_page(page(vec![comment(9, "a")], Some(9)));

        state.begin_load();
        state.fail_load();

        assert_eq!(state.len(), 1);
        assert_eq!(state.cursor(), CursorState::More(Cursor::new(9)));
        assert!(state.can_load_more());
    }

    #[test]
    fn unfetched_requests_first_page() {
        assert_eq!(CursorState::Unfetched.next_request(), None);
        assert_eq!(
            CursorState::More(Cursor::new(4)).next_request(),
            Some(Cursor::new(4))
        );
        assert_eq!(CursorState::Exhausted.next_request(), None);
    }
}
