//! Infinite-scroll trigger.
//!
//! The sentinel is the marker row after the last comment. Whatever detects
//! its visibility (the TUI checks it on every frame) calls [`on_visible`];
//! the guard here decides whether that turns into a fetch. No feed state is
//! cached on this side, so a reset feed is seen as soon as it happens.

use tracing::debug;

use super::fetcher::{FetchTicket, SessionId};
use super::store::FeedState;
use crate::model::CardId;

/// Handle a "sentinel became visible" event.
///
/// Starts the next page fetch when more data may exist and nothing is in
/// flight. The returned ticket must be run and its result handed back to the
/// feed; until then `loading` stays set and further events are no-ops.
pub fn on_visible(
    feed: &mut FeedState,
    session: SessionId,
    card_id: CardId,
) -> Option<FetchTicket> {
    if feed.cursor().is_exhausted() {
        return None;
    }
    if !feed.begin_load() {
        return None;
    }
    let cursor = feed.cursor().next_request();
    debug!(card = %card_id, cursor = ?cursor, "sentinel requested next page");
    Some(FetchTicket {
        session,
        card_id,
        cursor,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::testing::{PagedFetcher, comment, comments};
    use crate::model::Cursor;

    const CARD: CardId = CardId(7);

    /// Run a ticket against the fake backend and apply the outcome
    fn settle(feed: &mut FeedState, fetcher: &PagedFetcher, ticket: &FetchTicket) {
        match ticket.run(fetcher) {
            Ok(page) => feed.apply_page(page),
            Err(_) => feed.fail_load(),
        }
    }

    #[test]
    fn two_triggers_before_resolution_fetch_once() {
        let fetcher = PagedFetcher::new(vec![comments(40, 20), comments(20, 20)]);
        let mut feed = FeedState::new();
        let s = SessionId::default();

        let first = on_visible(&mut feed, s, CARD).expect("first trigger fires");
        assert!(on_visible(&mut feed, s, CARD).is_none());
        assert!(feed.is_loading());

        settle(&mut feed, &fetcher, &first);
        assert_eq!(fetcher.calls().len(), 1);
        assert!(!feed.is_loading());
    }

    #[test]
    fn exhausted_feed_never_fetches_again() {
        let fetcher = PagedFetcher::new(vec![vec![comment(1, "only")]]);
        let mut feed = FeedState::new();
        let s = SessionId::default();

        let t = on_visible(&mut feed, s, CARD).unwrap();
        settle(&mut feed, &fetcher, &t);
        assert!(feed.cursor().is_exhausted());

        for _ in 0..5 {
            assert!(on_visible(&mut feed, s, CARD).is_none());
        }
        assert_eq!(fetcher.calls().len(), 1);
    }

    #[test]
    fn rearms_after_each_cycle_and_passes_cursor() {
        let fetcher = PagedFetcher::new(vec![
            comments(30, 10),
            comments(20, 10),
            comments(10, 10),
        ]);
        let mut feed = FeedState::new();
        let s = SessionId::default();

        while let Some(t) = on_visible(&mut feed, s, CARD) {
            settle(&mut feed, &fetcher, &t);
        }

        assert_eq!(feed.len(), 30);
        assert_eq!(
            fetcher.calls(),
            vec![None, Some(Cursor::new(21)), Some(Cursor::new(11))]
        );
    }

    #[test]
    fn failure_allows_retry_from_same_cursor() {
        let fetcher = PagedFetcher::new(vec![comments(4, 2), comments(2, 2)]);
        let mut feed = FeedState::new();
        let s = SessionId::default();

        let t = on_visible(&mut feed, s, CARD).unwrap();
        settle(&mut feed, &fetcher, &t);

        fetcher.fail_next();
        let t = on_visible(&mut feed, s, CARD).unwrap();
        settle(&mut feed, &fetcher, &t);
        assert_eq!(feed.len(), 2);
        assert!(!feed.is_loading());

        let t = on_visible(&mut feed, s, CARD).unwrap();
        assert_eq!(t.cursor, Some(Cursor::new(3)));
        settle(&mut feed, &fetcher, &t);
        assert_eq!(feed.len(), 4);
    }

    #[test]
    fn sees_reset_state() {
        let fetcher = PagedFetcher::new(vec![vec![comment(1, "x")]]);
        let mut feed = FeedState::new();
        let s = SessionId::default();

        let t = on_visible(&mut feed, s, CARD).unwrap();
        settle(&mut feed, &fetcher, &t);
        assert!(on_visible(&mut feed, s, CARD).is_none());

        feed.reset();
        let t = on_visible(&mut feed, s.next(), CARD).expect("reset feed is fetchable");
        assert!(t.is_initial());
    }
}
