use tracing::{debug, warn};

use super::fetcher::{FetchError, FetchTicket, SessionId};
use super::menu::{self, CardAction, CardMenuOutcome};
use super::mutation::{
    Intent, MutationCoordinator, SubmissionError, SubmitReceipt, SubmitTicket, ValidationError,
};
use super::selection::{EditSelector, Selection};
use super::sentinel;
use super::store::FeedState;
use crate::model::{Card, CardId, CommentId, FeedPage};

/// Last failure worth showing to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedNotice {
    FetchFailed(FetchError),
    SubmissionFailed(Intent, SubmissionError),
}

impl std::fmt::Display for FeedNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedNotice::FetchFailed(e) => write!(f, "could not load comments: {}", e),
            FeedNotice::SubmissionFailed(intent, e) => write!(f, "{} failed: {}", intent, e),
        }
    }
}

/// The comment feed of one card-detail view.
///
/// Owns the feed state, the edit selection and the shared input for as long
/// as the view is open. All I/O happens outside: methods hand out
/// [`FetchTicket`]s and [`SubmitTicket`]s, and the caller reports their
/// outcomes back through `complete_fetch` / `complete_submission`.
/// Completions from an earlier session are dropped.
#[derive(Debug)]
pub struct CommentFeed {
    dashboard_id: u64,
    card: Option<Card>,
    session: SessionId,
    state: FeedState,
    selector: EditSelector,
    mutations: MutationCoordinator,
    /// A mutation finished while a page was in flight
    refresh_pending: bool,
    notice: Option<FeedNotice>,
}

impl CommentFeed {
    pub fn new(dashboard_id: u64) -> Self {
        CommentFeed {
            dashboard_id,
            card: None,
            session: SessionId::default(),
            state: FeedState::new(),
            selector: EditSelector::new(),
            mutations: MutationCoordinator::new(),
            refresh_pending: false,
            notice: None,
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Open the view for `card`: fresh state and the first-page fetch
    #[must_use = "the first page is only loaded once the ticket is fetched"]
    pub fn open(&mut self, card: Card) -> FetchTicket {
        self.discard();
        debug!(card = %card.id, "opening comment feed");
        let card_id = card.id;
        self.card = Some(card);
        self.refresh_ticket(card_id)
    }

    /// Close the view. Anything still in flight is ignored when it lands.
    pub fn close(&mut self) {
        if let Some(card) = &self.card {
            debug!(card = %card.id, "closing comment feed");
        }
        self.discard();
    }

    fn discard(&mut self) {
        self.session = self.session.next();
        self.card = None;
        self.state.reset();
        self.selector.cancel();
        self.mutations.clear();
        self.refresh_pending = false;
        self.notice = None;
    }

    pub fn is_open(&self) -> bool {
        self.card.is_some()
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn card(&self) -> Option<&Card> {
        self.card.as_ref()
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    pub fn selection(&self) -> &Selection {
        self.selector.selection()
    }

    pub fn input(&self) -> &str {
        self.selector.input()
    }

    /// The shared input, for keystrokes
    pub fn input_mut(&mut self) -> &mut EditSelector {
        &mut self.selector
    }

    pub fn notice(&self) -> Option<&FeedNotice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn is_pending(&self, id: CommentId) -> bool {
        self.mutations.is_pending(id)
    }

    pub fn submissions_in_flight(&self) -> usize {
        self.mutations.outstanding()
    }

    // -----------------------------------------------------------------------
    // Pagination
    // -----------------------------------------------------------------------

    /// The sentinel row became (or still is) visible
    pub fn on_sentinel_visible(&mut self) -> Option<FetchTicket> {
        let card_id = self.card.as_ref()?.id;
        sentinel::on_visible(&mut self.state, self.session, card_id)
    }

    /// Report the outcome of a fetch. Returns the deferred refresh fetch, if a
    /// mutation completed while this one was in flight.
    pub fn complete_fetch(
        &mut self,
        ticket: &FetchTicket,
        result: Result<FeedPage, FetchError>,
    ) -> Option<FetchTicket> {
        if !self.is_current(ticket.session) {
            debug!(card = %ticket.card_id, "dropping page for a closed view");
            return None;
        }
        match result {
            Ok(page) => {
                debug!(
                    card = %ticket.card_id,
                    count = page.items.len(),
                    last = page.is_last(),
                    "page applied"
                );
                self.state.apply_page(page);
                if matches!(self.notice, Some(FeedNotice::FetchFailed(_))) {
                    self.notice = None;
                }
            }
            Err(e) => {
                warn!(
                    card = %ticket.card_id,
                    cursor = ?ticket.cursor,
                    error = %e,
                    "page fetch failed"
                );
                self.state.fail_load();
                self.notice = Some(FeedNotice::FetchFailed(e));
            }
        }
        if self.refresh_pending {
            self.refresh_pending = false;
            return Some(self.refresh_ticket(ticket.card_id));
        }
        None
    }

    /// Reset to the first page and fetch it. Only valid when nothing is in flight.
    fn refresh_ticket(&mut self, card_id: CardId) -> FetchTicket {
        self.state.reset();
        self.state.begin_load();
        FetchTicket {
            session: self.session,
            card_id,
            cursor: None,
        }
    }

    fn is_current(&self, session: SessionId) -> bool {
        self.is_open() && session == self.session
    }

    // -----------------------------------------------------------------------
    // Editing and mutations
    // -----------------------------------------------------------------------

    /// Enter edit mode for a comment in the feed
    pub fn select_for_edit(&mut self, id: CommentId) -> Result<(), ValidationError> {
        let comment = self
            .state
            .find(id)
            .cloned()
            .ok_or(ValidationError::UnknownComment(id))?;
        self.selector.select(comment);
        Ok(())
    }

    pub fn cancel_edit(&mut self) {
        self.selector.cancel();
    }

    /// Submit the shared input: an edit while a comment is selected, a new
    /// comment otherwise.
    pub fn submit_input(&mut self) -> Result<SubmitTicket, ValidationError> {
        let card = self.card.as_ref().ok_or(ValidationError::NoSelection)?;
        let request = if self.selector.is_editing() {
            self.mutations.edit(
                card,
                self.dashboard_id,
                self.selector.selected(),
                self.selector.input(),
            )?
        } else {
            self.mutations
                .create(card, self.dashboard_id, self.selector.input())?
        };
        Ok(SubmitTicket {
            session: self.session,
            request,
        })
    }

    pub fn delete_comment(&mut self, id: CommentId) -> Result<SubmitTicket, ValidationError> {
        let card = self.card.as_ref().ok_or(ValidationError::UnknownComment(id))?;
        let request = self
            .mutations
            .delete(card, self.dashboard_id, &self.state, id)?;
        Ok(SubmitTicket {
            session: self.session,
            request,
        })
    }

    /// Report the outcome of a submission. On success the feed is refreshed
    /// from the first page; the returned ticket is that fetch. If a page is
    /// still in flight the refresh waits for it and comes out of
    /// `complete_fetch` instead.
    pub fn complete_submission(
        &mut self,
        ticket: &SubmitTicket,
        result: Result<SubmitReceipt, SubmissionError>,
    ) -> Option<FetchTicket> {
        if !self.is_current(ticket.session) {
            debug!(intent = %ticket.request.intent, "submission landed after view closed");
            return None;
        }
        let request = &ticket.request;
        if !self.mutations.complete(request, &result) {
            if let Err(e) = result {
                self.notice = Some(FeedNotice::SubmissionFailed(request.intent, e));
            }
            return None;
        }
        self.notice = None;

        match request.intent {
            Intent::CreateComment => {
                if !self.selector.is_editing() {
                    self.selector.clear_input();
                }
            }
            Intent::EditComment => {
                if self.selector.selected_id() == request.payload.comment_id {
                    self.selector.cancel();
                }
            }
            Intent::DeleteComment => {
                if let Some(id) = request.payload.comment_id {
                    self.selector.on_deleted(id);
                }
            }
            Intent::EditCard | Intent::DeleteCard => return None,
        }

        if self.state.is_loading() {
            self.refresh_pending = true;
            return None;
        }
        Some(self.refresh_ticket(request.payload.card_id))
    }

    // -----------------------------------------------------------------------
    // Card menu
    // -----------------------------------------------------------------------

    /// Dispatch a card action. The view closes either way.
    pub fn card_action(&mut self, action: CardAction) -> Option<CardMenuOutcome> {
        let card = self.card.as_ref()?;
        let outcome = menu::dispatch(card, self.dashboard_id, action);
        self.close();
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::fetcher::PageFetcher;
    use crate::feed::mutation::Method;
    use crate::feed::testing::{PagedFetcher, card, comment, comments};

    fn run(feed: &mut CommentFeed, fetcher: &PagedFetcher, ticket: FetchTicket) {
        let mut next = Some(ticket);
        while let Some(t) = next {
            let result = fetcher.fetch_page(t.card_id, t.cursor);
            next = feed.complete_fetch(&t, result);
        }
    }

    fn opened(fetcher: &PagedFetcher) -> CommentFeed {
        let mut feed = CommentFeed::new(1);
        let t = feed.open(card());
        run(&mut feed, fetcher, t);
        feed
    }

    #[test]
    fn empty_card_loads_nothing_and_stays_quiet() {
        let fetcher = PagedFetcher::new(vec![]);
        let mut feed = opened(&fetcher);

        assert!(feed.state().is_empty());
        assert!(!feed.state().is_loading());
        assert!(feed.state().cursor().is_exhausted());
        assert!(feed.on_sentinel_visible().is_none());
        assert_eq!(fetcher.calls().len(), 1);
    }

    #[test]
    fn two_pages_of_twenty() {
        let fetcher = PagedFetcher::new(vec![comments(40, 20), comments(20, 20)]);
        let mut feed = opened(&fetcher);

        assert_eq!(feed.state().len(), 20);
        assert!(!feed.state().cursor().is_exhausted());

        let t = feed.on_sentinel_visible().unwrap();
        run(&mut feed, &fetcher, t);

        assert_eq!(feed.state().len(), 40);
        assert!(feed.state().cursor().is_exhausted());
        assert!(feed.on_sentinel_visible().is_none());
    }

    #[test]
    fn initial_fetch_blocks_sentinel() {
        let fetcher = PagedFetcher::new(vec![comments(4, 2), comments(2, 2)]);
        let mut feed = CommentFeed::new(1);
        let t = feed.open(card());
        assert!(feed.state().is_loading());
        assert!(feed.on_sentinel_visible().is_none());
        run(&mut feed, &fetcher, t);
        assert_eq!(fetcher.calls().len(), 1);
    }

    #[test]
    fn page_arriving_after_close_is_dropped() {
        let fetcher = PagedFetcher::new(vec![comments(3, 3)]);
        let mut feed = CommentFeed::new(1);
        let t = feed.open(card());
        feed.close();

        let result = fetcher.fetch_page(t.card_id, t.cursor);
        assert!(feed.complete_fetch(&t, result).is_none());
        assert!(feed.state().is_empty());
        assert!(!feed.is_open());
    }

    #[test]
    fn page_from_previous_open_does_not_leak_into_reopened_view() {
        let fetcher = PagedFetcher::new(vec![comments(3, 3)]);
        let mut feed = CommentFeed::new(1);
        let stale = feed.open(card());
        let fresh = feed.open(card());

        let result = fetcher.fetch_page(stale.card_id, stale.cursor);
        feed.complete_fetch(&stale, result);
        assert!(feed.state().is_empty());
        assert!(feed.state().is_loading());

        run(&mut feed, &fetcher, fresh);
        assert_eq!(feed.state().len(), 3);
    }

    #[test]
    fn failed_initial_fetch_can_be_retried_by_sentinel() {
        let fetcher = PagedFetcher::new(vec![comments(2, 2)]);
        fetcher.fail_next();
        let mut feed = opened(&fetcher);

        assert!(matches!(feed.notice(), Some(FeedNotice::FetchFailed(_))));
        assert!(feed.state().is_empty());

        let t = feed.on_sentinel_visible().expect("retry allowed");
        assert!(t.is_initial());
        run(&mut feed, &fetcher, t);
        assert_eq!(feed.state().len(), 2);
        assert!(feed.notice().is_none());
    }

    #[test]
    fn select_then_submit_edits_selected_comment() {
        let fetcher = PagedFetcher::new(vec![vec![comment(2, "two"), comment(1, "one")]]);
        let mut feed = opened(&fetcher);

        feed.select_for_edit(CommentId(1)).unwrap();
        assert_eq!(feed.input(), "one");

        feed.input_mut().push_str(" (edited)");
        let ticket = feed.submit_input().unwrap();
        assert_eq!(ticket.request.intent, Intent::EditComment);
        assert_eq!(ticket.request.method, Method::Put);
        assert_eq!(ticket.request.payload.comment_id, Some(CommentId(1)));
        assert_eq!(ticket.request.payload.content.as_deref(), Some("one (edited)"));

        let refresh = feed
            .complete_submission(&ticket, Ok(SubmitReceipt::default()))
            .expect("refresh after edit");
        assert_eq!(feed.selection(), &Selection::Idle);
        assert_eq!(feed.input(), "");
        assert!(refresh.is_initial());
        assert!(feed.state().is_empty());
        assert!(feed.state().is_loading());
    }

    #[test]
    fn empty_create_never_reaches_the_sink() {
        let fetcher = PagedFetcher::new(vec![]);
        let mut feed = opened(&fetcher);
        feed.input_mut().set_input("   ");
        assert_eq!(
            feed.submit_input().unwrap_err(),
            ValidationError::EmptyContent
        );
        assert_eq!(feed.submissions_in_flight(), 0);
    }

    #[test]
    fn create_success_clears_input_and_refetches() {
        let fetcher = PagedFetcher::new(vec![comments(2, 2)]);
        let mut feed = opened(&fetcher);
        feed.input_mut().set_input("new one");

        let ticket = feed.submit_input().unwrap();
        assert_eq!(ticket.request.intent, Intent::CreateComment);
        let refresh = feed
            .complete_submission(&ticket, Ok(SubmitReceipt::default()))
            .unwrap();
        assert_eq!(feed.input(), "");
        run(&mut feed, &fetcher, refresh);
        assert_eq!(fetcher.calls(), vec![None, None]);
    }

    #[test]
    fn deleting_selected_comment_returns_to_idle() {
        let fetcher = PagedFetcher::new(vec![vec![comment(2, "two"), comment(1, "one")]]);
        let mut feed = opened(&fetcher);
        feed.select_for_edit(CommentId(2)).unwrap();

        let ticket = feed.delete_comment(CommentId(2)).unwrap();
        feed.complete_submission(&ticket, Ok(SubmitReceipt::default()));

        assert_eq!(feed.selection(), &Selection::Idle);
        assert_eq!(feed.input(), "");
    }

    #[test]
    fn deleting_other_comment_keeps_edit_mode() {
        let fetcher = PagedFetcher::new(vec![vec![comment(2, "two"), comment(1, "one")]]);
        let mut feed = opened(&fetcher);
        feed.select_for_edit(CommentId(2)).unwrap();

        let ticket = feed.delete_comment(CommentId(1)).unwrap();
        feed.complete_submission(&ticket, Ok(SubmitReceipt::default()));

        assert_eq!(feed.selection(), &Selection::Editing(comment(2, "two")));
        assert_eq!(feed.input(), "two");
    }

    #[test]
    fn failed_submission_leaves_everything_in_place() {
        let fetcher = PagedFetcher::new(vec![vec![comment(2, "two"), comment(1, "one")]]);
        let mut feed = opened(&fetcher);
        feed.select_for_edit(CommentId(2)).unwrap();
        feed.input_mut().set_input("rewritten");

        let ticket = feed.submit_input().unwrap();
        let refresh = feed.complete_submission(
            &ticket,
            Err(SubmissionError::Rejected("too long".into())),
        );

        assert!(refresh.is_none());
        assert!(feed.is_open());
        assert_eq!(feed.state().len(), 2);
        assert_eq!(feed.input(), "rewritten");
        assert_eq!(feed.selection(), &Selection::Editing(comment(2, "two")));
        assert!(matches!(
            feed.notice(),
            Some(FeedNotice::SubmissionFailed(Intent::EditComment, _))
        ));
        assert!(!feed.is_pending(CommentId(2)));
    }

    #[test]
    fn refresh_waits_for_in_flight_page() {
        let fetcher = PagedFetcher::new(vec![comments(4, 2), comments(2, 2)]);
        let mut feed = opened(&fetcher);

        let more = feed.on_sentinel_visible().unwrap();
        feed.input_mut().set_input("hi");
        let create = feed.submit_input().unwrap();

        assert!(
            feed.complete_submission(&create, Ok(SubmitReceipt::default()))
                .is_none()
        );
        let result = fetcher.fetch_page(more.card_id, more.cursor);
        let refresh = feed
            .complete_fetch(&more, result)
            .expect("deferred refresh issued");
        assert!(refresh.is_initial());
        assert!(feed.state().is_empty());
        assert!(feed.state().is_loading());

        run(&mut feed, &fetcher, refresh);
        assert_eq!(feed.state().len(), 2);
    }

    #[test]
    fn submission_after_close_is_ignored() {
        let fetcher = PagedFetcher::new(vec![]);
        let mut feed = opened(&fetcher);
        feed.input_mut().set_input("late");
        let ticket = feed.submit_input().unwrap();
        feed.close();
        assert!(
            feed.complete_submission(&ticket, Ok(SubmitReceipt::default()))
                .is_none()
        );
        assert!(feed.state().is_empty());
    }

    #[test]
    fn card_delete_closes_view() {
        let fetcher = PagedFetcher::new(vec![comments(1, 1)]);
        let mut feed = opened(&fetcher);
        match feed.card_action(CardAction::Delete) {
            Some(CardMenuOutcome::Delete(req)) => {
                assert_eq!(req.intent, Intent::DeleteCard);
                assert_eq!(req.payload.card_id, CardId(7));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(!feed.is_open());
        assert!(feed.state().is_empty());
    }
}
