use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{info, warn};

use crate::feed::{
    CardAction, CardMenuOutcome, CommentFeed, Intent, SubmissionError, SubmitReceipt,
    SubmitRequest, SubmitTicket, menu,
};
use crate::io::board_io;
use crate::io::comment_store::LocalBoard;
use crate::io::worker::{Completion, FeedWorker, Job};
use crate::logging;
use crate::model::{Board, Card, Comment};

use super::input;
use super::render;
use super::theme::Theme;

/// Which view is currently displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// All cards, grouped by column
    Cards,
    /// One card with its comment feed
    Detail,
}

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    /// Typing into the comment input
    Input,
    /// Card action menu open over the detail view
    Menu,
    /// Card editor open over the card list
    CardEdit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardField {
    Title,
    Description,
}

/// Title and description being edited for one card
#[derive(Debug, Clone)]
pub struct CardEditor {
    pub card: Card,
    pub title: String,
    pub description: String,
    pub field: CardField,
}

impl CardEditor {
    pub fn new(card: Card) -> Self {
        CardEditor {
            title: card.title.clone(),
            description: card.description.clone(),
            card,
            field: CardField::Title,
        }
    }

    /// The buffer of the focused field
    pub fn buffer_mut(&mut self) -> &mut String {
        match self.field {
            CardField::Title => &mut self.title,
            CardField::Description => &mut self.description,
        }
    }

    pub fn toggle_field(&mut self) {
        self.field = match self.field {
            CardField::Title => CardField::Description,
            CardField::Description => CardField::Title,
        };
    }
}

/// Main application state.
///
/// No I/O happens here: work for the background worker is queued in an
/// outbox that the event loop drains, and finished work comes back through
/// [`App::on_completion`].
pub struct App {
    pub board: Board,
    pub view: View,
    pub mode: Mode,
    pub should_quit: bool,
    pub theme: Theme,
    /// Index into `board.cards_by_column()`
    pub card_cursor: usize,
    /// Comment feed of the open card
    pub feed: CommentFeed,
    /// Index into the feed's items
    pub comment_cursor: usize,
    /// First visible row of the detail view's comment area
    pub detail_scroll: usize,
    /// Set by the detail renderer when the sentinel row is on screen
    pub sentinel_visible: bool,
    /// A page fetch failed; the sentinel stays quiet until the next keypress
    pub sentinel_hold: bool,
    pub menu_cursor: usize,
    pub card_editor: Option<CardEditor>,
    /// One-shot status message, cleared on the next key
    pub message: Option<String>,
    outbox: Vec<Job>,
}

impl App {
    pub fn new(board: Board) -> Self {
        let theme = Theme::from_config(&board.config.ui);
        let feed = CommentFeed::new(board.config.board.dashboard_id);
        App {
            board,
            view: View::Cards,
            mode: Mode::Navigate,
            should_quit: false,
            theme,
            card_cursor: 0,
            feed,
            comment_cursor: 0,
            detail_scroll: 0,
            sentinel_visible: false,
            sentinel_hold: false,
            menu_cursor: 0,
            card_editor: None,
            message: None,
            outbox: Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Card list
    // -----------------------------------------------------------------------

    pub fn selected_card(&self) -> Option<&Card> {
        self.board.cards_by_column().get(self.card_cursor).copied()
    }

    pub fn move_card_cursor(&mut self, delta: isize) {
        let len = self.board.cards.len();
        if len == 0 {
            return;
        }
        self.card_cursor = self.card_cursor.saturating_add_signed(delta).min(len - 1);
    }

    /// Open the detail view for the card under the cursor
    pub fn open_selected_card(&mut self) {
        let Some(card) = self.selected_card().cloned() else {
            return;
        };
        let ticket = self.feed.open(card);
        self.outbox.push(Job::Fetch(ticket));
        self.view = View::Detail;
        self.mode = Mode::Navigate;
        self.comment_cursor = 0;
        self.detail_scroll = 0;
        self.sentinel_visible = false;
        self.sentinel_hold = false;
    }

    pub fn close_detail(&mut self) {
        self.feed.close();
        self.view = View::Cards;
        self.mode = Mode::Navigate;
        self.sentinel_visible = false;
    }

    // -----------------------------------------------------------------------
    // Comment feed
    // -----------------------------------------------------------------------

    pub fn selected_comment(&self) -> Option<&Comment> {
        self.feed.state().items().get(self.comment_cursor)
    }

    pub fn move_comment_cursor(&mut self, delta: isize) {
        let len = self.feed.state().len();
        if len == 0 {
            return;
        }
        self.comment_cursor = self
            .comment_cursor
            .saturating_add_signed(delta)
            .min(len - 1);
    }

    /// Start typing a new comment. Leaves edit mode if it was on.
    pub fn start_new_comment(&mut self) {
        if self.feed.selection().is_editing() {
            self.feed.cancel_edit();
        }
        self.mode = Mode::Input;
    }

    /// Load the comment under the cursor into the input for editing
    pub fn start_edit_selected(&mut self) {
        let Some(id) = self.selected_comment().map(|c| c.id) else {
            return;
        };
        match self.feed.select_for_edit(id) {
            Ok(()) => self.mode = Mode::Input,
            Err(e) => self.message = Some(e.to_string()),
        }
    }

    pub fn submit_input(&mut self) {
        match self.feed.submit_input() {
            Ok(ticket) => {
                self.outbox.push(Job::Submit(ticket));
                self.mode = Mode::Navigate;
            }
            Err(e) => self.message = Some(e.to_string()),
        }
    }

    /// Leave the input. An edit is abandoned; a new-comment draft is kept.
    pub fn cancel_input(&mut self) {
        if self.feed.selection().is_editing() {
            self.feed.cancel_edit();
        }
        self.mode = Mode::Navigate;
    }

    pub fn delete_selected(&mut self) {
        let Some(id) = self.selected_comment().map(|c| c.id) else {
            return;
        };
        match self.feed.delete_comment(id) {
            Ok(ticket) => self.outbox.push(Job::Submit(ticket)),
            Err(e) => self.message = Some(e.to_string()),
        }
    }

    /// Manual retry after a failed fetch
    pub fn retry(&mut self) {
        self.sentinel_hold = false;
        self.feed.dismiss_notice();
    }

    /// Called once per frame after rendering. The sentinel is re-evaluated
    /// every frame; the feed itself refuses while a fetch is in flight or
    /// the cursor is exhausted.
    pub fn on_frame(&mut self) {
        if self.view != View::Detail || !self.sentinel_visible || self.sentinel_hold {
            return;
        }
        if let Some(ticket) = self.feed.on_sentinel_visible() {
            self.outbox.push(Job::Fetch(ticket));
        }
    }

    // -----------------------------------------------------------------------
    // Card menu and editor
    // -----------------------------------------------------------------------

    pub fn open_menu(&mut self) {
        self.menu_cursor = 0;
        self.mode = Mode::Menu;
    }

    pub fn move_menu_cursor(&mut self, delta: isize) {
        self.menu_cursor = self
            .menu_cursor
            .saturating_add_signed(delta)
            .min(CardAction::ALL.len() - 1);
    }

    /// Run the highlighted menu action. The detail view closes either way.
    pub fn choose_menu_action(&mut self) {
        let action = CardAction::ALL[self.menu_cursor];
        let outcome = self.feed.card_action(action);
        self.view = View::Cards;
        self.mode = Mode::Navigate;
        self.sentinel_visible = false;
        match outcome {
            Some(CardMenuOutcome::OpenEditor(id)) => {
                if let Some(card) = self.board.find_card(id).cloned() {
                    self.card_editor = Some(CardEditor::new(card));
                    self.mode = Mode::CardEdit;
                }
            }
            Some(CardMenuOutcome::Delete(request)) => self.queue_submission(request),
            None => {}
        }
    }

    pub fn save_card_editor(&mut self) {
        let Some(editor) = &self.card_editor else {
            return;
        };
        match menu::edit_card(
            &editor.card,
            self.board.config.board.dashboard_id,
            &editor.title,
            &editor.description,
        ) {
            Ok(request) => {
                self.queue_submission(request);
                self.card_editor = None;
                self.mode = Mode::Navigate;
            }
            Err(e) => self.message = Some(e.to_string()),
        }
    }

    pub fn cancel_card_editor(&mut self) {
        self.card_editor = None;
        self.mode = Mode::Navigate;
    }

    /// Card writes happen after the view closed, so they belong to no feed
    /// session; their completions are handled here instead.
    fn queue_submission(&mut self, request: SubmitRequest) {
        self.outbox.push(Job::Submit(SubmitTicket {
            session: self.feed.session(),
            request,
        }));
    }

    // -----------------------------------------------------------------------
    // Worker plumbing
    // -----------------------------------------------------------------------

    /// Jobs queued since the last call
    pub fn take_jobs(&mut self) -> Vec<Job> {
        std::mem::take(&mut self.outbox)
    }

    /// Route a finished job back into the feed (or the card list)
    pub fn on_completion(&mut self, completion: Completion) {
        match completion {
            Completion::Fetched(ticket, result) => {
                let current = ticket.session == self.feed.session();
                let failed = result.is_err();
                if let Some(next) = self.feed.complete_fetch(&ticket, result) {
                    self.outbox.push(Job::Fetch(next));
                }
                // the latest fetch decides whether the sentinel may fire again
                if current {
                    self.sentinel_hold = failed;
                }
            }
            Completion::Submitted(ticket, result) => {
                if ticket.request.intent.touches_feed() {
                    if let Some(next) = self.feed.complete_submission(&ticket, result) {
                        self.outbox.push(Job::Fetch(next));
                    }
                } else {
                    self.on_card_submission(&ticket.request, result);
                }
            }
        }
        self.clamp_comment_cursor();
    }

    fn on_card_submission(
        &mut self,
        request: &SubmitRequest,
        result: Result<SubmitReceipt, SubmissionError>,
    ) {
        match result {
            Ok(_) => {
                info!(intent = %request.intent, card = %request.payload.card_id, "card updated");
                self.message = Some(match request.intent {
                    Intent::DeleteCard => format!("deleted card {}", request.payload.card_id),
                    _ => format!("saved card {}", request.payload.card_id),
                });
                self.reload_cards();
            }
            Err(e) => {
                warn!(intent = %request.intent, error = %e, "card update failed");
                self.message = Some(format!("{} failed: {}", request.intent, e));
            }
        }
    }

    fn reload_cards(&mut self) {
        match board_io::read_cards(&self.board.board_dir) {
            Ok(file) => {
                self.board.cards = file.cards;
                let len = self.board.cards.len();
                self.card_cursor = self.card_cursor.min(len.saturating_sub(1));
            }
            Err(e) => {
                warn!(error = %e, "could not reload cards");
                self.message = Some(e.to_string());
            }
        }
    }

    fn clamp_comment_cursor(&mut self) {
        let len = self.feed.state().len();
        self.comment_cursor = self.comment_cursor.min(len.saturating_sub(1));
    }
}

/// Run the TUI application
pub fn run(board_dir: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    // Discover and load the board
    let start = match board_dir {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir()?,
    };
    let root = board_io::discover_board(&start)?;
    let board = board_io::load_board(&root)?;

    let _log_guard = logging::init_file_logging(&board.board_dir, &board.config.log);
    info!(board = %board.config.board.name, cards = board.cards.len(), "starting tui");

    let worker = FeedWorker::start(Arc::new(LocalBoard::for_board(&board)))?;
    let mut app = App::new(board);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app, &worker);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("tui stopped");
    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    worker: &FeedWorker,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        for done in worker.poll() {
            app.on_completion(done);
        }

        terminal.draw(|frame| render::render(frame, app))?;
        app.on_frame();
        dispatch_jobs(app, worker);

        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            input::handle_key(app, key);
            dispatch_jobs(app, worker);
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

fn dispatch_jobs(app: &mut App, worker: &FeedWorker) {
    for job in app.take_jobs() {
        if let Err(failed) = worker.send(job) {
            app.on_completion(failed);
        }
    }
}
