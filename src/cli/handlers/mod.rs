mod init;
pub use init::cmd_init;

use std::path::{Path, PathBuf};

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::feed::{
    CardAction, CardMenuOutcome, CommentFeed, PageFetcher, SubmissionError, SubmissionSink,
    SubmitReceipt, SubmitRequest, SubmitTicket, menu,
};
use crate::io::board_io::{self, BoardError};
use crate::io::card_store;
use crate::io::comment_store::LocalBoard;
use crate::io::config_io;
use crate::io::lock::BoardLock;
use crate::model::{Board, Card, CardId, ColumnId, CommentId, Cursor};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let board_dir = resolve_board_dir(cli.board_dir.as_deref())?;
    let dir = board_dir.as_deref();

    match cli.command {
        None => Err("no command given (try `cf --help`)".into()),
        Some(cmd) => match cmd {
            Commands::Init(args) => cmd_init(args, dir),

            // Read commands
            Commands::Cards => cmd_cards(dir, json),
            Commands::Show(args) => cmd_show(dir, args, json),
            Commands::Comments(args) => cmd_comments(dir, args, json),

            // Write commands
            Commands::Comment(cmd) => match cmd.action {
                CommentAction::Add { card, text } => cmd_comment_add(dir, card, &text, json),
                CommentAction::Edit { card, id, text } => {
                    cmd_comment_edit(dir, card, id, &text, json)
                }
                CommentAction::Rm { card, id } => cmd_comment_rm(dir, card, id, json),
            },
            Commands::Card(cmd) => match cmd.action {
                CardActionCmd::Add {
                    column,
                    title,
                    description,
                    tag,
                } => cmd_card_add(dir, column, &title, description.as_deref(), tag, json),
                CardActionCmd::Edit {
                    id,
                    title,
                    description,
                } => cmd_card_edit(dir, id, title, description, json),
                CardActionCmd::Rm { id } => cmd_card_rm(dir, id, json),
            },
            Commands::Column(cmd) => match cmd.action {
                ColumnAction::Add { title } => cmd_column_add(dir, &title, json),
                ColumnAction::List => cmd_column_list(dir, json),
            },
        },
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Absolute path for the -C flag, if given
pub fn resolve_board_dir(dir: Option<&str>) -> Result<Option<PathBuf>, String> {
    dir.map(|d| {
        std::fs::canonicalize(d).map_err(|e| format!("cannot resolve -C path '{}': {}", d, e))
    })
    .transpose()
}

pub fn load_board_at(dir: Option<&Path>) -> Result<Board, BoardError> {
    let start = match dir {
        Some(d) => d.to_path_buf(),
        None => std::env::current_dir()?,
    };
    let root = board_io::discover_board(&start)?;
    board_io::load_board(&root)
}

fn find_card(board: &Board, id: u64) -> Result<Card, String> {
    board
        .find_card(CardId(id))
        .cloned()
        .ok_or_else(|| format!("card not found: {}", id))
}

/// Open a feed on `card` and page through it until `done` says stop or the
/// cursor runs out. Fetch failures end the walk with an error.
fn load_feed(
    board: &Board,
    backend: &LocalBoard,
    card: Card,
    done: impl Fn(&CommentFeed) -> bool,
) -> Result<CommentFeed, Box<dyn std::error::Error>> {
    let mut feed = CommentFeed::new(board.config.board.dashboard_id);
    let mut next = Some(feed.open(card));
    while let Some(ticket) = next {
        let result = backend.fetch_page(ticket.card_id, ticket.cursor);
        if let Err(e) = &result {
            return Err(format!("could not load comments: {}", e).into());
        }
        next = feed.complete_fetch(&ticket, result);
        if next.is_none() && !done(&feed) {
            next = feed.on_sentinel_visible();
        }
    }
    Ok(feed)
}

/// Send a ticket to the backend and settle it in the feed, including the
/// first-page refresh a successful write triggers
fn submit(
    feed: &mut CommentFeed,
    backend: &LocalBoard,
    ticket: &SubmitTicket,
) -> Result<SubmitReceipt, SubmissionError> {
    let result = backend.submit(&ticket.request);
    if let Some(refresh) = feed.complete_submission(ticket, result.clone()) {
        let page = backend.fetch_page(refresh.card_id, refresh.cursor);
        feed.complete_fetch(&refresh, page);
    }
    result
}

fn report(
    request: &SubmitRequest,
    receipt: &SubmitReceipt,
    json: bool,
    message: String,
) -> CmdResult {
    if json {
        let out = SubmitJson {
            intent: request.intent.to_string(),
            card_id: request.payload.card_id.0,
            receipt,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}", message);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_cards(dir: Option<&Path>, json: bool) -> CmdResult {
    let board = load_board_at(dir)?;
    let cards = board.cards_by_column();

    if json {
        let out: Vec<CardJson> = cards
            .into_iter()
            .map(|card| CardJson {
                card,
                column: board.config.column_title(card.column_id),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let mut current: Option<ColumnId> = None;
    for card in cards {
        if current != Some(card.column_id) {
            if current.is_some() {
                println!();
            }
            println!(
                "== {} ({}) ==",
                board.config.column_title(card.column_id),
                card.column_id
            );
            current = Some(card.column_id);
        }
        println!("{}", format_card_line(card));
    }
    Ok(())
}

fn cmd_show(dir: Option<&Path>, args: ShowArgs, json: bool) -> CmdResult {
    let board = load_board_at(dir)?;
    let card = find_card(&board, args.id)?;
    let column = board.config.column_title(card.column_id);

    if json {
        let out = CardJson {
            card: &card,
            column,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for line in format_card_detail(&card, &column) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_comments(dir: Option<&Path>, args: CommentsArgs, json: bool) -> CmdResult {
    let board = load_board_at(dir)?;
    let card = find_card(&board, args.card)?;
    let backend = LocalBoard::for_board(&board);

    let (comments, cursor) = if args.all {
        let feed = load_feed(&board, &backend, card, |_| false)?;
        (feed.state().items().to_vec(), None)
    } else {
        let page = backend.fetch_page(card.id, args.cursor.map(Cursor::new))?;
        (page.items, page.cursor)
    };

    if json {
        let out = CommentPageJson {
            card_id: args.card,
            comments: &comments,
            cursor,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if comments.is_empty() {
        println!("no comments");
    }
    for comment in &comments {
        for line in format_comment(comment) {
            println!("{}", line);
        }
    }
    if let Some(c) = cursor {
        println!("-- more: cf comments {} --cursor {}", args.card, c);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Comment commands
// ---------------------------------------------------------------------------

fn cmd_comment_add(dir: Option<&Path>, card_id: u64, text: &str, json: bool) -> CmdResult {
    let board = load_board_at(dir)?;
    let card = find_card(&board, card_id)?;
    let backend = LocalBoard::for_board(&board);

    let mut feed = load_feed(&board, &backend, card, |_| true)?;
    feed.input_mut().set_input(text);
    let ticket = feed.submit_input()?;
    let receipt = submit(&mut feed, &backend, &ticket)?;
    let id = receipt.comment_id.map(|c| c.to_string()).unwrap_or_default();
    report(
        &ticket.request,
        &receipt,
        json,
        format!("added comment #{} to card {}", id, card_id),
    )
}

fn cmd_comment_edit(
    dir: Option<&Path>,
    card_id: u64,
    id: u64,
    text: &str,
    json: bool,
) -> CmdResult {
    let board = load_board_at(dir)?;
    let card = find_card(&board, card_id)?;
    let backend = LocalBoard::for_board(&board);
    let target = CommentId(id);

    let mut feed = load_feed(&board, &backend, card, |f| f.state().find(target).is_some())?;
    feed.select_for_edit(target)?;
    feed.input_mut().set_input(text);
    let ticket = feed.submit_input()?;
    let receipt = submit(&mut feed, &backend, &ticket)?;
    report(&ticket.request, &receipt, json, format!("edited comment #{}", id))
}

fn cmd_comment_rm(dir: Option<&Path>, card_id: u64, id: u64, json: bool) -> CmdResult {
    let board = load_board_at(dir)?;
    let card = find_card(&board, card_id)?;
    let backend = LocalBoard::for_board(&board);
    let target = CommentId(id);

    let mut feed = load_feed(&board, &backend, card, |f| f.state().find(target).is_some())?;
    let ticket = feed.delete_comment(target)?;
    let receipt = submit(&mut feed, &backend, &ticket)?;
    report(&ticket.request, &receipt, json, format!("deleted comment #{}", id))
}

// ---------------------------------------------------------------------------
// Card commands
// ---------------------------------------------------------------------------

fn cmd_card_add(
    dir: Option<&Path>,
    column: u64,
    title: &str,
    description: Option<&str>,
    tags: Vec<String>,
    json: bool,
) -> CmdResult {
    let board = load_board_at(dir)?;
    let card = card_store::create_card(
        &board.board_dir,
        &board.config.columns,
        ColumnId(column),
        title,
        description.unwrap_or_default(),
        tags,
    )?;

    if json {
        let out = CardJson {
            card: &card,
            column: board.config.column_title(card.column_id),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("added card {}: {}", card.id, card.title);
    }
    Ok(())
}

fn cmd_card_edit(
    dir: Option<&Path>,
    id: u64,
    title: Option<String>,
    description: Option<String>,
    json: bool,
) -> CmdResult {
    if title.is_none() && description.is_none() {
        return Err("nothing to change: pass --title and/or --description".into());
    }
    let board = load_board_at(dir)?;
    let card = find_card(&board, id)?;
    let backend = LocalBoard::for_board(&board);

    let request = menu::edit_card(
        &card,
        board.config.board.dashboard_id,
        title.as_deref().unwrap_or(&card.title),
        description.as_deref().unwrap_or(&card.description),
    )?;
    let receipt = backend.submit(&request)?;
    report(&request, &receipt, json, format!("edited card {}", id))
}

fn cmd_card_rm(dir: Option<&Path>, id: u64, json: bool) -> CmdResult {
    let board = load_board_at(dir)?;
    let card = find_card(&board, id)?;
    let backend = LocalBoard::for_board(&board);

    let mut feed = load_feed(&board, &backend, card, |_| true)?;
    match feed.card_action(CardAction::Delete) {
        Some(CardMenuOutcome::Delete(request)) => {
            let receipt = backend.submit(&request)?;
            report(&request, &receipt, json, format!("deleted card {}", id))
        }
        _ => Err(format!("card not found: {}", id).into()),
    }
}

// ---------------------------------------------------------------------------
// Column commands
// ---------------------------------------------------------------------------

fn cmd_column_add(dir: Option<&Path>, title: &str, json: bool) -> CmdResult {
    let title = title.trim();
    if title.is_empty() {
        return Err("column title cannot be empty".into());
    }
    let board = load_board_at(dir)?;
    let _lock = BoardLock::acquire(&board.board_dir)?;

    let (config, mut doc) = config_io::read_config(&board.board_dir)?;
    let id = config_io::add_column(&mut doc, &config.columns, title);
    config_io::write_config(&board.board_dir, &doc)?;

    if json {
        println!("{}", serde_json::json!({ "id": id, "title": title }));
    } else {
        println!("added column {}: {}", id, title);
    }
    Ok(())
}

fn cmd_column_list(dir: Option<&Path>, json: bool) -> CmdResult {
    let board = load_board_at(dir)?;
    let count = |id: ColumnId| board.cards.iter().filter(|c| c.column_id == id).count();

    if json {
        let out: Vec<ColumnJson> = board
            .config
            .columns
            .iter()
            .map(|column| ColumnJson {
                column,
                cards: count(column.id),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for column in &board.config.columns {
            println!("{:>4}  {} ({})", column.id, column.title, count(column.id));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::board_io::tests::create_test_board;
    use tempfile::TempDir;

    #[test]
    fn write_leaves_feed_settled_on_fresh_first_page() {
        let tmp = TempDir::new().unwrap();
        create_test_board(tmp.path());
        let board = load_board_at(Some(tmp.path())).unwrap();
        let backend = LocalBoard::for_board(&board);
        let card = find_card(&board, 1).unwrap();

        let mut feed = load_feed(&board, &backend, card, |_| true).unwrap();
        assert!(!feed.state().is_loading());

        feed.input_mut().set_input("fourth");
        let ticket = feed.submit_input().unwrap();
        submit(&mut feed, &backend, &ticket).unwrap();

        assert!(!feed.state().is_loading());
        assert_eq!(feed.state().items()[0].content, "fourth");
        assert_eq!(feed.input(), "");
    }
}
