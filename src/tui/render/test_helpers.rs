use std::path::PathBuf;

use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;

pub use crate::feed::testing::comments;
use crate::feed::testing::page;
use crate::io::worker::{Completion, Job};
use crate::model::{Assignee, Board, BoardConfig, Card, CardId, ColumnId, Comment};
use crate::tui::app::App;

pub const TERM_W: u16 = 80;
pub const TERM_H: u16 = 24;

/// Draw with `f` on a `w`x`h` test terminal and return the screen as text,
/// one line per row, trailing spaces and blank rows dropped.
pub fn render_to_string(w: u16, h: u16, f: impl FnOnce(&mut ratatui::Frame, Rect)) -> String {
    let mut terminal = Terminal::new(TestBackend::new(w, h)).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area)
        })
        .unwrap();

    let buffer = terminal.backend().buffer();
    let mut rows: Vec<String> = buffer
        .content
        .chunks(usize::from(buffer.area.width))
        .map(|row| {
            let text: String = row.iter().map(|cell| cell.symbol()).collect();
            text.trim_end().to_string()
        })
        .collect();
    while rows.last().is_some_and(|row| row.is_empty()) {
        rows.pop();
    }
    rows.join("\n")
}

const TEST_CONFIG: &str = r#"
[board]
name = "Test Board"
dashboard_id = 5

[[columns]]
id = 1
title = "To do"

[[columns]]
id = 2
title = "Done"
"#;

/// An in-memory board with two cards; nothing touches the disk.
pub fn test_board() -> Board {
    let config: BoardConfig = toml::from_str(TEST_CONFIG).unwrap();

    let mut docs = Card::new(CardId(1), ColumnId(1), "Write docs".into());
    docs.description = "All of them".into();
    docs.tags = vec!["docs".into()];
    docs.assignee = Some(Assignee {
        nickname: "mina".into(),
        profile_image_url: None,
    });
    docs.due_date = chrono::NaiveDate::from_ymd_opt(2025, 4, 1);
    let ship = Card::new(CardId(2), ColumnId(2), "Ship it".into());

    Board {
        root: PathBuf::from("/tmp/test-board"),
        board_dir: PathBuf::from("/tmp/test-board/board"),
        config,
        cards: vec![ship, docs],
    }
}

pub fn test_app() -> App {
    App::new(test_board())
}

/// Open "Write docs" and answer its first fetch with the given page
pub fn open_with_page(app: &mut App, items: Vec<Comment>, cursor: Option<u64>) {
    open_loading(app);
    let ticket = match app.take_jobs().pop() {
        Some(Job::Fetch(t)) => t,
        other => panic!("expected a fetch, got {:?}", other),
    };
    app.on_completion(Completion::Fetched(ticket, Ok(page(items, cursor))));
}

/// Open "Write docs" with its first fetch still in flight
pub fn open_loading(app: &mut App) {
    app.card_cursor = 0;
    app.open_selected_card();
}
