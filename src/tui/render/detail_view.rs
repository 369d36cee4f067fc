use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::{Card, Comment};
use crate::tui::app::{App, Mode};
use crate::util::unicode;

/// Left gutter: selection bar plus padding
const GUTTER: usize = 3;
/// Comment bodies sit one column in from the author line
const BODY_INDENT: usize = GUTTER + 1;
/// Widths of the placeholder bars drawn per skeleton row
const SKELETON_BARS: [(usize, usize); 3] = [(10, 28), (8, 40), (12, 22)];

/// Render the card detail view: card header, comment feed, input box.
///
/// Also records whether the sentinel row ended up on screen and keeps the
/// selected comment in view.
pub fn render_detail_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let Some(card) = app.feed.card().cloned() else {
        app.sentinel_visible = false;
        let empty = Paragraph::new(" No card open")
            .style(Style::default().fg(app.theme.muted).bg(app.theme.background));
        frame.render_widget(empty, area);
        return;
    };

    let width = area.width as usize;
    let header = header_lines(app, &card, width);
    let header_height = (header.len() as u16).min(area.height / 2);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(header_height),
            Constraint::Min(1),
            Constraint::Length(2), // input + hint
        ])
        .split(area);

    let bg = app.theme.background;
    frame.render_widget(
        Paragraph::new(header).style(Style::default().bg(bg)),
        chunks[0],
    );
    render_feed(frame, app, chunks[1]);
    render_input(frame, app, chunks[2]);
}

fn header_lines(app: &App, card: &Card, width: usize) -> Vec<Line<'static>> {
    let bg = app.theme.background;
    let dim_style = Style::default().fg(app.theme.muted).bg(bg);
    let text_style = Style::default().fg(app.theme.text).bg(bg);

    let mut lines: Vec<Line<'static>> = vec![Line::from("")];

    // Column badge + title
    let badge = format!(" {} ", app.board.config.column_title(card.column_id));
    let title_room = width.saturating_sub(GUTTER + unicode::display_width(&badge) + 1);
    lines.push(Line::from(vec![
        Span::styled("   ", Style::default().bg(bg)),
        Span::styled(
            badge,
            Style::default()
                .fg(app.theme.background)
                .bg(app.theme.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" ", Style::default().bg(bg)),
        Span::styled(
            unicode::truncate_to_width(&card.title, title_room),
            Style::default()
                .fg(app.theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ),
    ]));

    // Tags, assignee, due date on one line
    let mut meta: Vec<Span<'static>> = vec![Span::styled("   ", Style::default().bg(bg))];
    for tag in &card.tags {
        meta.push(Span::styled(
            format!("#{} ", tag),
            Style::default().fg(app.theme.tag_color(tag)).bg(bg),
        ));
    }
    if let Some(assignee) = &card.assignee {
        meta.push(Span::styled(
            format!("({}) ", assignee.initial()),
            Style::default().fg(app.theme.info).bg(bg),
        ));
        meta.push(Span::styled(format!("{} ", assignee.nickname), text_style));
    }
    if let Some(due) = card.due_date {
        meta.push(Span::styled("due ", dim_style));
        meta.push(Span::styled(
            due.format("%Y-%m-%d").to_string(),
            Style::default().fg(app.theme.warning).bg(bg),
        ));
    }
    if meta.len() > 1 {
        lines.push(Line::from(meta));
    }

    if let Some(url) = &card.image_url {
        lines.push(Line::from(vec![
            Span::styled("   image: ", dim_style),
            Span::styled(
                unicode::truncate_to_width(url, width.saturating_sub(10)),
                text_style,
            ),
        ]));
    }

    if !card.description.trim().is_empty() {
        lines.push(Line::from(""));
        for row in unicode::wrap_text(&card.description, width.saturating_sub(GUTTER + 1)) {
            lines.push(Line::from(Span::styled(format!("   {}", row), text_style)));
        }
    }

    lines.push(Line::from(""));
    let label = " Comments ";
    let rule = "\u{2500}".repeat(width.saturating_sub(GUTTER + label.len() + 2));
    lines.push(Line::from(vec![
        Span::styled("   \u{2500}\u{2500}", dim_style),
        Span::styled(
            label,
            Style::default()
                .fg(app.theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(rule, dim_style),
    ]));
    lines
}

fn render_feed(frame: &mut Frame, app: &mut App, area: Rect) {
    let bg = app.theme.background;
    let dim_style = Style::default().fg(app.theme.muted).bg(bg);
    let width = area.width as usize;
    let body_width = width.saturating_sub(BODY_INDENT + 1).max(1);

    let state = app.feed.state();
    let editing_id = app.feed.selection().comment().map(|c| c.id);
    let show_cursor = app.mode == Mode::Navigate;

    let mut lines: Vec<Line<'static>> = Vec::new();
    // Row range [start, end) of the selected comment
    let mut selected_rows: Option<(usize, usize)> = None;

    for (i, comment) in state.items().iter().enumerate() {
        let is_selected = show_cursor && i == app.comment_cursor;
        let start = lines.len();
        push_comment(
            &mut lines,
            app,
            comment,
            CommentMarks {
                selected: is_selected,
                pending: app.feed.is_pending(comment.id),
                editing: editing_id == Some(comment.id),
            },
            body_width,
        );
        lines.push(Line::from(""));
        if i == app.comment_cursor {
            selected_rows = Some((start, lines.len()));
        }
    }

    if state.is_loading() {
        for row in 0..app.board.config.ui.skeleton_rows {
            let (a, b) = SKELETON_BARS[row % SKELETON_BARS.len()];
            lines.push(skeleton_line(a, b, app.theme.skeleton, bg));
            lines.push(Line::from(""));
        }
    }

    let mut sentinel_row = None;
    if state.can_load_more() {
        sentinel_row = Some(lines.len());
        let text = if app.sentinel_hold {
            "   \u{00B7}\u{00B7}\u{00B7} could not load more (r to retry)"
        } else {
            "   \u{00B7}\u{00B7}\u{00B7} more comments"
        };
        lines.push(Line::from(Span::styled(text, dim_style)));
    } else if state.is_empty() && !state.is_loading() && state.cursor().is_exhausted() {
        lines.push(Line::from(Span::styled("   No comments yet", dim_style)));
    }

    // Scroll so the selected comment fits; at the bottom, keep one more row
    // so the sentinel can come into view.
    let height = area.height as usize;
    let total = lines.len();
    let mut scroll = app.detail_scroll.min(total.saturating_sub(height));
    if let Some((start, end)) = selected_rows {
        let is_last = app.comment_cursor + 1 == state.len();
        let want_end = if is_last { total.min(end + 1) } else { end };
        if start < scroll {
            scroll = start;
        } else if want_end > scroll + height {
            scroll = want_end.saturating_sub(height).min(start);
        }
    }
    app.detail_scroll = scroll;
    app.sentinel_visible = sentinel_row.is_some_and(|row| row >= scroll && row < scroll + height);

    let paragraph = Paragraph::new(lines)
        .style(Style::default().bg(bg))
        .scroll((scroll as u16, 0));
    frame.render_widget(paragraph, area);
}

struct CommentMarks {
    selected: bool,
    pending: bool,
    editing: bool,
}

fn push_comment(
    lines: &mut Vec<Line<'static>>,
    app: &App,
    comment: &Comment,
    marks: CommentMarks,
    body_width: usize,
) {
    let bg = if marks.selected {
        app.theme.selection_bg
    } else {
        app.theme.background
    };
    let dim_style = Style::default().fg(app.theme.muted).bg(bg);
    let gutter = if marks.selected {
        Span::styled(" \u{258E} ", Style::default().fg(app.theme.accent).bg(bg))
    } else {
        Span::styled("   ", Style::default().bg(bg))
    };

    let mut head = vec![
        gutter.clone(),
        Span::styled(
            comment.author.nickname.clone(),
            Style::default()
                .fg(app.theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {}", comment.created_at.format("%Y-%m-%d %H:%M")),
            dim_style,
        ),
    ];
    if marks.editing {
        head.push(Span::styled(
            "  (editing)",
            Style::default().fg(app.theme.accent).bg(bg),
        ));
    }
    if marks.pending {
        head.push(Span::styled(
            "  saving\u{2026}",
            Style::default().fg(app.theme.warning).bg(bg),
        ));
    }
    lines.push(Line::from(head));

    let body_style = Style::default().fg(app.theme.text).bg(bg);
    for row in unicode::wrap_text(&comment.content, body_width) {
        lines.push(Line::from(vec![
            gutter.clone(),
            Span::styled(format!(" {}", row), body_style),
        ]));
    }
}

fn skeleton_line(a: usize, b: usize, color: Color, bg: Color) -> Line<'static> {
    let style = Style::default().fg(color).bg(bg);
    Line::from(vec![
        Span::styled("   ", Style::default().bg(bg)),
        Span::styled("\u{2591}".repeat(a), style),
        Span::styled("  ", Style::default().bg(bg)),
        Span::styled("\u{2591}".repeat(b), style),
    ])
}

fn render_input(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;
    let dim_style = Style::default().fg(app.theme.muted).bg(bg);
    let active = app.mode == Mode::Input;
    let editing = app.feed.selection().comment().map(|c| c.id);

    let prompt = match editing {
        Some(_) => " \u{270E} ",
        None => " > ",
    };
    let prompt_style = if active {
        Style::default().fg(app.theme.accent).bg(bg)
    } else {
        dim_style
    };

    let text = app.feed.input();
    let mut spans = vec![Span::styled(prompt, prompt_style)];
    if text.is_empty() && !active {
        spans.push(Span::styled("write a comment (a)", dim_style));
    } else {
        // Keep the tail in view while typing past the edge
        let room = width.saturating_sub(prompt.len() + 1);
        let shown = tail_to_width(text, room);
        spans.push(Span::styled(
            shown,
            Style::default().fg(app.theme.text_bright).bg(bg),
        ));
        if active {
            spans.push(Span::styled(
                "\u{258C}",
                Style::default().fg(app.theme.accent).bg(bg),
            ));
        }
    }

    let hint = match (editing, active) {
        (Some(id), _) => Line::from(Span::styled(
            format!(
                "   Editing #{} \u{00B7} Enter save \u{00B7} Esc cancel",
                id
            ),
            Style::default().fg(app.theme.warning).bg(bg),
        )),
        (None, true) => Line::from(Span::styled(
            "   Enter send \u{00B7} Esc leave",
            dim_style,
        )),
        (None, false) => Line::from(""),
    };

    let paragraph = Paragraph::new(vec![Line::from(spans), hint]).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

/// The longest suffix of `text` that fits in `width` columns
fn tail_to_width(text: &str, width: usize) -> String {
    if unicode::display_width(text) <= width {
        return text.to_string();
    }
    let mut start = 0;
    for (idx, _) in text.char_indices() {
        if unicode::display_width(&text[idx..]) <= width {
            start = idx;
            break;
        }
    }
    if start == 0 {
        return String::new();
    }
    text[start..].to_string()
}
