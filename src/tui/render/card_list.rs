use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::ColumnId;
use crate::tui::app::App;
use crate::util::unicode;

/// Render every card, grouped under its column
pub fn render_card_list(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;
    let dim_style = Style::default().fg(app.theme.muted).bg(bg);

    let cards = app.board.cards_by_column();
    if cards.is_empty() {
        let empty = Paragraph::new(" No cards yet. Add one with `cf card add`.")
            .style(dim_style);
        frame.render_widget(empty, area);
        return;
    }

    let mut lines: Vec<Line> = Vec::new();
    let mut cursor_line = 0;
    let mut current_column: Option<ColumnId> = None;

    for (i, card) in cards.iter().enumerate() {
        if current_column != Some(card.column_id) {
            current_column = Some(card.column_id);
            if !lines.is_empty() {
                lines.push(Line::from(""));
            }
            let count = cards.iter().filter(|c| c.column_id == card.column_id).count();
            lines.push(Line::from(vec![
                Span::styled(
                    format!(" {}", app.board.config.column_title(card.column_id)),
                    Style::default()
                        .fg(app.theme.text_bright)
                        .bg(bg)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!(" ({})", count), dim_style),
            ]));
        }

        let is_cursor = i == app.card_cursor;
        let row_bg = if is_cursor { app.theme.selection_bg } else { bg };
        let mut spans: Vec<Span> = vec![if is_cursor {
            Span::styled(" \u{258E} ", Style::default().fg(app.theme.accent).bg(row_bg))
        } else {
            Span::styled("   ", Style::default().bg(row_bg))
        }];

        let mut suffix: Vec<Span> = Vec::new();
        for tag in &card.tags {
            suffix.push(Span::styled(
                format!(" #{}", tag),
                Style::default().fg(app.theme.tag_color(tag)).bg(row_bg),
            ));
        }
        if let Some(assignee) = &card.assignee {
            suffix.push(Span::styled(
                format!(" ({})", assignee.initial()),
                Style::default().fg(app.theme.info).bg(row_bg),
            ));
        }
        if let Some(due) = card.due_date {
            suffix.push(Span::styled(
                format!(" {}", due.format("%m-%d")),
                Style::default().fg(app.theme.warning).bg(row_bg),
            ));
        }

        let room = width
            .saturating_sub(super::spans_width(&spans) + super::spans_width(&suffix) + 1)
            .max(8);
        spans.push(Span::styled(
            unicode::truncate_to_width(&card.title, room),
            Style::default().fg(app.theme.text).bg(row_bg),
        ));
        spans.extend(suffix);

        // Fill the rest of the selected row
        if is_cursor {
            let used = super::spans_width(&spans);
            if used < width {
                spans.push(Span::styled(" ".repeat(width - used), Style::default().bg(row_bg)));
            }
        }

        if is_cursor {
            cursor_line = lines.len();
        }
        lines.push(Line::from(spans));
    }

    let height = area.height as usize;
    let scroll = (cursor_line + 1).saturating_sub(height);

    let paragraph = Paragraph::new(lines)
        .style(Style::default().bg(bg))
        .scroll((scroll as u16, 0));
    frame.render_widget(paragraph, area);
}
