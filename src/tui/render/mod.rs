pub mod card_list;
pub mod detail_view;
pub mod popups;
pub mod status_row;

#[cfg(test)]
pub mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use super::app::{App, Mode, View};
use crate::util::unicode;

/// Main render function, dispatches to sub-renderers
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Background fill
    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    // Layout: header (2 rows) | content | status row (1 row)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // title + separator
            Constraint::Min(1),    // content area
            Constraint::Length(1), // status row
        ])
        .split(area);

    render_header(frame, app, chunks[0]);

    match app.view {
        View::Cards => card_list::render_card_list(frame, app, chunks[1]),
        View::Detail => detail_view::render_detail_view(frame, app, chunks[1]),
    }

    match app.mode {
        Mode::Menu => popups::render_card_menu(frame, app, chunks[1]),
        Mode::CardEdit => popups::render_card_editor(frame, app, chunks[1]),
        Mode::Navigate | Mode::Input => {}
    }

    status_row::render_status_row(frame, app, chunks[2]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let mut spans = vec![Span::styled(
        format!(" {}", app.board.config.board.name),
        Style::default()
            .fg(app.theme.text_bright)
            .bg(bg)
            .add_modifier(Modifier::BOLD),
    )];
    if app.view == View::Detail
        && let Some(card) = app.feed.card()
    {
        let used = spans_width(&spans) + 3;
        spans.push(Span::styled(
            " \u{203A} ",
            Style::default().fg(app.theme.muted).bg(bg),
        ));
        spans.push(Span::styled(
            unicode::truncate_to_width(&card.title, width.saturating_sub(used)),
            Style::default().fg(app.theme.text).bg(bg),
        ));
    }

    let separator = Span::styled(
        "\u{2500}".repeat(width),
        Style::default().fg(app.theme.muted).bg(bg),
    );
    let paragraph = Paragraph::new(vec![Line::from(spans), Line::from(separator)])
        .style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

/// Compute total display width of a slice of spans
pub(super) fn spans_width(spans: &[Span]) -> usize {
    spans
        .iter()
        .map(|s| unicode::display_width(&s.content))
        .sum()
}

/// A rectangle of `width` x `height` centered in `area`, clamped to fit
pub(super) fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect {
        x: area.x + (area.width - w) / 2,
        y: area.y + (area.height - h) / 2,
        width: w,
        height: h,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn header_shows_board_and_open_card() {
        let mut app = test_app();
        let output = render_to_string(TERM_W, TERM_H, |frame, _| render(frame, &mut app));
        assert!(output.lines().next().unwrap().contains("Test Board"));

        open_with_page(&mut app, comments(3, 3), None);
        let output = render_to_string(TERM_W, TERM_H, |frame, _| render(frame, &mut app));
        let first = output.lines().next().unwrap();
        assert!(first.contains("Test Board \u{203A} Write docs"), "{}", first);
    }
}
