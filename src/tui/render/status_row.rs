use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, Mode, View};

/// Render the status row (bottom of screen).
///
/// Left side, first that applies: the feed's failure notice, the one-shot
/// message, key hints. Right side: background activity.
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let mut spans: Vec<Span> = Vec::new();
    if let Some(notice) = app.feed.notice().filter(|_| app.view == View::Detail) {
        spans.push(Span::styled(
            format!(" {}", notice),
            Style::default().fg(app.theme.error).bg(bg),
        ));
    } else if let Some(message) = &app.message {
        spans.push(Span::styled(
            format!(" {}", message),
            Style::default().fg(app.theme.warning).bg(bg),
        ));
    } else if app.board.config.ui.show_key_hints {
        spans.push(Span::styled(
            format!(" {}", key_hints(app)),
            Style::default().fg(app.theme.muted).bg(bg),
        ));
    }

    let activity = activity(app);
    if !activity.is_empty() {
        let content_width = super::spans_width(&spans);
        let activity_width = activity.chars().count() + 1;
        if content_width + activity_width < width {
            let padding = width - content_width - activity_width;
            spans.push(Span::styled(" ".repeat(padding), Style::default().bg(bg)));
            spans.push(Span::styled(
                activity,
                Style::default().fg(app.theme.info).bg(bg),
            ));
        }
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

fn key_hints(app: &App) -> &'static str {
    match (app.view, app.mode) {
        (_, Mode::Input) => "Enter send  Esc leave",
        (_, Mode::Menu) => "j/k move  Enter choose  Esc close",
        (_, Mode::CardEdit) => "Tab field  Enter save  Esc cancel",
        (View::Cards, Mode::Navigate) => "j/k move  Enter open  q quit",
        (View::Detail, Mode::Navigate) => {
            "j/k move  a comment  e edit  d delete  m menu  r retry  Esc back"
        }
    }
}

fn activity(app: &App) -> String {
    if app.view != View::Detail {
        return String::new();
    }
    let saving = app.feed.submissions_in_flight();
    if saving > 0 {
        format!("saving {}\u{2026}", saving)
    } else if app.feed.state().is_loading() {
        "loading\u{2026}".to_string()
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::*;

    fn status(app: &App) -> String {
        render_to_string(TERM_W, 1, |frame, area| render_status_row(frame, app, area))
    }

    #[test]
    fn hints_by_view() {
        let mut app = test_app();
        assert!(status(&app).contains("Enter open"));
        open_with_page(&mut app, comments(3, 1), None);
        assert!(status(&app).contains("a comment"));
    }

    #[test]
    fn message_replaces_hints() {
        let mut app = test_app();
        app.message = Some("deleted card 1".into());
        assert_eq!(status(&app), " deleted card 1");
    }

    #[test]
    fn loading_shows_activity() {
        let mut app = test_app();
        open_loading(&mut app);
        assert!(status(&app).ends_with("loading\u{2026}"));
    }
}
