use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::feed::CardAction;
use crate::tui::app::{App, CardField};
use crate::util::unicode;

/// The card's action menu, over the detail view
pub fn render_card_menu(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let popup = super::centered(area, 24, CardAction::ALL.len() as u16 + 2);

    let lines: Vec<Line> = CardAction::ALL
        .iter()
        .enumerate()
        .map(|(i, action)| {
            let style = if i == app.menu_cursor {
                Style::default()
                    .fg(app.theme.text_bright)
                    .bg(app.theme.selection_bg)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(app.theme.text).bg(bg)
            };
            let marker = if i == app.menu_cursor { "\u{25B8} " } else { "  " };
            Line::from(Span::styled(format!("{}{}", marker, action.label()), style))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.accent).bg(bg))
        .title(Span::styled(" Card ", Style::default().fg(app.theme.text_bright).bg(bg)))
        .style(Style::default().bg(bg));

    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

/// Title/description editor, over the card list
pub fn render_card_editor(frame: &mut Frame, app: &App, area: Rect) {
    let Some(editor) = &app.card_editor else {
        return;
    };
    let bg = app.theme.background;
    let width = area.width.saturating_sub(8).min(70);
    let popup = super::centered(area, width, 8);
    let inner_width = popup.width.saturating_sub(2) as usize;

    let label_style = Style::default().fg(app.theme.muted).bg(bg);
    let field_line = |label: &str, value: &str, focused: bool| -> Line<'static> {
        let room = inner_width.saturating_sub(label.len() + 2);
        let mut spans = vec![
            Span::styled(format!("{} ", label), label_style),
            Span::styled(
                unicode::truncate_to_width(value, room),
                Style::default().fg(app.theme.text_bright).bg(bg),
            ),
        ];
        if focused {
            spans.push(Span::styled(
                "\u{258C}",
                Style::default().fg(app.theme.accent).bg(bg),
            ));
        }
        Line::from(spans)
    };

    let lines = vec![
        Line::from(""),
        field_line("Title:      ", &editor.title, editor.field == CardField::Title),
        Line::from(""),
        field_line(
            "Description:",
            &editor.description,
            editor.field == CardField::Description,
        ),
        Line::from(""),
        Line::from(Span::styled(
            "Tab switch field \u{00B7} Enter save \u{00B7} Esc cancel",
            label_style,
        )),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.accent).bg(bg))
        .title(Span::styled(
            format!(" Edit card {} ", editor.card.id),
            Style::default().fg(app.theme.text_bright).bg(bg),
        ))
        .style(Style::default().bg(bg));

    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

#[cfg(test)]
mod tests {
    use crate::tui::render::render;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn menu_lists_actions_with_cursor() {
        let mut app = test_app();
        open_with_page(&mut app, comments(3, 1), None);
        app.open_menu();
        app.move_menu_cursor(1);
        let output = render_to_string(TERM_W, TERM_H, |frame, _| render(frame, &mut app));
        assert!(output.contains("  Edit card"));
        assert!(output.contains("\u{25B8} Delete card"));
    }

    #[test]
    fn editor_shows_fields_and_focus() {
        let mut app = test_app();
        open_with_page(&mut app, comments(3, 1), None);
        app.open_menu();
        app.choose_menu_action();
        let output = render_to_string(TERM_W, TERM_H, |frame, _| render(frame, &mut app));
        assert!(output.contains("Edit card 1"));
        assert!(output.contains("Title:       Write docs\u{258C}"), "{}", output);
        assert!(output.contains("Description: All of them"));
    }
}
