use crossterm::event::{KeyCode, KeyEvent};

use crate::tui::app::{App, Mode, View};

pub(super) fn handle_navigate(app: &mut App, key: KeyEvent) {
    match app.view {
        View::Cards => handle_cards(app, key),
        View::Detail => handle_detail(app, key),
    }
}

fn handle_cards(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('j') | KeyCode::Down => app.move_card_cursor(1),
        KeyCode::Char('k') | KeyCode::Up => app.move_card_cursor(-1),
        KeyCode::Char('g') | KeyCode::Home => app.card_cursor = 0,
        KeyCode::Char('G') | KeyCode::End => app.move_card_cursor(isize::MAX),
        KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => app.open_selected_card(),
        _ => {}
    }
}

fn handle_detail(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('h') | KeyCode::Left => {
            app.close_detail()
        }
        KeyCode::Char('j') | KeyCode::Down => app.move_comment_cursor(1),
        KeyCode::Char('k') | KeyCode::Up => app.move_comment_cursor(-1),
        KeyCode::PageDown => app.move_comment_cursor(5),
        KeyCode::PageUp => app.move_comment_cursor(-5),
        KeyCode::Char('g') | KeyCode::Home => app.comment_cursor = 0,
        KeyCode::Char('G') | KeyCode::End => app.move_comment_cursor(isize::MAX),
        KeyCode::Char('a') | KeyCode::Char('i') => app.start_new_comment(),
        KeyCode::Char('e') | KeyCode::Enter => app.start_edit_selected(),
        KeyCode::Char('d') | KeyCode::Delete => app.delete_selected(),
        KeyCode::Char('m') => app.open_menu(),
        KeyCode::Char('r') => app.retry(),
        _ => {}
    }
}

pub(super) fn handle_menu(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.mode = Mode::Navigate,
        KeyCode::Char('j') | KeyCode::Down => app.move_menu_cursor(1),
        KeyCode::Char('k') | KeyCode::Up => app.move_menu_cursor(-1),
        KeyCode::Enter => app.choose_menu_action(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    use crate::io::board_io::{self, tests::create_test_board};
    use crate::tui::app::{App, Mode, View};
    use crate::tui::input::handle_key;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app() -> (tempfile::TempDir, App) {
        let tmp = tempfile::TempDir::new().unwrap();
        create_test_board(tmp.path());
        let board = board_io::load_board(tmp.path()).unwrap();
        (tmp, App::new(board))
    }

    #[test]
    fn card_cursor_is_clamped() {
        let (_tmp, mut app) = app();
        handle_key(&mut app, key(KeyCode::Char('j')));
        handle_key(&mut app, key(KeyCode::Char('j')));
        handle_key(&mut app, key(KeyCode::Char('j')));
        assert_eq!(app.card_cursor, 1);
        handle_key(&mut app, key(KeyCode::Char('g')));
        assert_eq!(app.card_cursor, 0);
    }

    #[test]
    fn enter_opens_and_esc_closes_detail() {
        let (_tmp, mut app) = app();
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.view, View::Detail);
        assert_eq!(app.take_jobs().len(), 1);

        handle_key(&mut app, key(KeyCode::Esc));
        assert_eq!(app.view, View::Cards);
        assert!(!app.feed.is_open());
    }

    #[test]
    fn menu_keys() {
        let (_tmp, mut app) = app();
        handle_key(&mut app, key(KeyCode::Enter));
        handle_key(&mut app, key(KeyCode::Char('m')));
        assert_eq!(app.mode, Mode::Menu);
        handle_key(&mut app, key(KeyCode::Down));
        handle_key(&mut app, key(KeyCode::Down));
        assert_eq!(app.menu_cursor, 1);
        handle_key(&mut app, key(KeyCode::Esc));
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(app.view, View::Detail);
    }

    #[test]
    fn q_quits_from_card_list() {
        let (_tmp, mut app) = app();
        handle_key(&mut app, key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }
}
