use crossterm::event::{KeyCode, KeyEvent};
use unicode_segmentation::UnicodeSegmentation;

use super::typed_text;
use crate::tui::app::App;

/// Keys while typing a comment
pub(super) fn handle_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.cancel_input(),
        KeyCode::Enter => app.submit_input(),
        KeyCode::Backspace => app.feed.input_mut().backspace(),
        _ => {
            if let Some(c) = typed_text(&key) {
                let mut buf = [0u8; 4];
                app.feed.input_mut().push_str(c.encode_utf8(&mut buf));
            }
        }
    }
}

/// Keys in the card editor
pub(super) fn handle_card_edit(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.cancel_card_editor(),
        KeyCode::Enter => app.save_card_editor(),
        KeyCode::Tab | KeyCode::BackTab => {
            if let Some(editor) = &mut app.card_editor {
                editor.toggle_field();
            }
        }
        KeyCode::Backspace => {
            if let Some(editor) = &mut app.card_editor {
                let buf = editor.buffer_mut();
                if let Some((idx, _)) = buf.grapheme_indices(true).next_back() {
                    buf.truncate(idx);
                }
            }
        }
        _ => {
            if let Some(c) = typed_text(&key)
                && let Some(editor) = &mut app.card_editor
            {
                editor.buffer_mut().push(c);
            }
        }
    }
}
