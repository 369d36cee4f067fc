use unicode_segmentation::UnicodeSegmentation;

use crate::model::{Comment, CommentId};

/// Which comment, if any, the shared input is editing
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Idle,
    Editing(Comment),
}

impl Selection {
    pub fn is_editing(&self) -> bool {
        matches!(self, Selection::Editing(_))
    }

    /// The comment being edited
    pub fn comment(&self) -> Option<&Comment> {
        match self {
            Selection::Editing(c) => Some(c),
            Selection::Idle => None,
        }
    }
}

/// Edit-mode state machine plus the shared comment input.
///
/// Selecting a comment copies its content into the input once. After that
/// the input belongs to the user; later selection changes are the only thing
/// that overwrites it.
#[derive(Debug, Clone, Default)]
pub struct EditSelector {
    selection: Selection,
    input: String,
}

impl EditSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idle/Editing -> Editing(comment); the input becomes the comment text
    pub fn select(&mut self, comment: Comment) {
        self.input = comment.content.clone();
        self.selection = Selection::Editing(comment);
    }

    /// Explicit cancel: back to Idle with an empty input
    pub fn cancel(&mut self) {
        self.selection = Selection::Idle;
        self.input.clear();
    }

    /// A deleted comment leaves edit mode if it was the one being edited.
    /// Returns true when that happened.
    pub fn on_deleted(&mut self, id: CommentId) -> bool {
        if self.selected_id() == Some(id) {
            self.cancel();
            true
        } else {
            false
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selected(&self) -> Option<&Comment> {
        self.selection.comment()
    }

    pub fn selected_id(&self) -> Option<CommentId> {
        self.selected().map(|c| c.id)
    }

    pub fn is_editing(&self) -> bool {
        self.selection.is_editing()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
    }

    pub fn push_str(&mut self, text: &str) {
        self.input.push_str(text);
    }

    /// Remove the last grapheme cluster from the input
    pub fn backspace(&mut self) {
        if let Some((idx, _)) = self.input.grapheme_indices(true).next_back() {
            self.input.truncate(idx);
        }
    }
}
