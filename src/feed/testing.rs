//! Fixtures shared by the feed tests.

use std::cell::{Cell, RefCell};

use chrono::{TimeZone, Utc};

use super::fetcher::{FetchError, PageFetcher};
use crate::model::{
    Assignee, Author, Card, CardId, ColumnId, Comment, CommentId, Cursor, FeedPage,
};

pub fn comment(id: u64, content: &str) -> Comment {
    Comment {
        id: CommentId(id),
        content: content.to_string(),
        author: Author {
            id: 1,
            nickname: "mina".into(),
            profile_image_url: None,
        },
        created_at: Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(),
        card_id: CardId(7),
    }
}

/// `count` comments, newest first, starting at id `from`
pub fn comments(from: u64, count: usize) -> Vec<Comment> {
    (0..count as u64)
        .map(|i| comment(from - i, &format!("comment {}", from - i)))
        .collect()
}

pub fn page(items: Vec<Comment>, cursor: Option<u64>) -> FeedPage {
    FeedPage {
        items,
        cursor: cursor.map(Cursor::new),
    }
}

pub fn card() -> Card {
    let mut card = Card::new(CardId(7), ColumnId(2), "Write release notes".into());
    card.description = "Cover the feed changes".into();
    card.tags = vec!["docs".into()];
    card.assignee = Some(Assignee {
        nickname: "mina".into(),
        profile_image_url: None,
    });
    card
}

/// In-memory pages chained by the id of each page's last comment.
/// Records every cursor it was asked for.
pub struct PagedFetcher {
    pages: Vec<Vec<Comment>>,
    calls: RefCell<Vec<Option<Cursor>>>,
    fail_next: Cell<bool>,
}

impl PagedFetcher {
    pub fn new(pages: Vec<Vec<Comment>>) -> Self {
        PagedFetcher {
            pages,
            calls: RefCell::new(Vec::new()),
            fail_next: Cell::new(false),
        }
    }

    pub fn calls(&self) -> Vec<Option<Cursor>> {
        self.calls.borrow().clone()
    }

    pub fn fail_next(&self) {
        self.fail_next.set(true);
    }

    fn cursor_after(&self, index: usize) -> Option<Cursor> {
        if index + 1 >= self.pages.len() {
            return None;
        }
        self.pages[index].last().map(|c| Cursor::new(c.id.0))
    }
}

impl PageFetcher for PagedFetcher {
    fn fetch_page(&self, _card: CardId, cursor: Option<Cursor>) -> Result<FeedPage, FetchError> {
        self.calls.borrow_mut().push(cursor);
        if self.fail_next.replace(false) {
            return Err(FetchError::Network("connection reset".into()));
        }
        let index = match cursor {
            None => 0,
            Some(c) => (0..self.pages.len())
                .find(|&i| self.cursor_after(i) == Some(c))
                .map(|i| i + 1)
                .ok_or_else(|| FetchError::Server(format!("unknown cursor {}", c)))?,
        };
        Ok(FeedPage {
            items: self.pages.get(index).cloned().unwrap_or_default(),
            cursor: self.cursor_after(index),
        })
    }
}
