use serde::Serialize;

use crate::feed::SubmitReceipt;
use crate::model::{Card, Column, Comment, Cursor};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardJson<'a> {
    #[serde(flatten)]
    pub card: &'a Card,
    /// Column title, the card's badge
    pub column: String,
}

#[derive(Serialize)]
pub struct ColumnJson<'a> {
    #[serde(flatten)]
    pub column: &'a Column,
    pub cards: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentPageJson<'a> {
    pub card_id: u64,
    pub comments: &'a [Comment],
    /// Pass to `--cursor` for the next page; null when exhausted
    pub cursor: Option<Cursor>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitJson<'a> {
    pub intent: String,
    pub card_id: u64,
    #[serde(flatten)]
    pub receipt: &'a SubmitReceipt,
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

fn format_tags(tags: &[String]) -> String {
    tags.iter()
        .map(|t| format!("#{}", t))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format a single card as a one-line summary
pub fn format_card_line(card: &Card) -> String {
    let mut line = format!("{:>4}  {}", card.id, card.title);
    if !card.tags.is_empty() {
        line.push(' ');
        line.push_str(&format_tags(&card.tags));
    }
    if let Some(assignee) = &card.assignee {
        line.push_str(&format!(" @{}", assignee.nickname));
    }
    line
}

/// Format the detailed card view
pub fn format_card_detail(card: &Card, column_title: &str) -> Vec<String> {
    let mut lines = vec![format!("[{}] {} {}", column_title, card.id, card.title)];
    if !card.tags.is_empty() {
        lines.push(format!("tags: {}", format_tags(&card.tags)));
    }
    if let Some(assignee) = &card.assignee {
        lines.push(format!("assignee: {}", assignee.nickname));
    }
    if let Some(due) = card.due_date {
        lines.push(format!("due: {}", due));
    }
    if let Some(url) = &card.image_url {
        lines.push(format!("image: {}", url));
    }
    if !card.description.is_empty() {
        lines.push("description:".to_string());
        for line in card.description.lines() {
            lines.push(format!("  {}", line));
        }
    }
    lines
}

/// Format one comment: header line, then indented content
pub fn format_comment(comment: &Comment) -> Vec<String> {
    let mut lines = vec![format!(
        "#{} {} {}",
        comment.id,
        comment.author.nickname,
        comment.created_at.format("%Y-%m-%d %H:%M")
    )];
    for line in comment.content.lines() {
        lines.push(format!("  {}", line));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Assignee, Author, CardId, ColumnId, CommentId};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn card() -> Card {
        let mut card = Card::new(CardId(12), ColumnId(1), "Write docs".into());
        card.tags = vec!["docs".into(), "q2".into()];
        card.assignee = Some(Assignee {
            nickname: "mina".into(),
            profile_image_url: None,
        });
        card.due_date = NaiveDate::from_ymd_opt(2025, 4, 1);
        card.description = "All of them\nTwice".into();
        card
    }

    #[test]
    fn card_line() {
        assert_eq!(format_card_line(&card()), "  12  Write docs #docs #q2 @mina");
    }

    #[test]
    fn card_detail() {
        assert_eq!(
            format_card_detail(&card(), "To do"),
            vec![
                "[To do] 12 Write docs",
                "tags: #docs #q2",
                "assignee: mina",
                "due: 2025-04-01",
                "description:",
                "  All of them",
                "  Twice",
            ]
        );
    }

    #[test]
    fn comment_block() {
        let comment = Comment {
            id: CommentId(3),
            content: "looks good\nship it".into(),
            author: Author {
                id: 1,
                nickname: "jun".into(),
                profile_image_url: None,
            },
            created_at: Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap(),
            card_id: CardId(12),
        };
        assert_eq!(
            format_comment(&comment),
            vec!["#3 jun 2025-03-01 09:30", "  looks good", "  ship it"]
        );
    }

    #[test]
    fn card_json_flattens_with_column() {
        let card = card();
        let json = serde_json::to_value(CardJson {
            card: &card,
            column: "To do".into(),
        })
        .unwrap();
        assert_eq!(json["column"], "To do");
        assert_eq!(json["columnId"], 1);
        assert_eq!(json["dueDate"], "2025-04-01");
    }
}
