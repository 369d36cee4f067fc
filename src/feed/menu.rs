use super::mutation::{Intent, Payload, SubmitRequest, ValidationError};
use crate::model::{Card, CardId};

/// Entries of the card's own action menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardAction {
    Edit,
    Delete,
}

impl CardAction {
    pub const ALL: [CardAction; 2] = [CardAction::Edit, CardAction::Delete];

    pub fn label(self) -> &'static str {
        match self {
            CardAction::Edit => "Edit card",
            CardAction::Delete => "Delete card",
        }
    }
}

/// What the view does after a menu choice. Both outcomes close the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardMenuOutcome {
    /// Hand off to the card editor
    OpenEditor(CardId),
    /// Submit this request; the view is already closed
    Delete(SubmitRequest),
}

pub fn dispatch(card: &Card, dashboard_id: u64, action: CardAction) -> CardMenuOutcome {
    match action {
        CardAction::Edit => CardMenuOutcome::OpenEditor(card.id),
        CardAction::Delete => CardMenuOutcome::Delete(SubmitRequest::new(
            Intent::DeleteCard,
            Payload::for_card(card, dashboard_id),
        )),
    }
}

/// Build the save request for the card editor
pub fn edit_card(
    card: &Card,
    dashboard_id: u64,
    title: &str,
    description: &str,
) -> Result<SubmitRequest, ValidationError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    let mut payload = Payload::for_card(card, dashboard_id);
    payload.title = Some(title.to_string());
    payload.description = Some(description.trim().to_string());
    Ok(SubmitRequest::new(Intent::EditCard, payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::mutation::Method;
    use crate::feed::testing::card;

    #[test]
    fn edit_opens_editor() {
        assert_eq!(
            dispatch(&card(), 1, CardAction::Edit),
            CardMenuOutcome::OpenEditor(CardId(7))
        );
    }

    #[test]
    fn delete_builds_delete_request() {
        match dispatch(&card(), 4, CardAction::Delete) {
            CardMenuOutcome::Delete(req) => {
                assert_eq!(req.intent, Intent::DeleteCard);
                assert_eq!(req.method, Method::Delete);
                assert_eq!(req.payload.card_id, CardId(7));
                assert_eq!(req.payload.dashboard_id, 4);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn card_edit_needs_title() {
        assert_eq!(
            edit_card(&card(), 1, "   ", "x").unwrap_err(),
            ValidationError::EmptyTitle
        );
        let req = edit_card(&card(), 1, " New title ", "").unwrap();
        assert_eq!(req.payload.title.as_deref(), Some("New title"));
        assert_eq!(req.method, Method::Put);
    }
}
