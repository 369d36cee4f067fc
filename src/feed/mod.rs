pub mod controller;
pub mod fetcher;
pub mod menu;
pub mod mutation;
pub mod selection;
pub mod sentinel;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use controller::{CommentFeed, FeedNotice};
pub use fetcher::{FetchError, FetchTicket, PageFetcher, SessionId};
pub use menu::{CardAction, CardMenuOutcome};
pub use mutation::{
    Intent, Method, MutationCoordinator, Payload, SubmissionError, SubmissionSink, SubmitReceipt,
    SubmitRequest, SubmitTicket, ValidationError,
};
pub use selection::{EditSelector, Selection};
pub use store::{CursorState, FeedState};
