use std::sync::Arc;
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use crate::feed::{
    FetchError, FetchTicket, PageFetcher, SubmissionError, SubmissionSink, SubmitReceipt,
    SubmitTicket,
};
use crate::model::FeedPage;

/// Anything the worker can run jobs against
pub trait Backend: PageFetcher + SubmissionSink + Send + Sync {}

impl<T: PageFetcher + SubmissionSink + Send + Sync> Backend for T {}

/// Work sent from the TUI event loop to the worker thread.
#[derive(Debug)]
pub enum Job {
    Fetch(FetchTicket),
    Submit(SubmitTicket),
}

impl Job {
    /// The completion this job produces when it cannot run at all
    pub fn abandoned(self, reason: &str) -> Completion {
        match self {
            Job::Fetch(t) => Completion::Fetched(t, Err(FetchError::Network(reason.to_string()))),
            Job::Submit(t) => {
                Completion::Submitted(t, Err(SubmissionError::Transport(reason.to_string())))
            }
        }
    }
}

/// Results sent back to the event loop, tagged with the ticket they answer.
#[derive(Debug)]
pub enum Completion {
    Fetched(FetchTicket, Result<FeedPage, FetchError>),
    Submitted(SubmitTicket, Result<SubmitReceipt, SubmissionError>),
}

/// A background thread that runs fetches and submissions in the order they
/// were sent. The event loop calls `poll()` each tick.
pub struct FeedWorker {
    jobs: Option<mpsc::Sender<Job>>,
    rx: mpsc::Receiver<Completion>,
    handle: Option<JoinHandle<()>>,
}

impl FeedWorker {
    pub fn start(backend: Arc<dyn Backend>) -> std::io::Result<Self> {
        let (job_tx, job_rx) = mpsc::channel::<Job>();
        let (done_tx, done_rx) = mpsc::channel();

        let handle = thread::Builder::new()
            .name("feed-worker".into())
            .spawn(move || {
                for job in job_rx {
                    let completion = match job {
                        Job::Fetch(ticket) => {
                            let result = backend.fetch_page(ticket.card_id, ticket.cursor);
                            Completion::Fetched(ticket, result)
                        }
                        Job::Submit(ticket) => {
                            let result = backend.submit(&ticket.request);
                            Completion::Submitted(ticket, result)
                        }
                    };
                    if done_tx.send(completion).is_err() {
                        // event loop is gone
                        break;
                    }
                }
                debug!("feed worker stopped");
            })?;

        Ok(FeedWorker {
            jobs: Some(job_tx),
            rx: done_rx,
            handle: Some(handle),
        })
    }

    /// Queue a job. If the worker has died the job comes back as a failed
    /// completion so the caller can settle it immediately.
    pub fn send(&self, job: Job) -> Result<(), Completion> {
        let Some(tx) = &self.jobs else {
            return Err(job.abandoned("feed worker is not running"));
        };
        tx.send(job).map_err(|mpsc::SendError(job)| {
            warn!("feed worker is gone, failing job");
            job.abandoned("feed worker stopped")
        })
    }

    /// Non-blocking poll for finished jobs.
    /// Returns all queued completions (may be empty).
    pub fn poll(&self) -> Vec<Completion> {
        let mut done = Vec::new();
        while let Ok(c) = self.rx.try_recv() {
            done.push(c);
        }
        done
    }

    /// Block up to `timeout` for the next completion
    pub fn wait(&self, timeout: Duration) -> Option<Completion> {
        self.rx.recv_timeout(timeout).ok()
    }
}

impl Drop for FeedWorker {
    fn drop(&mut self) {
        // closing the job channel ends the worker loop
        self.jobs.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{CommentFeed, SessionId};
    use crate::io::board_io::{self, tests::create_test_board};
    use crate::io::comment_store::LocalBoard;
    use crate::model::{Author, CardId};
    use tempfile::TempDir;

    fn worker(tmp: &TempDir) -> FeedWorker {
        create_test_board(tmp.path());
        let backend = LocalBoard::new(
            tmp.path().join("board"),
            2,
            Author {
                id: 0,
                nickname: "t".into(),
                profile_image_url: None,
            },
        );
        FeedWorker::start(Arc::new(backend)).unwrap()
    }

    #[test]
    fn fetch_round_trips_through_thread() {
        let tmp = TempDir::new().unwrap();
        let worker = worker(&tmp);
        let ticket = FetchTicket {
            session: SessionId::default(),
            card_id: CardId(1),
            cursor: None,
        };
        worker.send(Job::Fetch(ticket.clone())).unwrap();

        match worker.wait(Duration::from_secs(5)) {
            Some(Completion::Fetched(t, Ok(page))) => {
                assert_eq!(t, ticket);
                assert_eq!(page.items.len(), 2);
            }
            other => panic!("unexpected completion: {:?}", other),
        }
    }

    #[test]
    fn drives_a_feed_to_the_end() {
        let tmp = TempDir::new().unwrap();
        let worker = worker(&tmp);
        let board = board_io::load_board(tmp.path()).unwrap();
        let card = board.find_card(CardId(1)).unwrap().clone();

        let mut feed = CommentFeed::new(board.config.board.dashboard_id);
        let mut next = Some(feed.open(card));
        loop {
            if let Some(t) = next.take() {
                worker.send(Job::Fetch(t)).unwrap();
            }
            match worker.wait(Duration::from_secs(5)) {
                Some(Completion::Fetched(t, result)) => {
                    next = feed.complete_fetch(&t, result);
                }
                other => panic!("unexpected completion: {:?}", other),
            }
            if next.is_none() {
                next = feed.on_sentinel_visible();
            }
            if next.is_none() {
                break;
            }
        }
        let ids: Vec<u64> = feed.state().items().iter().map(|c| c.id.0).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }
}
