//! Background story polling.
//!
//! Runs as a tokio task, fetching a page of top stories on a timer (or when
//! the UI asks for a refresh) and sending results to the UI loop over an
//! [`mpsc`] channel.
//!
//! ## For contributors
//!
//! The poller never overlaps fetches: it waits for one page to finish before
//! sleeping.  Concurrency lives inside [`TopStories::fetch`], not here.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Notify};
use tracing::debug;

use crate::stories::{StoryPage, TopStories};

/// Messages sent from the poller task to the UI loop.
#[derive(Debug)]
pub enum PollMsg {
    /// A fetch produced this page.
    Page(StoryPage),
    /// The fetch failed; the previous page should stay on screen.
    Error(String),
}

/// Handle for asking the poller to refresh before its timer fires.
#[derive(Debug, Clone, Default)]
pub struct RefreshHandle(Arc<Notify>);

impl RefreshHandle {
    pub fn request(&self) {
        self.0.notify_one();
    }
}

/// Spawn the background polling task.
///
/// Returns a receiver that the main loop should drain on every tick, plus a
/// handle for manual refreshes.  The task stops once the receiver is dropped.
pub fn spawn(
    stories: Arc<TopStories>,
    requested: usize,
    interval: Duration,
) -> (mpsc::UnboundedReceiver<PollMsg>, RefreshHandle) {
    let (tx, rx) = mpsc::unbounded_channel();
    let refresh = RefreshHandle::default();
    let notify = Arc::clone(&refresh.0);

    tokio::spawn(async move {
        loop {
            let msg = match stories.fetch(requested).await {
                Ok(page) => PollMsg::Page(page),
                Err(e) => PollMsg::Error(e.to_string()),
            };
            if tx.send(msg).is_err() {
                debug!("UI gone, poller stopping");
                return;
            }
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = notify.notified() => debug!("manual refresh"),
            }
        }
    });

    (rx, refresh)
}
