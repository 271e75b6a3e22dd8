//! Session-wide state shared by every screen.
//!
//! The stores are composed into one [`AppState`] behind an [`AppStore`]
//! handle. Reads go through [`AppStore::read`]; the only way to change
//! anything is to [`AppStore::dispatch`] an [`Action`].

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::trace;

use crate::application::connections::ConnectionList;
use crate::application::queue::CandidateQueue;
use crate::application::requests::RequestReviewStore;
use crate::domain::{Candidate, RequestPage};

/// A state transition on the session stores.
#[derive(Debug, Clone)]
pub enum Action {
    /// Populate the feed queue. Ignored while the queue is non-empty.
    LoadFeed(Vec<Candidate>),
    /// Remove one candidate from the feed. Ignored if absent.
    RemoveFromFeed(String),
    /// Replace the received-requests page wholesale.
    SetReceivedRequests(RequestPage),
    /// Drop one request from the current page without a refetch.
    RemoveRequest(String),
    /// Populate the connections list. Ignored while the list is non-empty.
    LoadConnections(Vec<Candidate>),
}

/// The composed session state.
#[derive(Debug, Default)]
pub struct AppState {
    feed: CandidateQueue,
    requests: RequestReviewStore,
    connections: ConnectionList,
}

impl AppState {
    pub fn feed(&self) -> &CandidateQueue {
        &self.feed
    }

    pub fn requests(&self) -> &RequestReviewStore {
        &self.requests
    }

    pub fn connections(&self) -> &ConnectionList {
        &self.connections
    }

    /// Applies an action. Returns `true` if any store changed.
    fn apply(&mut self, action: Action) -> bool {
        match action {
            Action::LoadFeed(candidates) => self.feed.load(candidates),
            Action::RemoveFromFeed(id) => self.feed.remove_by_id(&id).is_some(),
            Action::SetReceivedRequests(page) => {
                self.requests.set_page(page);
                true
            }
            Action::RemoveRequest(id) => self.requests.remove_by_id(&id).is_some(),
            Action::LoadConnections(connections) => self.connections.load(connections),
        }
    }
}

/// Cloneable handle to the process-wide state.
#[derive(Debug, Clone, Default)]
pub struct AppStore {
    inner: Arc<Mutex<AppState>>,
}

impl AppStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `action` and reports whether anything changed.
    pub async fn dispatch(&self, action: Action) -> bool {
        let label = action_label(&action);
        let changed = self.inner.lock().await.apply(action);
        trace!(action = label, changed, "dispatch");
        changed
    }

    /// Runs `f` against a read-only view of the state.
    pub async fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        let state = self.inner.lock().await;
        f(&state)
    }
}

fn action_label(action: &Action) -> &'static str {
    match action {
        Action::LoadFeed(_) => "load_feed",
        Action::RemoveFromFeed(_) => "remove_from_feed",
        Action::SetReceivedRequests(_) => "set_received_requests",
        Action::RemoveRequest(_) => "remove_request",
        Action::LoadConnections(_) => "load_connections",
    }
}
