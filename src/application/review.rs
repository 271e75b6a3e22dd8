//! Review workflow for received connection requests.
//!
//! Each request moves `pending -> submitting -> gone`. A successful review
//! refetches the whole current page instead of splicing the item out, so
//! `total_items` and `total_pages` always come from the server. A failed
//! review returns the request to `pending` and leaves it on screen.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::application::state::{Action, AppStore};
use crate::domain::{ConnectionRequest, ReviewDecision};
use crate::infrastructure::Gateway;

/// Fixed page size for the received-requests list.
pub const PAGE_SIZE: u32 = 5;

pub const REQUESTS_LOAD_FAILED: &str = "Could not load requests.";
pub const REVIEW_FAILED: &str = "Failed to update request.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A transient notification (toast).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, text: text.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewResult {
    /// Decision accepted by the server and the page refetched.
    Submitted,
    /// A decision for this request is still in flight; nothing was sent.
    AlreadyProcessing,
    /// The server refused or could not be reached. The request stays pending.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestRow {
    pub request: ConnectionRequest,
    pub submitting: bool,
}

/// What the requests screen should show.
///
/// `Loading` only replaces the list on the first fetch; later fetches keep
/// the current rows with `refreshing` set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewView {
    Loading,
    Error(String),
    Empty,
    List {
        rows: Vec<RequestRow>,
        current_page: u32,
        total_pages: u32,
        total_items: u32,
        refreshing: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageButton {
    pub number: u32,
    pub current: bool,
}

#[derive(Default)]
struct ReviewState {
    mounted: bool,
    loading: bool,
    error: Option<String>,
    processing: HashSet<String>,
    notices: Vec<Notice>,
    latest_fetch: u64,
}

pub struct RequestReviewEngine {
    store: AppStore,
    gateway: Arc<dyn Gateway>,
    // Lock order: review state first, then the store.
    state: Mutex<ReviewState>,
}

impl RequestReviewEngine {
    pub fn new(store: AppStore, gateway: Arc<dyn Gateway>) -> Self {
        Self {
            store,
            gateway,
            state: Mutex::new(ReviewState {
                loading: true,
                ..ReviewState::default()
            }),
        }
    }

    /// Mounts the screen on page 1, whatever page the store last held.
    pub async fn mount(&self) -> bool {
        self.state.lock().await.mounted = true;
        self.fetch_page(1).await
    }

    pub async fn unmount(&self) {
        let mut state = self.state.lock().await;
        state.mounted = false;
        state.notices.clear();
    }

    /// Moves to page `page`. Returns whether a fetch was issued: the current
    /// page and pages outside `1..=total_pages` are ignored.
    pub async fn go_to_page(&self, page: u32) -> bool {
        let (current, total) = self
            .store
            .read(|s| (s.requests().current_page(), s.requests().total_pages()))
            .await;
        if page == current || page == 0 || page > total {
            return false;
        }
        self.fetch_page(page).await
    }

    /// Fetches `page` and replaces the store's page with the response.
    ///
    /// If a newer fetch started meanwhile, the older response is dropped.
    /// A response for a page past the end (the set shrank under us) is
    /// replaced once by a fetch of the last page the server reported.
    async fn fetch_page(&self, page: u32) -> bool {
        let mut page = page;
        let mut fell_back = false;
        loop {
            let seq = {
                let mut state = self.state.lock().await;
                state.latest_fetch += 1;
                if state.mounted {
                    state.loading = true;
                    state.error = None;
                }
                state.latest_fetch
            };

            let result = self.gateway.fetch_received_requests(page, PAGE_SIZE).await;

            let mut state = self.state.lock().await;
            if state.latest_fetch != seq {
                debug!(page, "dropping superseded page response");
                return false;
            }
            let applied = match result {
                Ok(fetched) if !fell_back && fetched.is_past_end() && fetched.total_pages != page => {
                    debug!(
                        page,
                        total_pages = fetched.total_pages,
                        "page past the end, fetching the last page"
                    );
                    page = fetched.total_pages;
                    fell_back = true;
                    continue;
                }
                Ok(fetched) => {
                    info!(
                        page = fetched.current_page,
                        total_pages = fetched.total_pages,
                        items = fetched.items.len(),
                        "requests page fetched"
                    );
                    self.store.dispatch(Action::SetReceivedRequests(fetched)).await;
                    true
                }
                Err(err) => {
                    error!(page, error = %err, "requests fetch failed");
                    if state.mounted {
                        state.error = Some(err.user_message(REQUESTS_LOAD_FAILED));
                    }
                    false
                }
            };
            if state.mounted {
                state.loading = false;
            }
            return applied;
        }
    }

    /// Submits `decision` for `request_id`.
    ///
    /// A second call for the same id while the first is outstanding sends
    /// nothing. The processing marker clears only once the refetch settles.
    pub async fn review(&self, request_id: &str, decision: ReviewDecision) -> ReviewResult {
        if !self.state.lock().await.processing.insert(request_id.to_string()) {
            debug!(request_id, "review already in flight");
            return ReviewResult::AlreadyProcessing;
        }

        match self.gateway.review_request(decision, request_id).await {
            Ok(()) => {
                info!(request_id, decision = decision.as_str(), "request reviewed");
                self.notify(Notice::success(format!("Request {}", decision.as_str())))
                    .await;

                let page = self.store.read(|s| s.requests().current_page()).await;
                self.fetch_page(page).await;

                self.state.lock().await.processing.remove(request_id);
                ReviewResult::Submitted
            }
            Err(err) => {
                warn!(request_id, decision = decision.as_str(), error = %err, "review failed");
                let message = err.user_message(REVIEW_FAILED);
                let mut state = self.state.lock().await;
                state.processing.remove(request_id);
                if state.mounted {
                    state.notices.push(Notice::error(message.clone()));
                }
                ReviewResult::Failed(message)
            }
        }
    }

    async fn notify(&self, notice: Notice) {
        let mut state = self.state.lock().await;
        if state.mounted {
            state.notices.push(notice);
        }
    }

    /// Drains pending notices for display.
    pub async fn take_notices(&self) -> Vec<Notice> {
        std::mem::take(&mut self.state.lock().await.notices)
    }

    pub async fn is_processing(&self, request_id: &str) -> bool {
        self.state.lock().await.processing.contains(request_id)
    }

    /// One button per page, current page flagged.
    pub async fn pagination(&self) -> Vec<PageButton> {
        let (current, total) = self
            .store
            .read(|s| (s.requests().current_page(), s.requests().total_pages()))
            .await;
        (1..=total)
            .map(|number| PageButton { number, current: number == current })
            .collect()
    }

    pub async fn view(&self) -> ReviewView {
        let state = self.state.lock().await;
        let (items, current_page, total_pages, total_items) = self
            .store
            .read(|s| {
                let requests = s.requests();
                (
                    requests.items().to_vec(),
                    requests.current_page(),
                    requests.total_pages(),
                    requests.total_items(),
                )
            })
            .await;

        if state.loading && items.is_empty() {
            return ReviewView::Loading;
        }
        if let Some(error) = &state.error {
            return ReviewView::Error(error.clone());
        }
        if items.is_empty() {
            return ReviewView::Empty;
        }

        let rows = items
            .into_iter()
            .map(|request| RequestRow {
                submitting: state.processing.contains(&request.id),
                request,
            })
            .collect();
        ReviewView::List {
            rows,
            current_page,
            total_pages,
            total_items,
            refreshing: state.loading,
        }
    }
}
