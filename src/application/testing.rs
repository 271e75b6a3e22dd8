//! In-memory gateway and fixtures for engine tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::domain::{
    Candidate, ConnectionRequest, FeedDecision, GatewayError, GatewayResult, RequestPage,
    RequestSender, RequestStatus, ReviewDecision,
};
use crate::infrastructure::Gateway;

pub fn candidate(id: &str) -> Candidate {
    Candidate {
        id: id.to_string(),
        first_name: format!("First{id}"),
        last_name: format!("Last{id}"),
        photo_url: None,
        age: Some(30),
        gender: Some("other".to_string()),
        about: None,
    }
}

pub fn request(id: &str) -> ConnectionRequest {
    ConnectionRequest {
        id: id.to_string(),
        from_user: RequestSender {
            id: format!("sender-{id}"),
            first_name: format!("Sender{id}"),
            last_name: String::new(),
            photo_url: None,
        },
        status: RequestStatus::Pending,
    }
}

pub fn page(ids: &[&str], total_items: u32, current_page: u32, total_pages: u32) -> RequestPage {
    RequestPage::new(ids.iter().map(|id| request(id)).collect(), total_items, current_page, total_pages)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    FetchFeed,
    SendDecision(FeedDecision, String),
    FetchRequests { page: u32, limit: u32 },
    Review(ReviewDecision, String),
    FetchConnections,
}

enum Scripted {
    Page(RequestPage),
    Fail(Option<String>),
}

fn failure(message: Option<String>) -> GatewayError {
    GatewayError::Status { status: 500, message }
}

/// Records every call and answers from scripted data.
///
/// Decision and review calls can be held in flight with [`FakeGateway::hold`]
/// until [`FakeGateway::release`] hands out permits.
#[derive(Default)]
pub struct FakeGateway {
    calls: Mutex<Vec<Call>>,
    feed: Mutex<Option<Vec<Candidate>>>,
    connections: Mutex<Option<Vec<Candidate>>>,
    pages: Mutex<VecDeque<Scripted>>,
    fail_decisions: AtomicBool,
    review_failure: Mutex<Option<Option<String>>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
    page_gate: Mutex<Option<Arc<Semaphore>>>,
}

impl FakeGateway {
    pub fn new() -> Arc<Self> {
        let fake = Self::default();
        *fake.feed.lock().unwrap() = Some(Vec::new());
        *fake.connections.lock().unwrap() = Some(Vec::new());
        Arc::new(fake)
    }

    pub fn set_feed(&self, candidates: Vec<Candidate>) {
        *self.feed.lock().unwrap() = Some(candidates);
    }

    pub fn fail_feed(&self) {
        *self.feed.lock().unwrap() = None;
    }

    pub fn set_connections(&self, connections: Vec<Candidate>) {
        *self.connections.lock().unwrap() = Some(connections);
    }

    pub fn fail_connections(&self) {
        *self.connections.lock().unwrap() = None;
    }

    /// Queues the answer for the next requests fetch.
    pub fn push_page(&self, page: RequestPage) {
        self.pages.lock().unwrap().push_back(Scripted::Page(page));
    }

    pub fn push_page_failure(&self, message: Option<&str>) {
        self.pages
            .lock()
            .unwrap()
            .push_back(Scripted::Fail(message.map(str::to_string)));
    }

    pub fn fail_decisions(&self) {
        self.fail_decisions.store(true, Ordering::SeqCst);
    }

    pub fn fail_reviews(&self, message: Option<&str>) {
        *self.review_failure.lock().unwrap() = Some(message.map(str::to_string));
    }

    /// Decision and review calls wait for a permit from now on.
    pub fn hold(&self) {
        *self.gate.lock().unwrap() = Some(Arc::new(Semaphore::new(0)));
    }

    pub fn release(&self, permits: usize) {
        if let Some(gate) = self.gate.lock().unwrap().as_ref() {
            gate.add_permits(permits);
        }
    }

    /// Requests fetches wait for a permit from now on.
    pub fn hold_pages(&self) {
        *self.page_gate.lock().unwrap() = Some(Arc::new(Semaphore::new(0)));
    }

    pub fn release_pages(&self, permits: usize) {
        if let Some(gate) = self.page_gate.lock().unwrap().as_ref() {
            gate.add_permits(permits);
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    async fn wait_for_gate(&self) {
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.acquire().await.unwrap().forget();
        }
    }

    async fn wait_for_page_gate(&self) {
        let gate = self.page_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.acquire().await.unwrap().forget();
        }
    }
}

/// Yields until `fake` has recorded `n` calls.
pub async fn wait_for_calls(fake: &FakeGateway, n: usize) {
    for _ in 0..1000 {
        if fake.calls().len() >= n {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("expected {n} gateway calls, saw {:?}", fake.calls());
}

#[async_trait]
impl Gateway for FakeGateway {
    async fn fetch_feed(&self) -> GatewayResult<Vec<Candidate>> {
        self.record(Call::FetchFeed);
        self.feed.lock().unwrap().clone().ok_or_else(|| failure(None))
    }

    async fn send_decision(&self, decision: FeedDecision, candidate_id: &str) -> GatewayResult<()> {
        self.record(Call::SendDecision(decision, candidate_id.to_string()));
        self.wait_for_gate().await;
        if self.fail_decisions.load(Ordering::SeqCst) {
            return Err(failure(None));
        }
        Ok(())
    }

    async fn fetch_received_requests(&self, page: u32, limit: u32) -> GatewayResult<RequestPage> {
        self.record(Call::FetchRequests { page, limit });
        let scripted = self.pages.lock().unwrap().pop_front();
        self.wait_for_page_gate().await;
        match scripted {
            Some(Scripted::Page(page)) => Ok(page),
            Some(Scripted::Fail(message)) => Err(failure(message)),
            None => Err(failure(Some("no page scripted".to_string()))),
        }
    }

    async fn review_request(&self, decision: ReviewDecision, request_id: &str) -> GatewayResult<()> {
        self.record(Call::Review(decision, request_id.to_string()));
        self.wait_for_gate().await;
        match self.review_failure.lock().unwrap().clone() {
            Some(message) => Err(failure(message)),
            None => Ok(()),
        }
    }

    async fn fetch_connections(&self) -> GatewayResult<Vec<Candidate>> {
        self.record(Call::FetchConnections);
        self.connections.lock().unwrap().clone().ok_or_else(|| failure(None))
    }
}
