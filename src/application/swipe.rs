//! Swipe decision engine for the candidate feed.
//!
//! A candidate can leave the deck through a drag gesture or through one of
//! the Ignore/Interested buttons on its card. Both end up in
//! [`SwipeEngine::on_swipe`], the one transition that talks to the gateway
//! and removes the candidate from the queue. A button never touches the
//! queue: it replays the gesture through the card's registered
//! [`SwipeTrigger`].

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};

use crate::application::state::{Action, AppStore};
use crate::domain::{Candidate, FeedDecision, SwipeDirection};
use crate::infrastructure::Gateway;

pub const FEED_LOAD_FAILED: &str = "Failed to load users.";

/// Programmatic handle to a mounted card's swipe gesture.
pub trait SwipeTrigger: Send + Sync {
    fn swipe(&self, candidate_id: &str, direction: SwipeDirection);
}

impl<F> SwipeTrigger for F
where
    F: Fn(&str, SwipeDirection) + Send + Sync,
{
    fn swipe(&self, candidate_id: &str, direction: SwipeDirection) {
        (self)(candidate_id, direction)
    }
}

/// A gesture replayed by a button, delivered back to the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwipeGesture {
    pub candidate_id: String,
    pub direction: SwipeDirection,
}

/// Trigger that posts the gesture onto a channel; whoever drains the channel
/// feeds it to [`SwipeEngine::on_swipe`] like any other gesture.
#[derive(Debug, Clone)]
pub struct ChannelTrigger {
    tx: mpsc::UnboundedSender<SwipeGesture>,
}

impl ChannelTrigger {
    pub fn new(tx: mpsc::UnboundedSender<SwipeGesture>) -> Self {
        Self { tx }
    }
}

impl SwipeTrigger for ChannelTrigger {
    fn swipe(&self, candidate_id: &str, direction: SwipeDirection) {
        let gesture = SwipeGesture {
            candidate_id: candidate_id.to_string(),
            direction,
        };
        if self.tx.send(gesture).is_err() {
            debug!(candidate_id, "gesture receiver gone");
        }
    }
}

/// Per-card loading flags for the two action buttons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonFlags {
    pub ignored: bool,
    pub interested: bool,
}

impl ButtonFlags {
    pub fn get(&self, decision: FeedDecision) -> bool {
        match decision {
            FeedDecision::Ignored => self.ignored,
            FeedDecision::Interested => self.interested,
        }
    }

    fn set(&mut self, decision: FeedDecision, value: bool) {
        match decision {
            FeedDecision::Ignored => self.ignored = value,
            FeedDecision::Interested => self.interested = value,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardView {
    pub candidate: Candidate,
    pub buttons: ButtonFlags,
}

/// What the feed screen should show. Error wins over loading, loading over
/// empty.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedView {
    Loading,
    Error(String),
    Empty,
    Deck(Vec<CardView>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeResult {
    /// The candidate left the queue. `delivered` is false when the server
    /// call failed; the removal stands regardless.
    Committed { decision: FeedDecision, delivered: bool },
    /// Vertical swipe, nothing happened.
    Suppressed,
    /// Another gesture for this candidate is still in flight.
    AlreadyResolving,
    /// The candidate is not (or no longer) queued.
    NotQueued,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressResult {
    Triggered,
    /// The same button is already processing for this card.
    Busy,
    /// No trigger is registered for the card.
    NoHandle,
    /// The card was already resolved. Its leftover trigger is dropped.
    NotQueued,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum FeedStatus {
    Loading,
    Ready,
    Failed(String),
}

struct FeedViewState {
    mounted: bool,
    generation: u64,
    status: FeedStatus,
    resolving: HashSet<String>,
    buttons: HashMap<String, ButtonFlags>,
    handles: HashMap<String, Arc<dyn SwipeTrigger>>,
}

impl Default for FeedViewState {
    fn default() -> Self {
        Self {
            mounted: false,
            generation: 0,
            status: FeedStatus::Loading,
            resolving: HashSet::new(),
            buttons: HashMap::new(),
            handles: HashMap::new(),
        }
    }
}

pub struct SwipeEngine {
    store: AppStore,
    gateway: Arc<dyn Gateway>,
    // Lock order: view state first, then the store.
    view: Mutex<FeedViewState>,
}

impl SwipeEngine {
    pub fn new(store: AppStore, gateway: Arc<dyn Gateway>) -> Self {
        Self {
            store,
            gateway,
            view: Mutex::new(FeedViewState::default()),
        }
    }

    /// Mounts the feed view, fetching candidates unless the queue already
    /// holds some from earlier in the session.
    pub async fn mount(&self) {
        let generation = {
            let mut view = self.view.lock().await;
            view.mounted = true;
            view.generation += 1;
            view.status = FeedStatus::Loading;
            view.generation
        };

        if !self.store.read(|s| s.feed().is_empty()).await {
            self.settle(generation, FeedStatus::Ready).await;
            return;
        }

        let status = match self.gateway.fetch_feed().await {
            Ok(candidates) => {
                let count = candidates.len();
                let loaded = self.store.dispatch(Action::LoadFeed(candidates)).await;
                info!(count, loaded, "feed fetched");
                FeedStatus::Ready
            }
            Err(err) => {
                error!(error = %err, "feed fetch failed");
                FeedStatus::Failed(FEED_LOAD_FAILED.to_string())
            }
        };
        self.settle(generation, status).await;
    }

    /// Unmounts the view. Cards go away with it, so do their triggers and
    /// button flags. In-flight swipes still finish their store writes.
    pub async fn unmount(&self) {
        let mut view = self.view.lock().await;
        view.mounted = false;
        view.handles.clear();
        view.buttons.clear();
    }

    async fn settle(&self, generation: u64, status: FeedStatus) {
        let mut view = self.view.lock().await;
        if view.mounted && view.generation == generation {
            view.status = status;
        }
    }

    /// The gesture callback: resolves `candidate_id` exactly once.
    ///
    /// Sends one decision to the gateway and then removes the candidate,
    /// whether or not the server acknowledged it.
    pub async fn on_swipe(&self, candidate_id: &str, direction: SwipeDirection) -> SwipeResult {
        let Some(decision) = direction.decision() else {
            debug!(candidate_id, ?direction, "vertical swipe suppressed");
            return SwipeResult::Suppressed;
        };

        {
            let mut view = self.view.lock().await;
            if !self.store.read(|s| s.feed().contains(candidate_id)).await {
                view.buttons.remove(candidate_id);
                return SwipeResult::NotQueued;
            }
            if !view.resolving.insert(candidate_id.to_string()) {
                debug!(candidate_id, "swipe already resolving");
                return SwipeResult::AlreadyResolving;
            }
        }

        let delivered = match self.gateway.send_decision(decision, candidate_id).await {
            Ok(()) => true,
            Err(err) => {
                warn!(
                    candidate_id,
                    decision = decision.as_str(),
                    error = %err,
                    "decision not delivered, removing candidate anyway"
                );
                false
            }
        };

        // Queue first, so nobody can re-enter between the two writes.
        self.store
            .dispatch(Action::RemoveFromFeed(candidate_id.to_string()))
            .await;
        {
            let mut view = self.view.lock().await;
            view.resolving.remove(candidate_id);
            view.buttons.remove(candidate_id);
            view.handles.remove(candidate_id);
        }

        info!(candidate_id, decision = decision.as_str(), delivered, "swipe committed");
        SwipeResult::Committed { decision, delivered }
    }

    /// The button path. Replays the equivalent gesture through the card's
    /// trigger; the queue is only changed once that gesture lands in
    /// [`SwipeEngine::on_swipe`].
    pub async fn press(&self, candidate_id: &str, decision: FeedDecision) -> PressResult {
        let trigger = {
            let mut view = self.view.lock().await;
            let Some(trigger) = view.handles.get(candidate_id).cloned() else {
                debug!(candidate_id, "no trigger registered for card");
                return PressResult::NoHandle;
            };
            if !self.store.read(|s| s.feed().contains(candidate_id)).await {
                debug!(candidate_id, "press on a resolved card");
                view.handles.remove(candidate_id);
                view.buttons.remove(candidate_id);
                return PressResult::NotQueued;
            }
            let flags = view.buttons.entry(candidate_id.to_string()).or_default();
            if flags.get(decision) {
                return PressResult::Busy;
            }
            flags.set(decision, true);
            trigger
        };

        trigger.swipe(candidate_id, decision.direction());
        PressResult::Triggered
    }

    pub async fn register(&self, candidate_id: &str, trigger: Arc<dyn SwipeTrigger>) {
        self.view
            .lock()
            .await
            .handles
            .insert(candidate_id.to_string(), trigger);
    }

    pub async fn unregister(&self, candidate_id: &str) {
        self.view.lock().await.handles.remove(candidate_id);
    }

    /// Registers triggers for newly visible cards and drops those of cards
    /// that left the deck. `visible` may be older than the queue, so ids
    /// resolved since are skipped.
    pub async fn sync_handles<F>(&self, visible: &[String], mut make: F)
    where
        F: FnMut(&str) -> Arc<dyn SwipeTrigger>,
    {
        let mut view = self.view.lock().await;
        if !view.mounted {
            return;
        }
        let visible: Vec<String> = self
            .store
            .read(|s| visible.iter().filter(|id| s.feed().contains(id)).cloned().collect())
            .await;
        view.handles.retain(|id, _| visible.contains(id));
        for id in &visible {
            if !view.handles.contains_key(id) {
                let trigger = make(id);
                view.handles.insert(id.clone(), trigger);
            }
        }
    }

    pub async fn registered(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.view.lock().await.handles.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub async fn button_flags(&self, candidate_id: &str) -> ButtonFlags {
        self.view
            .lock()
            .await
            .buttons
            .get(candidate_id)
            .copied()
            .unwrap_or_default()
    }

    pub async fn view(&self) -> FeedView {
        let view = self.view.lock().await;
        match &view.status {
            FeedStatus::Failed(message) => return FeedView::Error(message.clone()),
            FeedStatus::Loading => return FeedView::Loading,
            FeedStatus::Ready => {}
        }

        let cards = self
            .store
            .read(|s| {
                s.feed()
                    .as_slice()
                    .iter()
                    .map(|c| CardView {
                        candidate: c.clone(),
                        buttons: view.buttons.get(&c.id).copied().unwrap_or_default(),
                    })
                    .collect::<Vec<_>>()
            })
            .await;

        if cards.is_empty() {
            FeedView::Empty
        } else {
            FeedView::Deck(cards)
        }
    }
}
