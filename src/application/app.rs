//! Terminal shell state and the command surface the key handler drives.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::application::connections::{ConnectionsEngine, ConnectionsView};
use crate::application::review::{Notice, PageButton, RequestReviewEngine, ReviewView};
use crate::application::state::AppStore;
use crate::application::swipe::{FeedView, SwipeEngine};
use crate::domain::{FeedDecision, ReviewDecision, SwipeDirection};
use crate::infrastructure::Gateway;

const NOTICE_TTL: Duration = Duration::from_secs(4);

/// Which screen is on display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Feed,
    Requests,
    Connections,
}

impl Screen {
    pub const ALL: [Screen; 3] = [Screen::Feed, Screen::Requests, Screen::Connections];

    pub fn title(self) -> &'static str {
        match self {
            Screen::Feed => "Feed",
            Screen::Requests => "Requests",
            Screen::Connections => "Connections",
        }
    }

    pub fn next(self) -> Screen {
        match self {
            Screen::Feed => Screen::Requests,
            Screen::Requests => Screen::Connections,
            Screen::Connections => Screen::Feed,
        }
    }
}

/// Work requested by a key press, run against the engines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Mount(Screen),
    Unmount(Screen),
    Swipe { candidate_id: String, direction: SwipeDirection },
    Press { candidate_id: String, decision: FeedDecision },
    Review { request_id: String, decision: ReviewDecision },
    GoToPage(u32),
}

impl Command {
    /// Mount and unmount change which screen the engines think is showing;
    /// they must run in the order the keys were pressed.
    pub fn is_lifecycle(&self) -> bool {
        matches!(self, Command::Mount(_) | Command::Unmount(_))
    }
}

/// UI-only state: never shared with the engines.
#[derive(Debug)]
pub struct App {
    pub screen: Screen,
    pub selected_request: usize,
    pub notice: Option<(Notice, Instant)>,
    pub should_quit: bool,
}

impl Default for App {
    fn default() -> Self {
        Self {
            screen: Screen::Feed,
            selected_request: 0,
            notice: None,
            should_quit: false,
        }
    }
}

impl App {
    /// Switches screens, returning the unmount/mount pair to run.
    pub fn switch_to(&mut self, screen: Screen) -> Vec<Command> {
        if screen == self.screen {
            return Vec::new();
        }
        let previous = std::mem::replace(&mut self.screen, screen);
        self.selected_request = 0;
        vec![Command::Unmount(previous), Command::Mount(screen)]
    }

    pub fn show_notice(&mut self, notice: Notice) {
        self.notice = Some((notice, Instant::now()));
    }

    /// The notice to display, if it hasn't expired yet.
    pub fn current_notice(&self, now: Instant) -> Option<&Notice> {
        self.notice
            .as_ref()
            .filter(|(_, shown)| now.duration_since(*shown) < NOTICE_TTL)
            .map(|(notice, _)| notice)
    }

    pub fn select_next_request(&mut self, rows: usize) {
        if rows > 0 && self.selected_request + 1 < rows {
            self.selected_request += 1;
        }
    }

    pub fn select_previous_request(&mut self) {
        self.selected_request = self.selected_request.saturating_sub(1);
    }

    /// Keeps the selection inside the list after it shrank.
    pub fn clamp_selection(&mut self, rows: usize) {
        if rows == 0 {
            self.selected_request = 0;
        } else if self.selected_request >= rows {
            self.selected_request = rows - 1;
        }
    }
}

/// Everything a frame needs, captured in one go.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub feed: FeedView,
    pub requests: ReviewView,
    pub pages: Vec<PageButton>,
    pub connections: ConnectionsView,
}

impl Snapshot {
    /// Ids of the cards currently drawn on the deck.
    pub fn visible_cards(&self, depth: usize) -> Vec<String> {
        match &self.feed {
            FeedView::Deck(cards) => cards
                .iter()
                .take(depth)
                .map(|card| card.candidate.id.clone())
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn request_rows(&self) -> usize {
        match &self.requests {
            ReviewView::List { rows, .. } => rows.len(),
            _ => 0,
        }
    }
}

/// The engines wired to one shared store.
#[derive(Clone)]
pub struct Engines {
    pub store: AppStore,
    pub feed: Arc<SwipeEngine>,
    pub requests: Arc<RequestReviewEngine>,
    pub connections: Arc<ConnectionsEngine>,
}

impl Engines {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        let store = AppStore::new();
        Self {
            feed: Arc::new(SwipeEngine::new(store.clone(), gateway.clone())),
            requests: Arc::new(RequestReviewEngine::new(store.clone(), gateway.clone())),
            connections: Arc::new(ConnectionsEngine::new(store.clone(), gateway)),
            store,
        }
    }

    pub async fn execute(&self, command: Command) {
        debug!(?command, "execute");
        match command {
            Command::Mount(Screen::Feed) => self.feed.mount().await,
            Command::Mount(Screen::Requests) => {
                self.requests.mount().await;
            }
            Command::Mount(Screen::Connections) => self.connections.mount().await,
            Command::Unmount(Screen::Feed) => self.feed.unmount().await,
            Command::Unmount(Screen::Requests) => self.requests.unmount().await,
            Command::Unmount(Screen::Connections) => self.connections.unmount().await,
            Command::Swipe { candidate_id, direction } => {
                let result = self.feed.on_swipe(&candidate_id, direction).await;
                debug!(candidate_id, ?result, "swipe handled");
            }
            Command::Press { candidate_id, decision } => {
                let result = self.feed.press(&candidate_id, decision).await;
                debug!(candidate_id, ?result, "button pressed");
            }
            Command::Review { request_id, decision } => {
                self.requests.review(&request_id, decision).await;
            }
            Command::GoToPage(page) => {
                self.requests.go_to_page(page).await;
            }
        }
    }

    pub async fn snapshot(&self) -> Snapshot {
        Snapshot {
            feed: self.feed.view().await,
            requests: self.requests.view().await,
            pages: self.requests.pagination().await,
            connections: self.connections.view().await,
        }
    }
}

enum Job {
    Run(Command),
    Flush(oneshot::Sender<()>),
}

/// Runs commands off the UI loop.
///
/// Lifecycle commands go through one worker task in arrival order, so a
/// quick Tab/Shift-Tab can never leave a stale unmount after a mount.
/// Swipes, presses, reviews and page changes each get their own task.
#[derive(Clone)]
pub struct CommandRunner {
    engines: Engines,
    lifecycle: mpsc::UnboundedSender<Job>,
}

impl CommandRunner {
    /// Starts the lifecycle worker. Must be called inside a tokio runtime.
    pub fn start(engines: Engines) -> Self {
        let (lifecycle, mut rx) = mpsc::unbounded_channel::<Job>();
        let worker = engines.clone();
        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                match job {
                    Job::Run(command) => worker.execute(command).await,
                    Job::Flush(done) => {
                        let _ = done.send(());
                    }
                }
            }
        });
        Self { engines, lifecycle }
    }

    pub fn run(&self, commands: Vec<Command>) {
        for command in commands {
            if command.is_lifecycle() {
                if self.lifecycle.send(Job::Run(command)).is_err() {
                    warn!("lifecycle worker stopped");
                }
            } else {
                let engines = self.engines.clone();
                tokio::spawn(async move { engines.execute(command).await });
            }
        }
    }

    /// Waits until every lifecycle command queued so far has run.
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        if self.lifecycle.send(Job::Flush(done)).is_ok() {
            let _ = wait.await;
        }
    }
}
