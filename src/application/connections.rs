//! Accepted connections: a load-once list and the engine behind its screen.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{error, info};

use crate::application::state::{Action, AppStore};
use crate::domain::Candidate;
use crate::infrastructure::Gateway;

pub const CONNECTIONS_LOAD_FAILED: &str = "Could not load your connections. Please try again later.";

#[derive(Debug, Clone, Default)]
pub struct ConnectionList {
    connections: Vec<Candidate>,
}

impl ConnectionList {
    /// Fills the list unless it already has entries.
    pub fn load(&mut self, connections: Vec<Candidate>) -> bool {
        if !self.connections.is_empty() {
            return false;
        }
        self.connections = connections;
        true
    }

    pub fn as_slice(&self) -> &[Candidate] {
        &self.connections
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionsView {
    Loading,
    Error(String),
    Empty,
    List(Vec<Candidate>),
}

#[derive(Default)]
struct PanelState {
    mounted: bool,
    loading: bool,
    error: Option<String>,
}

pub struct ConnectionsEngine {
    store: AppStore,
    gateway: Arc<dyn Gateway>,
    panel: Mutex<PanelState>,
}

impl ConnectionsEngine {
    pub fn new(store: AppStore, gateway: Arc<dyn Gateway>) -> Self {
        Self {
            store,
            gateway,
            panel: Mutex::new(PanelState {
                loading: true,
                ..PanelState::default()
            }),
        }
    }

    /// Fetches connections, but only when none are loaded yet.
    pub async fn mount(&self) {
        let already_loaded = !self.store.read(|s| s.connections().is_empty()).await;
        {
            let mut panel = self.panel.lock().await;
            panel.mounted = true;
            panel.loading = !already_loaded;
            panel.error = None;
        }
        if already_loaded {
            return;
        }

        let error = match self.gateway.fetch_connections().await {
            Ok(connections) => {
                info!(count = connections.len(), "connections fetched");
                self.store.dispatch(Action::LoadConnections(connections)).await;
                None
            }
            Err(err) => {
                error!(error = %err, "connections fetch failed");
                Some(CONNECTIONS_LOAD_FAILED.to_string())
            }
        };

        let mut panel = self.panel.lock().await;
        if panel.mounted {
            panel.loading = false;
            panel.error = error;
        }
    }

    pub async fn unmount(&self) {
        self.panel.lock().await.mounted = false;
    }

    pub async fn view(&self) -> ConnectionsView {
        let panel = self.panel.lock().await;
        if panel.loading {
            return ConnectionsView::Loading;
        }
        if let Some(error) = &panel.error {
            return ConnectionsView::Error(error.clone());
        }
        let connections = self.store.read(|s| s.connections().as_slice().to_vec()).await;
        if connections.is_empty() {
            ConnectionsView::Empty
        } else {
            ConnectionsView::List(connections)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{candidate, Call, FakeGateway};

    #[test]
    fn test_list_loads_once() {
        let mut list = ConnectionList::default();
        assert!(list.load(vec![candidate("A")]));
        assert!(!list.load(vec![candidate("B"), candidate("C")]));
        assert_eq!(list.len(), 1);
        assert_eq!(list.as_slice()[0].id, "A");
    }

    #[tokio::test]
    async fn test_mount_fetches_and_lists() {
        let fake = FakeGateway::new();
        fake.set_connections(vec![candidate("A"), candidate("B")]);
        let engine = ConnectionsEngine::new(AppStore::new(), fake.clone());

        assert_eq!(engine.view().await, ConnectionsView::Loading);
        engine.mount().await;

        match engine.view().await {
            ConnectionsView::List(list) => assert_eq!(list.len(), 2),
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_remount_does_not_refetch() {
        let fake = FakeGateway::new();
        fake.set_connections(vec![candidate("A")]);
        let engine = ConnectionsEngine::new(AppStore::new(), fake.clone());

        engine.mount().await;
        engine.unmount().await;
        engine.mount().await;

        assert_eq!(fake.count(|c| *c == Call::FetchConnections), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_and_empty_states() {
        let fake = FakeGateway::new();
        fake.fail_connections();
        let engine = ConnectionsEngine::new(AppStore::new(), fake.clone());
        engine.mount().await;
        assert_eq!(
            engine.view().await,
            ConnectionsView::Error(CONNECTIONS_LOAD_FAILED.to_string())
        );

        let fake = FakeGateway::new();
        let engine = ConnectionsEngine::new(AppStore::new(), fake.clone());
        engine.mount().await;
        assert_eq!(engine.view().await, ConnectionsView::Empty);
    }
}
