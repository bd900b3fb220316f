use tokio::sync::{mpsc, Mutex};
use tokio::sync::mpsc::error::TrySendError;
use std::collections::HashMap;
use std::sync::Arc;

use common::log;
use crate::games::snake::ViewEvent;
use crate::identifiers::ViewerId;

pub type ViewerSender = mpsc::Sender<ViewEvent>;

/// Fans view events out to every connected presentation client.
///
/// Sends never wait: a viewer whose queue is full misses that event, and a
/// viewer whose receiver is gone is dropped.
#[derive(Clone)]
pub struct ViewerBroadcaster {
    viewers: Arc<Mutex<HashMap<ViewerId, ViewerSender>>>,
}

impl std::fmt::Debug for ViewerBroadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewerBroadcaster").finish()
    }
}

impl Default for ViewerBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewerBroadcaster {
    pub fn new() -> Self {
        Self {
            viewers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn register(&self, sender: ViewerSender) -> ViewerId {
        let mut viewers = self.viewers.lock().await;
        let mut viewer_id = ViewerId::generate();
        while viewers.contains_key(&viewer_id) {
            viewer_id = ViewerId::generate();
        }
        viewers.insert(viewer_id.clone(), sender);
        viewer_id
    }

    pub async fn unregister(&self, viewer_id: &ViewerId) {
        self.viewers.lock().await.remove(viewer_id);
    }

    pub async fn viewer_count(&self) -> usize {
        self.viewers.lock().await.len()
    }

    pub async fn broadcast(&self, event: ViewEvent) {
        let mut viewers = self.viewers.lock().await;
        let mut gone = Vec::new();
        for (viewer_id, sender) in viewers.iter() {
            match sender.try_send(event.clone()) {
                Ok(()) | Err(TrySendError::Full(_)) => {}
                Err(TrySendError::Closed(_)) => gone.push(viewer_id.clone()),
            }
        }
        for viewer_id in gone {
            log!("Dropping closed viewer {}", viewer_id);
            viewers.remove(&viewer_id);
        }
    }
}
