use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use uuid::Uuid;
use vigil_core::{DetectionEvent, WireDetection};

/// Per-subscriber queue depth. A consumer that falls this far behind is
/// treated as dead and dropped rather than allowed to stall publishing.
const SUBSCRIBER_QUEUE_DEPTH: usize = 64;

/// Registry of live feed subscribers. Every published event is
/// serialized once and fanned out to all subscriber queues; a
/// subscriber whose queue is closed or full is removed and never
/// retried. Ordering is FIFO per subscriber.
pub struct BroadcastHub {
    subscribers: RwLock<HashMap<Uuid, mpsc::Sender<Arc<str>>>>,
    latest: RwLock<Option<(DetectionEvent, Arc<str>)>>,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
            latest: RwLock::new(None),
        }
    }

    /// Register a new subscriber; the receiver yields serialized feed
    /// frames in publish order.
    pub fn subscribe(&self) -> (Uuid, mpsc::Receiver<Arc<str>>) {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_QUEUE_DEPTH);
        let id = Uuid::new_v4();
        self.subscribers.write().insert(id, tx);
        (id, rx)
    }

    pub fn unsubscribe(&self, id: Uuid) {
        self.subscribers.write().remove(&id);
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Serialize the event once and push it to every live subscriber.
    pub fn publish(&self, event: &DetectionEvent) {
        let frame: Arc<str> = match serde_json::to_string(&WireDetection::from(event)) {
            Ok(json) => json.into(),
            Err(e) => {
                error!("Failed to serialize detection event: {}", e);
                return;
            }
        };

        *self.latest.write() = Some((event.clone(), frame.clone()));

        let dead: Vec<Uuid> = {
            let subscribers = self.subscribers.read();
            subscribers
                .iter()
                .filter_map(|(id, tx)| match tx.try_send(frame.clone()) {
                    Ok(()) => None,
                    Err(e) => {
                        debug!("Subscriber {} send failed: {}", id, e);
                        Some(*id)
                    }
                })
                .collect()
        };

        if !dead.is_empty() {
            let mut subscribers = self.subscribers.write();
            for id in &dead {
                subscribers.remove(id);
            }
            info!("Removed {} dead feed subscriber(s)", dead.len());
        }
    }

    /// Most recent serialized frame, for `get_latest` replays.
    pub fn latest_frame(&self) -> Option<Arc<str>> {
        self.latest.read().as_ref().map(|(_, frame)| frame.clone())
    }

    pub fn latest_event(&self) -> Option<DetectionEvent> {
        self.latest.read().as_ref().map(|(event, _)| event.clone())
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new()
    }
}
