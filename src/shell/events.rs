use super::EventEmitter;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, trace};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BridgeEvent {
    pub name: String,
    pub data: serde_json::Value,
}

/// Fan-out of bridge events to every subscribed UI listener.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<BridgeEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BridgeEvent> {
        self.sender.subscribe()
    }
}

impl EventEmitter for EventBus {
    fn emit(&self, name: &str, payload: serde_json::Value) {
        let event = BridgeEvent {
            name: name.to_string(),
            data: payload,
        };
        trace!("Emitting {:?}", event);
        if self.sender.send(event).is_err() {
            debug!("Dropped event {} with no listeners", name);
        }
    }
}
