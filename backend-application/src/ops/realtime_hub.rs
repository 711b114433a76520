use std::sync::Arc;

use backend_domain::ports::Broadcaster;
use backend_domain::{BroadcastKind, RealtimeMessage};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

const DEFAULT_CHANNEL_BUFFER: usize = 256;

/// Fan-out point for every realtime event. There is no backlog: a receiver
/// only sees messages published after it subscribed.
pub struct RealtimeHub {
    sender: broadcast::Sender<RealtimeMessage>,
}

impl Default for RealtimeHub {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_BUFFER)
    }
}

impl RealtimeHub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _rx) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RealtimeMessage> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Calls `handler` for every message named `kind` until the returned
    /// subscription is dropped or unsubscribed. Must be called inside a tokio runtime.
    pub fn on<F>(&self, kind: BroadcastKind, handler: F) -> HubSubscription
    where
        F: Fn(RealtimeMessage) + Send + Sync + 'static,
    {
        let mut rx = self.subscribe();
        let handler = Arc::new(handler);
        let task = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(message) if message.event == kind => handler(message),
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(event = %kind, skipped, "realtime handler lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        HubSubscription { task: Some(task) }
    }
}

impl Broadcaster for RealtimeHub {
    fn publish(&self, kind: BroadcastKind, payload: serde_json::Value) -> usize {
        let message = RealtimeMessage::new(kind, payload);
        match self.sender.send(message) {
            Ok(receivers) => receivers,
            Err(_) => {
                debug!(event = %kind, "published with no connected subscribers");
                0
            }
        }
    }
}

pub struct HubSubscription {
    task: Option<JoinHandle<()>>,
}

impl HubSubscription {
    pub fn unsubscribe(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for HubSubscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
