use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::warn;

use backend_domain::{BroadcastKind, RealtimeMessage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub(crate) type Listener = Arc<dyn Fn(&RealtimeMessage) + Send + Sync>;

/// Listeners keyed by event name. All of them share one underlying connection.
#[derive(Default)]
pub struct ListenerRegistry {
    next_id: u64,
    by_kind: HashMap<BroadcastKind, Vec<(ListenerId, Listener)>>,
}

impl ListenerRegistry {
    pub fn add<F>(&mut self, kind: BroadcastKind, listener: F) -> ListenerId
    where
        F: Fn(&RealtimeMessage) + Send + Sync + 'static,
    {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.by_kind
            .entry(kind)
            .or_default()
            .push((id, Arc::new(listener)));
        id
    }

    pub fn remove(&mut self, id: ListenerId) -> bool {
        let mut removed = false;
        self.by_kind.retain(|_, listeners| {
            let before = listeners.len();
            listeners.retain(|(listener_id, _)| *listener_id != id);
            removed |= listeners.len() != before;
            !listeners.is_empty()
        });
        removed
    }

    pub fn len(&self) -> usize {
        self.by_kind.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_kind.is_empty()
    }

    /// Snapshot of the listeners for `kind`, so callbacks run without holding a lock.
    pub fn listeners_for(&self, kind: BroadcastKind) -> Vec<Listener> {
        self.by_kind
            .get(&kind)
            .map(|listeners| listeners.iter().map(|(_, listener)| listener.clone()).collect())
            .unwrap_or_default()
    }

    /// Returns how many listeners completed without panicking.
    pub fn dispatch(&self, message: &RealtimeMessage) -> usize {
        self.listeners_for(message.event)
            .iter()
            .filter(|listener| notify(listener, message))
            .count()
    }
}

/// Runs one listener. A panic is contained and logged so the other listeners
/// and the shared connection keep going.
pub(crate) fn notify(listener: &Listener, message: &RealtimeMessage) -> bool {
    match panic::catch_unwind(AssertUnwindSafe(|| listener(message))) {
        Ok(()) => true,
        Err(_) => {
            warn!(event = ?message.event, id = %message.id, "realtime listener panicked");
            false
        }
    }
}
