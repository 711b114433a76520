pub mod auth_commands;
pub mod checkin_commands;
pub mod display_commands;
pub mod event_commands;
pub mod guest_commands;
pub mod prize_commands;
pub mod souvenir_commands;

use tracing::warn;

use crate::AppState;
use backend_domain::BroadcastKind;

/// Best-effort push after a successful write. Serialization failures are
/// logged; the write stands and clients catch up on their next refetch.
pub(crate) fn publish<T: serde::Serialize>(state: &AppState, kind: BroadcastKind, payload: &T) {
    match serde_json::to_value(payload) {
        Ok(value) => {
            state.broadcaster.publish(kind, value);
            state.metrics.record_broadcast();
        }
        Err(err) => warn!(event = %kind, "failed to serialize broadcast payload: {}", err),
    }
}
