use serde_json::Value;
use tracing::debug;

use crate::{AppError, AppState};
use backend_domain::BroadcastKind;

/// Relays an operator-composed payload to the public display as `preview`.
/// Returns how many connected clients received it.
pub fn publish_preview(state: &AppState, payload: Value) -> Result<usize, AppError> {
    if !payload.is_object() {
        return Err(AppError::BadRequest("preview payload must be a JSON object".to_string()));
    }
    let delivered = state.broadcaster.publish(BroadcastKind::Preview, payload);
    state.metrics.record_broadcast();
    debug!(delivered, "display preview published");
    Ok(delivered)
}
