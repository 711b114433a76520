// Realtime bus message
// One JSON envelope per published event, identical on every transport

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::value_objects::BroadcastKind;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeMessage {
    pub id: Uuid,
    pub event: BroadcastKind,
    pub payload: serde_json::Value,
    pub published_at_ms: i64,
}

impl RealtimeMessage {
    pub fn new(event: BroadcastKind, payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            event,
            payload,
            published_at_ms: Utc::now().timestamp_millis(),
        }
    }
}
