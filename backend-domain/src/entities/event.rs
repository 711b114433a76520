// Event entity
// Exactly one event is active at a time; every guest/prize/souvenir row hangs off an event

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::EventId;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct EventSettings {
    pub allow_multiple_checkin_per_counter: bool,
    pub allow_duplicate_guest_id: bool,
    pub require_checkin_for_souvenir: bool,
    pub auto_create_guest: bool,
    /// Client-side auto-dismiss of the check-in popup; the server only stores it.
    pub checkin_popup_timeout_ms: u64,
}

impl Default for EventSettings {
    fn default() -> Self {
        Self {
            allow_multiple_checkin_per_counter: false,
            allow_duplicate_guest_id: false,
            require_checkin_for_souvenir: false,
            auto_create_guest: false,
            checkin_popup_timeout_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct EventBranding {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub logo_url: Option<String>,
    pub background_url: Option<String>,
    pub primary_color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub name: String,
    pub date: Option<String>,
    pub location: Option<String>,
    pub is_active: bool,
    pub branding: EventBranding,
    pub settings: EventSettings,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInput {
    pub name: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub branding: EventBranding,
    #[serde(default)]
    pub settings: EventSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPatch {
    pub name: Option<String>,
    pub date: Option<String>,
    pub location: Option<String>,
    pub branding: Option<EventBranding>,
    pub settings: Option<EventSettings>,
}

/// Result of flipping the active-event pointer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventActivation {
    pub event: Event,
    pub previous_event_id: Option<EventId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EventStats {
    pub event_id: EventId,
    pub total_guests: u64,
    pub checked_in: u64,
    pub checkin_records: u64,
    pub reversals: u64,
    pub prize_quantity: u64,
    pub prizes_won: u64,
    pub prizes_collected: u64,
    pub souvenir_quantity: u64,
    pub souvenirs_taken: u64,
}
