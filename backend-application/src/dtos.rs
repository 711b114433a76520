// Request and response bodies shared by the commands and the HTTP layer

use serde::{Deserialize, Serialize};

use backend_domain::{
    CheckinReversal,
    EventId,
    Guest,
    GuestId,
    GuestInput,
    GuestView,
    SouvenirGiven,
    SouvenirTakeView,
};

/// Fields every check-in style request may carry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckinContext {
    /// Event the terminal believes is active; a mismatch fails closed.
    #[serde(default)]
    pub event_id: Option<EventId>,
    /// Overrides the counter attached to the operator session.
    #[serde(default)]
    pub counter_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeCheckinRequest {
    pub code: String,
    /// Used to auto-create an unknown guest when the event allows it.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub context: CheckinContext,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrCheckinRequest {
    pub payload: String,
    #[serde(flatten)]
    pub context: CheckinContext,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupCheckinRequest {
    pub query: String,
    #[serde(flatten)]
    pub context: CheckinContext,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LookupOutcome {
    Admitted { guest: GuestView },
    Multiple { candidates: Vec<Guest> },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UncheckinRequest {
    pub password: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub event_id: Option<EventId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopedRequest {
    #[serde(default)]
    pub event_id: Option<EventId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectPrizeRequest {
    #[serde(default)]
    pub collected_by_name: Option<String>,
    #[serde(default)]
    pub event_id: Option<EventId>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiveSouvenirRequest {
    pub guest_id: GuestId,
    #[serde(default)]
    pub event_id: Option<EventId>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiveToNewGuestRequest {
    pub guest: GuestInput,
    #[serde(default)]
    pub event_id: Option<EventId>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestCreatedWithSouvenir {
    pub guest: Guest,
    pub given: SouvenirGiven,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetResult {
    pub removed: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub limit: Option<usize>,
}

/// Everything an operator sees when opening one guest.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestDetail {
    #[serde(flatten)]
    pub view: GuestView,
    pub reversals: Vec<CheckinReversal>,
    pub souvenir_takes: Vec<SouvenirTakeView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligiblePool {
    pub remaining: u32,
    pub count: usize,
    pub candidates: Vec<Guest>,
}
