// Souvenir entity and hand-out records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{AdmissionOutcome, Guest};
use crate::value_objects::{EventId, GuestId, SouvenirId, TakeId};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Souvenir {
    pub id: SouvenirId,
    pub event_id: EventId,
    pub name: String,
    pub description: Option<String>,
    pub quantity: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SouvenirInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub quantity: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SouvenirPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SouvenirTake {
    pub id: TakeId,
    pub souvenir_id: SouvenirId,
    pub guest_id: GuestId,
    pub taken_at: DateTime<Utc>,
    pub taken_by_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SouvenirTakeView {
    #[serde(flatten)]
    pub take: SouvenirTake,
    pub souvenir_name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SouvenirSummary {
    #[serde(flatten)]
    pub souvenir: Souvenir,
    pub taken: u32,
    pub remaining: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SouvenirGiven {
    pub souvenir: Souvenir,
    pub take: SouvenirTake,
    pub guest: Guest,
    pub remaining: u32,
}

/// Give either records a new take or reports every prior take of the guest.
#[derive(Debug, Clone)]
pub enum GiveOutcome {
    Given(SouvenirGiven),
    AlreadyTaken {
        guest: Guest,
        history: Vec<SouvenirTakeView>,
    },
}

/// A walk-in guest registered, admitted when the event asks for it, and given
/// the souvenir in one unit.
#[derive(Debug, Clone)]
pub struct WalkInGiven {
    pub guest: Guest,
    pub admission: Option<AdmissionOutcome>,
    pub given: SouvenirGiven,
}
