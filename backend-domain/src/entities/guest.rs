// Guest entity and its check-in ledger rows

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{CheckinId, EventId, GuestId, OperatorId, ReversalId};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Guest {
    pub id: GuestId,
    pub event_id: EventId,
    /// External code printed on invitations and QR badges.
    #[serde(rename = "guestId")]
    pub guest_code: String,
    pub queue_number: u32,
    pub name: String,
    pub category: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub checked_in: bool,
    pub checked_in_at: Option<DateTime<Utc>>,
    pub checked_in_by_id: Option<OperatorId>,
    pub souvenir_taken: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestInput {
    /// Generated from the queue number when omitted.
    #[serde(default, rename = "guestId")]
    pub guest_code: Option<String>,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestPatch {
    #[serde(default, rename = "guestId")]
    pub guest_code: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CheckinRecord {
    pub id: CheckinId,
    pub guest_id: GuestId,
    pub checkin_at: DateTime<Utc>,
    pub checkin_by_operator_id: Option<OperatorId>,
    pub checkin_by_name: Option<String>,
    pub counter_name: Option<String>,
}

/// Audit row written when a check-in is reversed. History rows are never deleted;
/// records with an id at or below `last_checkin_id` belong to a closed cycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CheckinReversal {
    pub id: ReversalId,
    pub guest_id: GuestId,
    pub reversed_at: DateTime<Utc>,
    pub operator_id: OperatorId,
    pub operator_name: String,
    pub reason: String,
    pub last_checkin_id: Option<CheckinId>,
}

/// Who is checking the guest in, and at which counter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckinAttempt {
    pub operator_id: Option<OperatorId>,
    pub operator_name: Option<String>,
    pub counter_name: Option<String>,
}

/// What the ledger decided and the guest state it decided against.
#[derive(Debug, Clone)]
pub struct AdmissionOutcome {
    pub guest: Guest,
    pub checkins: Vec<CheckinRecord>,
    pub created: Option<CheckinRecord>,
    /// Set when the attempt was a duplicate.
    pub message: Option<String>,
}

impl AdmissionOutcome {
    pub fn is_duplicate(&self) -> bool {
        self.created.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct ReversalOutcome {
    pub guest: Guest,
    pub checkins: Vec<CheckinRecord>,
    pub reversal: CheckinReversal,
}

/// Guest as returned to terminals and pushed on the realtime bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GuestView {
    #[serde(flatten)]
    pub guest: Guest,
    pub checkin_count: usize,
    pub checkins: Vec<CheckinRecord>,
    pub already_checked_by_this_admin: bool,
    pub duplicate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl GuestView {
    pub fn new(guest: Guest, mut checkins: Vec<CheckinRecord>, viewer: Option<OperatorId>) -> Self {
        checkins.sort_by(|a, b| a.checkin_at.cmp(&b.checkin_at).then(a.id.cmp(&b.id)));
        let already_checked_by_this_admin = viewer
            .map(|operator| {
                checkins
                    .iter()
                    .any(|record| record.checkin_by_operator_id == Some(operator))
            })
            .unwrap_or(false);
        Self {
            guest,
            checkin_count: checkins.len(),
            checkins,
            already_checked_by_this_admin,
            duplicate: false,
            message: None,
        }
    }

    pub fn duplicate(mut self, message: impl Into<String>) -> Self {
        self.duplicate = true;
        self.message = Some(message.into());
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestListQuery {
    pub checked_in: Option<bool>,
    pub category: Option<String>,
    pub q: Option<String>,
    pub limit: Option<usize>,
}
