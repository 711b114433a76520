// Prize entity, winners and collection tracking

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::Guest;
use crate::value_objects::{EventId, GuestId, PrizeId, WinnerId};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Prize {
    pub id: PrizeId,
    pub event_id: EventId,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub quantity: u32,
    pub allow_multiple_wins: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrizeInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub quantity: u32,
    #[serde(default)]
    pub allow_multiple_wins: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrizePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub quantity: Option<u32>,
    pub allow_multiple_wins: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PrizeCollection {
    pub collected_at: DateTime<Utc>,
    pub collected_by_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PrizeWinner {
    pub id: WinnerId,
    pub prize_id: PrizeId,
    pub guest_id: GuestId,
    pub won_at: DateTime<Utc>,
    pub collection: Option<PrizeCollection>,
}

/// Winner joined with the guest and prize it refers to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PrizeWinnerView {
    #[serde(flatten)]
    pub winner: PrizeWinner,
    pub prize_name: String,
    pub guest: Guest,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrizeDrawResult {
    pub prize_id: PrizeId,
    pub prize: Prize,
    pub winner: PrizeWinnerView,
    pub remaining: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrizeSummary {
    #[serde(flatten)]
    pub prize: Prize,
    pub won: u32,
    pub collected: u32,
    pub remaining: u32,
}

/// A collect request on an already-collected winner returns the existing record.
#[derive(Debug, Clone)]
pub struct CollectOutcome {
    pub winner: PrizeWinnerView,
    pub newly_collected: bool,
}
