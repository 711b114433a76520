// Realtime event names
// Wire names are fixed; clients filter on them locally

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BroadcastKind {
    #[serde(rename = "checkin")]
    Checkin,
    #[serde(rename = "uncheckin")]
    Uncheckin,
    #[serde(rename = "config")]
    Config,
    #[serde(rename = "preview")]
    Preview,
    #[serde(rename = "prize_draw")]
    PrizeDraw,
    #[serde(rename = "prize_reset")]
    PrizeReset,
    #[serde(rename = "prize_collected")]
    PrizeCollected,
    #[serde(rename = "prize_uncollected")]
    PrizeUncollected,
    #[serde(rename = "souvenir_given")]
    SouvenirGiven,
    #[serde(rename = "souvenir_removed")]
    SouvenirRemoved,
    #[serde(rename = "souvenir_reset")]
    SouvenirReset,
    #[serde(rename = "guest-update")]
    GuestUpdate,
    #[serde(rename = "guest_created_souvenir")]
    GuestCreatedSouvenir,
    #[serde(rename = "event_change")]
    EventChange,
}

impl BroadcastKind {
    pub const ALL: [BroadcastKind; 14] = [
        BroadcastKind::Checkin,
        BroadcastKind::Uncheckin,
        BroadcastKind::Config,
        BroadcastKind::Preview,
        BroadcastKind::PrizeDraw,
        BroadcastKind::PrizeReset,
        BroadcastKind::PrizeCollected,
        BroadcastKind::PrizeUncollected,
        BroadcastKind::SouvenirGiven,
        BroadcastKind::SouvenirRemoved,
        BroadcastKind::SouvenirReset,
        BroadcastKind::GuestUpdate,
        BroadcastKind::GuestCreatedSouvenir,
        BroadcastKind::EventChange,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BroadcastKind::Checkin => "checkin",
            BroadcastKind::Uncheckin => "uncheckin",
            BroadcastKind::Config => "config",
            BroadcastKind::Preview => "preview",
            BroadcastKind::PrizeDraw => "prize_draw",
            BroadcastKind::PrizeReset => "prize_reset",
            BroadcastKind::PrizeCollected => "prize_collected",
            BroadcastKind::PrizeUncollected => "prize_uncollected",
            BroadcastKind::SouvenirGiven => "souvenir_given",
            BroadcastKind::SouvenirRemoved => "souvenir_removed",
            BroadcastKind::SouvenirReset => "souvenir_reset",
            BroadcastKind::GuestUpdate => "guest-update",
            BroadcastKind::GuestCreatedSouvenir => "guest_created_souvenir",
            BroadcastKind::EventChange => "event_change",
        }
    }
}

impl fmt::Display for BroadcastKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BroadcastKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        BroadcastKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == trimmed)
            .ok_or_else(|| format!("unknown event name '{}'", trimmed))
    }
}
