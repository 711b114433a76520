// In-process relational state
// Every method runs against one consistent view; callers hold the store lock
// for the whole read-decide-write sequence and only then publish.

pub mod checkins;
pub mod events;
pub mod guests;
pub mod operators;
pub mod prizes;
pub mod souvenirs;

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use backend_domain::{
    CheckinId,
    CheckinRecord,
    CheckinReversal,
    Event,
    EventId,
    EventScope,
    Guest,
    GuestId,
    OperatorAccount,
    OperatorId,
    Prize,
    PrizeId,
    PrizeWinner,
    ReversalId,
    Souvenir,
    SouvenirId,
    SouvenirTake,
    StoreError,
    StoreResult,
    TakeId,
    WinnerId,
};

/// Next id per table. Ids are never reused, even after deletes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Sequences {
    pub event: i64,
    pub guest: i64,
    pub checkin: i64,
    pub reversal: i64,
    pub prize: i64,
    pub winner: i64,
    pub souvenir: i64,
    pub take: i64,
    pub operator: i64,
}

impl Default for Sequences {
    fn default() -> Self {
        Self {
            event: 1,
            guest: 1,
            checkin: 1,
            reversal: 1,
            prize: 1,
            winner: 1,
            souvenir: 1,
            take: 1,
            operator: 1,
        }
    }
}

fn take_next(counter: &mut i64) -> i64 {
    let value = *counter;
    *counter += 1;
    value
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreState {
    pub sequences: Sequences,
    /// Last queue number handed out per event.
    pub queue_counters: HashMap<EventId, u32>,
    pub events: BTreeMap<EventId, Event>,
    pub guests: BTreeMap<GuestId, Guest>,
    pub checkins: BTreeMap<CheckinId, CheckinRecord>,
    pub reversals: BTreeMap<ReversalId, CheckinReversal>,
    pub prizes: BTreeMap<PrizeId, Prize>,
    pub winners: BTreeMap<WinnerId, PrizeWinner>,
    pub souvenirs: BTreeMap<SouvenirId, Souvenir>,
    pub takes: BTreeMap<TakeId, SouvenirTake>,
    pub operators: BTreeMap<OperatorId, OperatorAccount>,
}

impl StoreState {
    pub(crate) fn next_event_id(&mut self) -> EventId {
        EventId(take_next(&mut self.sequences.event))
    }

    pub(crate) fn next_guest_id(&mut self) -> GuestId {
        GuestId(take_next(&mut self.sequences.guest))
    }

    pub(crate) fn next_checkin_id(&mut self) -> CheckinId {
        CheckinId(take_next(&mut self.sequences.checkin))
    }

    pub(crate) fn next_reversal_id(&mut self) -> ReversalId {
        ReversalId(take_next(&mut self.sequences.reversal))
    }

    pub(crate) fn next_prize_id(&mut self) -> PrizeId {
        PrizeId(take_next(&mut self.sequences.prize))
    }

    pub(crate) fn next_winner_id(&mut self) -> WinnerId {
        WinnerId(take_next(&mut self.sequences.winner))
    }

    pub(crate) fn next_souvenir_id(&mut self) -> SouvenirId {
        SouvenirId(take_next(&mut self.sequences.souvenir))
    }

    pub(crate) fn next_take_id(&mut self) -> TakeId {
        TakeId(take_next(&mut self.sequences.take))
    }

    pub(crate) fn next_operator_id(&mut self) -> OperatorId {
        OperatorId(take_next(&mut self.sequences.operator))
    }

    pub(crate) fn next_queue_number(&mut self, event_id: EventId) -> u32 {
        let counter = self.queue_counters.entry(event_id).or_insert(0);
        *counter += 1;
        *counter
    }

    pub fn active_event_id(&self) -> Option<EventId> {
        self.events
            .values()
            .find(|event| event.is_active)
            .map(|event| event.id)
    }

    /// The event a scoped request operates on. Fails closed when the caller
    /// still believes an older event is active.
    pub fn resolve_scope(&self, scope: EventScope) -> StoreResult<&Event> {
        let active = self
            .events
            .values()
            .find(|event| event.is_active)
            .ok_or(StoreError::NoActiveEvent)?;
        match scope.expected {
            Some(expected) if expected != active.id => Err(StoreError::StaleEvent {
                expected,
                active: active.id,
            }),
            _ => Ok(active),
        }
    }

    pub(crate) fn scoped_guest(&self, event_id: EventId, id: GuestId) -> StoreResult<&Guest> {
        self.guests
            .get(&id)
            .filter(|guest| guest.event_id == event_id)
            .ok_or_else(|| StoreError::not_found("guest", id))
    }

    pub(crate) fn scoped_prize(&self, event_id: EventId, id: PrizeId) -> StoreResult<&Prize> {
        self.prizes
            .get(&id)
            .filter(|prize| prize.event_id == event_id)
            .ok_or_else(|| StoreError::not_found("prize", id))
    }

    pub(crate) fn scoped_souvenir(&self, event_id: EventId, id: SouvenirId) -> StoreResult<&Souvenir> {
        self.souvenirs
            .get(&id)
            .filter(|souvenir| souvenir.event_id == event_id)
            .ok_or_else(|| StoreError::not_found("souvenir", id))
    }

    /// Drops a guest together with every row that references it.
    pub(crate) fn remove_guest_cascade(&mut self, id: GuestId) -> Option<Guest> {
        let guest = self.guests.remove(&id)?;
        self.checkins.retain(|_, record| record.guest_id != id);
        self.reversals.retain(|_, reversal| reversal.guest_id != id);
        self.winners.retain(|_, winner| winner.guest_id != id);
        self.takes.retain(|_, take| take.guest_id != id);
        Some(guest)
    }

    pub(crate) fn refresh_souvenir_flag(&mut self, guest_id: GuestId) {
        let taken = self.takes.values().any(|take| take.guest_id == guest_id);
        if let Some(guest) = self.guests.get_mut(&guest_id) {
            guest.souvenir_taken = taken;
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use backend_domain::{EventInput, EventSettings};

    #[test]
    fn stale_scope_fails_closed() {
        let (mut state, first) = state_with_event(EventSettings::default());
        let second = state
            .create_event(EventInput {
                name: "Second".to_string(),
                ..EventInput::default()
            })
            .expect("create");
        state.activate_event(second.id).expect("activate");

        let err = state
            .resolve_scope(EventScope::expecting(Some(first)))
            .expect_err("stale");
        assert!(matches!(err, StoreError::StaleEvent { expected, active } if expected == first && active == second.id));
        assert_eq!(
            state.resolve_scope(EventScope::active()).expect("active").id,
            second.id
        );
    }

    #[test]
    fn missing_active_event_is_reported() {
        let state = StoreState::default();
        assert!(matches!(
            state.resolve_scope(EventScope::active()),
            Err(StoreError::NoActiveEvent)
        ));
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let (mut state, _) = state_with_event(EventSettings::default());
        add_guest(&mut state, "G001");
        let json = serde_json::to_string(&state).expect("serialize");
        let back: StoreState = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.guests.len(), 1);
        assert_eq!(back.sequences.guest, state.sequences.guest);
        assert_eq!(back.queue_counters, state.queue_counters);
    }
}
