use std::collections::HashSet;

use chrono::Utc;

use super::StoreState;
use backend_domain::{
    Event,
    EventActivation,
    EventId,
    EventInput,
    EventPatch,
    EventScope,
    EventStats,
    StoreError,
    StoreResult,
};

impl StoreState {
    pub fn list_events(&self) -> Vec<Event> {
        self.events.values().cloned().collect()
    }

    pub fn get_event(&self, id: EventId) -> StoreResult<Event> {
        self.events
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("event", id))
    }

    pub fn active_event(&self) -> Option<Event> {
        self.events.values().find(|event| event.is_active).cloned()
    }

    /// New events start inactive; activation is always an explicit flip.
    pub fn create_event(&mut self, input: EventInput) -> StoreResult<Event> {
        let event = Event {
            id: self.next_event_id(),
            name: input.name,
            date: input.date,
            location: input.location,
            is_active: false,
            branding: input.branding,
            settings: input.settings,
            created_at: Utc::now(),
        };
        self.events.insert(event.id, event.clone());
        Ok(event)
    }

    pub fn update_event(&mut self, id: EventId, patch: EventPatch) -> StoreResult<Event> {
        let event = self
            .events
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("event", id))?;
        if let Some(name) = patch.name {
            event.name = name;
        }
        if let Some(date) = patch.date {
            event.date = Some(date).filter(|value| !value.trim().is_empty());
        }
        if let Some(location) = patch.location {
            event.location = Some(location).filter(|value| !value.trim().is_empty());
        }
        if let Some(branding) = patch.branding {
            event.branding = branding;
        }
        if let Some(settings) = patch.settings {
            event.settings = settings;
        }
        Ok(event.clone())
    }

    /// Removes the event and every guest, ledger row, prize and souvenir under it.
    pub fn delete_event(&mut self, id: EventId) -> StoreResult<Event> {
        let event = self
            .events
            .remove(&id)
            .ok_or_else(|| StoreError::not_found("event", id))?;

        let guest_ids: Vec<_> = self
            .guests
            .values()
            .filter(|guest| guest.event_id == id)
            .map(|guest| guest.id)
            .collect();
        for guest_id in guest_ids {
            self.remove_guest_cascade(guest_id);
        }
        let prize_ids: Vec<_> = self
            .prizes
            .values()
            .filter(|prize| prize.event_id == id)
            .map(|prize| prize.id)
            .collect();
        self.winners
            .retain(|_, winner| !prize_ids.contains(&winner.prize_id));
        self.prizes.retain(|_, prize| prize.event_id != id);
        let souvenir_ids: Vec<_> = self
            .souvenirs
            .values()
            .filter(|souvenir| souvenir.event_id == id)
            .map(|souvenir| souvenir.id)
            .collect();
        self.takes
            .retain(|_, take| !souvenir_ids.contains(&take.souvenir_id));
        self.souvenirs.retain(|_, souvenir| souvenir.event_id != id);
        self.queue_counters.remove(&id);
        Ok(event)
    }

    /// Deactivates every other event and activates `id` in one step, so there
    /// is never a moment with zero or two active events.
    pub fn activate_event(&mut self, id: EventId) -> StoreResult<EventActivation> {
        if !self.events.contains_key(&id) {
            return Err(StoreError::not_found("event", id));
        }
        let previous_event_id = self.active_event_id().filter(|previous| *previous != id);
        for event in self.events.values_mut() {
            event.is_active = event.id == id;
        }
        let event = self.get_event(id)?;
        Ok(EventActivation {
            event,
            previous_event_id,
        })
    }

    pub fn event_stats(&self, scope: EventScope) -> StoreResult<EventStats> {
        let event_id = self.resolve_scope(scope)?.id;
        let mut stats = EventStats {
            event_id,
            ..EventStats::default()
        };

        let mut guest_ids = HashSet::new();
        for guest in self.guests.values().filter(|guest| guest.event_id == event_id) {
            guest_ids.insert(guest.id);
            stats.total_guests += 1;
            if guest.checked_in {
                stats.checked_in += 1;
            }
        }
        stats.checkin_records = self
            .checkins
            .values()
            .filter(|record| guest_ids.contains(&record.guest_id))
            .count() as u64;
        stats.reversals = self
            .reversals
            .values()
            .filter(|reversal| guest_ids.contains(&reversal.guest_id))
            .count() as u64;

        let mut prize_ids = HashSet::new();
        for prize in self.prizes.values().filter(|prize| prize.event_id == event_id) {
            prize_ids.insert(prize.id);
            stats.prize_quantity += u64::from(prize.quantity);
        }
        for winner in self.winners.values().filter(|winner| prize_ids.contains(&winner.prize_id)) {
            stats.prizes_won += 1;
            if winner.collection.is_some() {
                stats.prizes_collected += 1;
            }
        }

        let mut souvenir_ids = HashSet::new();
        for souvenir in self
            .souvenirs
            .values()
            .filter(|souvenir| souvenir.event_id == event_id)
        {
            souvenir_ids.insert(souvenir.id);
            stats.souvenir_quantity += u64::from(souvenir.quantity);
        }
        stats.souvenirs_taken = self
            .takes
            .values()
            .filter(|take| souvenir_ids.contains(&take.souvenir_id))
            .count() as u64;
        Ok(stats)
    }
}
